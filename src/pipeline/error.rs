//! Stage exit statuses and pipeline failures.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// How a stage process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by a signal.
    Signaled(i32),
    /// The process could not be waited on.
    Unknown,
}

pub(crate) const SIGPIPE: i32 = 13;

impl StageExit {
    /// True for a zero exit status.
    pub fn success(&self) -> bool {
        matches!(self, StageExit::Exited(0))
    }

    /// Exit code in shell convention: `128 + signal` for signalled processes.
    pub fn code(&self) -> i32 {
        match *self {
            StageExit::Exited(code) => code,
            StageExit::Signaled(signal) => 128 + signal,
            StageExit::Unknown => -1,
        }
    }
}

impl From<ExitStatus> for StageExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return StageExit::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return StageExit::Signaled(signal);
            }
        }
        StageExit::Unknown
    }
}

impl fmt::Display for StageExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageExit::Exited(code) => write!(f, "process exited with {code}"),
            StageExit::Signaled(signal) => write!(f, "process terminated on signal {signal}"),
            StageExit::Unknown => write!(f, "process could not be waited on"),
        }
    }
}

/// The first stage of a pipeline that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{exit}: \"{command}\" in pipeline \"{description}\"")]
pub struct StageFailure {
    /// Zero-based position of the stage.
    pub stage: usize,
    /// The stage's command line.
    pub command: String,
    /// How the stage ended.
    pub exit: StageExit,
    /// Every stage's command, joined with `" | "`.
    pub description: String,
}

impl StageFailure {
    /// Exit code of the failed stage.
    pub fn exit_code(&self) -> i32 {
        self.exit.code()
    }
}

/// Errors raised while building, driving or closing a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No commands were supplied.
    #[error("no commands in pipeline")]
    EmptyPipeline,

    /// A command had an empty argument vector.
    #[error("empty command at pipeline stage {0}")]
    EmptyCommand(usize),

    /// An end was bound to something the mode cannot use.
    #[error("invalid pipeline end: {0}")]
    InvalidEnd(String),

    /// A file bound to an end could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A stage could not be started.
    #[error("failed to start \"{command}\" in pipeline \"{description}\": {source}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Pipeline description.
        description: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A stage exited unsuccessfully.
    #[error(transparent)]
    Stage(#[from] StageFailure),
}
