//! Declarative stdin/stdout plan for the stages of a pipeline.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::error::PipelineError;

/// Which end of the pipeline the caller holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeMode {
    /// Caller reads the last stage's stdout.
    Read,
    /// Caller writes the first stage's stdin.
    Write,
}

/// What one end of the pipeline is connected to.
#[derive(Debug, Default)]
pub enum PipeEnd {
    /// The parent's own stdin/stdout/stderr.
    #[default]
    Inherited,
    /// A fresh OS pipe handed to the caller.
    NewPipe,
    /// A named file; `append` only applies to output ends.
    BoundFile {
        /// File path.
        path: PathBuf,
        /// Append instead of truncating.
        append: bool,
    },
    /// An already-open stream.
    BoundStream(Stdio),
    /// An in-memory buffer fed to the first stage of a read pipeline.
    Memory(Vec<u8>),
}

impl PipeEnd {
    /// Bind to a file, truncating it when used as output.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        PipeEnd::BoundFile {
            path: path.into(),
            append: false,
        }
    }

    /// Bind to a file opened for appending.
    pub fn append(path: impl Into<PathBuf>) -> Self {
        PipeEnd::BoundFile {
            path: path.into(),
            append: true,
        }
    }
}

/// Where a stage's stdin comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinPlan {
    /// Parent's stdin.
    Inherited,
    /// The pipeline's bound far end.
    OtherEnd,
    /// The previous stage's stdout.
    Upstream,
    /// A pipe the caller writes to.
    Caller,
}

/// Where a stage's stdout goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdoutPlan {
    /// Parent's stdout.
    Inherited,
    /// The pipeline's bound far end.
    OtherEnd,
    /// A fresh pipe read by the next stage.
    Downstream,
    /// A pipe the caller reads from.
    Caller,
}

/// Stdin and stdout assignment for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageWiring {
    /// Stdin source.
    pub stdin: StdinPlan,
    /// Stdout sink.
    pub stdout: StdoutPlan,
}

/// Wire `stages` processes in a single pass.
///
/// Every stage but the first reads its predecessor's stdout. The caller's
/// pipe sits on the last stdout in read mode and the first stdin in write
/// mode; the far end takes the opposite position.
pub fn plan(stages: usize, mode: PipeMode, far_end_inherited: bool) -> Vec<StageWiring> {
    let far_stdin = if far_end_inherited {
        StdinPlan::Inherited
    } else {
        StdinPlan::OtherEnd
    };
    let far_stdout = if far_end_inherited {
        StdoutPlan::Inherited
    } else {
        StdoutPlan::OtherEnd
    };

    (0..stages)
        .map(|idx| {
            let first = idx == 0;
            let last = idx + 1 == stages;
            let stdin = match (first, mode) {
                (false, _) => StdinPlan::Upstream,
                (true, PipeMode::Read) => far_stdin,
                (true, PipeMode::Write) => StdinPlan::Caller,
            };
            let stdout = match (last, mode) {
                (false, _) => StdoutPlan::Downstream,
                (true, PipeMode::Read) => StdoutPlan::Caller,
                (true, PipeMode::Write) => far_stdout,
            };
            StageWiring { stdin, stdout }
        })
        .collect()
}

/// A far end opened into a concrete handle.
#[derive(Debug)]
pub(crate) enum ResolvedEnd {
    Inherited,
    Stream(Stdio),
    Feed(Vec<u8>),
}

impl ResolvedEnd {
    pub(crate) fn is_inherited(&self) -> bool {
        matches!(self, ResolvedEnd::Inherited)
    }
}

/// Open the far end of a pipeline for the given mode.
pub(crate) fn resolve_far_end(end: PipeEnd, mode: PipeMode) -> Result<ResolvedEnd, PipelineError> {
    match (end, mode) {
        (PipeEnd::Inherited, _) => Ok(ResolvedEnd::Inherited),
        (PipeEnd::NewPipe, _) => Err(PipelineError::InvalidEnd(
            "the far end cannot be a new pipe; only the caller's end is".to_string(),
        )),
        (PipeEnd::BoundFile { path, append }, PipeMode::Read) => {
            if append {
                return Err(PipelineError::InvalidEnd(
                    "append is only valid for write pipelines".to_string(),
                ));
            }
            let file = File::open(&path).map_err(|source| PipelineError::Open { path, source })?;
            Ok(ResolvedEnd::Stream(Stdio::from(file)))
        }
        (PipeEnd::BoundFile { path, append }, PipeMode::Write) => {
            let file = open_output(&path, append)
                .map_err(|source| PipelineError::Open { path, source })?;
            Ok(ResolvedEnd::Stream(Stdio::from(file)))
        }
        (PipeEnd::BoundStream(stdio), _) => Ok(ResolvedEnd::Stream(stdio)),
        (PipeEnd::Memory(buf), PipeMode::Read) => Ok(ResolvedEnd::Feed(buf)),
        (PipeEnd::Memory(_), PipeMode::Write) => Err(PipelineError::InvalidEnd(
            "memory buffers can only feed read pipelines".to_string(),
        )),
    }
}

/// Open the file every stage's stderr is sent to, if any.
pub(crate) fn resolve_stderr(end: PipeEnd) -> Result<Option<File>, PipelineError> {
    match end {
        PipeEnd::Inherited => Ok(None),
        PipeEnd::BoundFile { path, append } => open_output(&path, append)
            .map(Some)
            .map_err(|source| PipelineError::Open { path, source }),
        other => Err(PipelineError::InvalidEnd(format!(
            "stderr must be inherited or a file, got {other:?}"
        ))),
    }
}

fn open_output(path: &Path, append: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_pipeline_chains_stdout_to_stdin() {
        let wiring = plan(3, PipeMode::Read, false);
        assert_eq!(
            wiring,
            vec![
                StageWiring {
                    stdin: StdinPlan::OtherEnd,
                    stdout: StdoutPlan::Downstream
                },
                StageWiring {
                    stdin: StdinPlan::Upstream,
                    stdout: StdoutPlan::Downstream
                },
                StageWiring {
                    stdin: StdinPlan::Upstream,
                    stdout: StdoutPlan::Caller
                },
            ]
        );
    }

    #[test]
    fn write_pipeline_mirrors_read() {
        let wiring = plan(2, PipeMode::Write, true);
        assert_eq!(wiring[0].stdin, StdinPlan::Caller);
        assert_eq!(wiring[0].stdout, StdoutPlan::Downstream);
        assert_eq!(wiring[1].stdin, StdinPlan::Upstream);
        assert_eq!(wiring[1].stdout, StdoutPlan::Inherited);
    }

    #[test]
    fn single_stage_touches_both_ends() {
        let wiring = plan(1, PipeMode::Read, true);
        assert_eq!(
            wiring,
            vec![StageWiring {
                stdin: StdinPlan::Inherited,
                stdout: StdoutPlan::Caller
            }]
        );
    }

    #[test]
    fn far_end_validation() {
        assert!(matches!(
            resolve_far_end(PipeEnd::NewPipe, PipeMode::Read),
            Err(PipelineError::InvalidEnd(_))
        ));
        assert!(matches!(
            resolve_far_end(PipeEnd::Memory(vec![1]), PipeMode::Write),
            Err(PipelineError::InvalidEnd(_))
        ));
        assert!(matches!(
            resolve_far_end(PipeEnd::append("/nonexistent/in"), PipeMode::Read),
            Err(PipelineError::InvalidEnd(_))
        ));
        assert!(matches!(
            resolve_far_end(PipeEnd::file("/nonexistent/dir/in"), PipeMode::Read),
            Err(PipelineError::Open { .. })
        ));
        assert!(matches!(
            resolve_stderr(PipeEnd::NewPipe),
            Err(PipelineError::InvalidEnd(_))
        ));
    }
}
