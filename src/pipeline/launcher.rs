//! Process creation behind a trait, so wiring can be exercised without
//! real subprocesses.

use std::io::{self, Read, Write};
use std::process::{Child, Command, Stdio};

use super::error::StageExit;

/// Stdin handed to a stage at launch.
#[derive(Debug)]
pub enum StageStdin<'a, P> {
    /// Parent's stdin.
    Inherited,
    /// An opened file or stream.
    Bound(Stdio),
    /// The stdout pipe of the previous stage.
    Upstream(&'a mut P),
    /// A new pipe whose write end the pipeline keeps.
    Piped,
}

/// Stdout handed to a stage at launch.
#[derive(Debug)]
pub enum StageStdout {
    /// Parent's stdout.
    Inherited,
    /// An opened file or stream.
    Bound(Stdio),
    /// A new pipe whose read end is taken by the next stage or the caller.
    Piped,
}

/// Complete I/O assignment for one stage.
#[derive(Debug)]
pub struct StageIo<'a, P> {
    /// Stdin source.
    pub stdin: StageStdin<'a, P>,
    /// Stdout sink.
    pub stdout: StageStdout,
    /// Stderr sink; `None` inherits the parent's.
    pub stderr: Option<Stdio>,
}

/// A running stage process.
pub trait StageProcess {
    /// Take the write end of a piped stdin.
    fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>>;

    /// Take the read end of a piped stdout.
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Block until the process exits.
    fn wait(&mut self) -> io::Result<StageExit>;

    /// Terminate the process.
    fn kill(&mut self) -> io::Result<()>;
}

/// Starts stage processes.
pub trait Launcher {
    /// Process type produced.
    type Process: StageProcess;

    /// Start `argv` with the given I/O. No shell is involved.
    fn launch(&mut self, argv: &[String], io: StageIo<'_, Self::Process>)
        -> io::Result<Self::Process>;
}

/// Launcher backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    type Process = Child;

    fn launch(&mut self, argv: &[String], io: StageIo<'_, Child>) -> io::Result<Child> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        let stdin = match io.stdin {
            StageStdin::Inherited => Stdio::inherit(),
            StageStdin::Bound(stdio) => stdio,
            StageStdin::Piped => Stdio::piped(),
            StageStdin::Upstream(upstream) => upstream.stdout.take().map(Stdio::from).ok_or_else(
                || io::Error::new(io::ErrorKind::BrokenPipe, "upstream stage has no stdout pipe"),
            )?,
        };
        let stdout = match io.stdout {
            StageStdout::Inherited => Stdio::inherit(),
            StageStdout::Bound(stdio) => stdio,
            StageStdout::Piped => Stdio::piped(),
        };

        Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(io.stderr.unwrap_or_else(Stdio::inherit))
            .spawn()
    }
}

impl StageProcess for Child {
    fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>> {
        self.stdin
            .take()
            .map(|stdin| Box::new(stdin) as Box<dyn Write + Send>)
    }

    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout
            .take()
            .map(|stdout| Box::new(stdout) as Box<dyn Read + Send>)
    }

    fn wait(&mut self) -> io::Result<StageExit> {
        Child::wait(self).map(StageExit::from)
    }

    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)
    }
}
