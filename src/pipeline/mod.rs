//! Chains of external processes presented as a single stream.
//!
//! Stage `i`'s stdout feeds stage `i + 1`'s stdin. In [`PipeMode::Read`] the
//! caller reads the last stage's output; in [`PipeMode::Write`] it writes the
//! first stage's input. The opposite end is inherited, bound to a file or
//! stream, or (read mode only) fed from memory.
//!
//! Exit statuses are collected in construction order once the pipeline is
//! waited on, and the first failing stage is reported.

mod error;
mod launcher;
mod wiring;

use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, warn};

pub use error::{PipelineError, StageExit, StageFailure};
pub use launcher::{Launcher, StageIo, StageProcess, StageStdin, StageStdout, SystemLauncher};
pub use wiring::{plan, PipeEnd, PipeMode, StageWiring, StdinPlan, StdoutPlan};

use error::SIGPIPE;
use wiring::{resolve_far_end, resolve_stderr, ResolvedEnd};

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// Stages started, not yet waited on.
    Running,
    /// Every stage succeeded.
    Succeeded,
    /// At least one stage failed; holds the first in construction order.
    Failed(StageFailure),
}

struct Stage<P> {
    argv: Vec<String>,
    process: P,
}

/// A running chain of external processes.
pub struct Pipeline<P: StageProcess = Child> {
    mode: PipeMode,
    stages: Vec<Stage<P>>,
    description: String,
    reader: Option<Box<dyn Read + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    feeder: Option<JoinHandle<io::Result<()>>>,
    allow_sigpipe: bool,
    state: PipelineState,
}

impl Pipeline<Child> {
    /// Start configuring a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Start a read pipeline whose first stage inherits stdin.
    pub fn read<I, C, S>(commands: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().commands(commands).mode(PipeMode::Read).spawn()
    }

    /// Start a write pipeline whose last stage inherits stdout.
    pub fn write<I, C, S>(commands: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder().commands(commands).mode(PipeMode::Write).spawn()
    }
}

impl<P: StageProcess> Pipeline<P> {
    /// Every command joined with `" | "`, whitespace-bearing arguments quoted.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Which end the caller holds.
    pub fn mode(&self) -> PipeMode {
        self.mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; a pipeline has at least one stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Argument vectors of every stage.
    pub fn commands(&self) -> impl Iterator<Item = &[String]> {
        self.stages.iter().map(|stage| stage.argv.as_slice())
    }

    /// Close the caller's end and wait for every stage.
    ///
    /// Returns 0 on success. When a stage failed, returns its exit code if
    /// `no_error` is set and raises [`PipelineError::Stage`] otherwise. Later
    /// calls return the recorded outcome without waiting again.
    pub fn wait(&mut self, no_error: bool) -> Result<i32, PipelineError> {
        if self.state == PipelineState::Running {
            self.finish();
        }
        match &self.state {
            PipelineState::Failed(failure) if no_error => Ok(failure.exit_code()),
            PipelineState::Failed(failure) => Err(failure.clone().into()),
            _ => Ok(0),
        }
    }

    /// Wait if still running, then raise any recorded failure.
    ///
    /// Safe to call unconditionally during cleanup.
    pub fn close(&mut self) -> Result<(), PipelineError> {
        self.wait(false).map(|_| ())
    }

    fn finish(&mut self) {
        match self.mode {
            PipeMode::Write => {
                if let Some(mut writer) = self.writer.take() {
                    if let Err(err) = writer.flush() {
                        debug!(pipeline = %self.description, error = %err, "flush on close failed");
                    }
                }
            }
            PipeMode::Read => {
                // Unread output would leave producers blocked on a full pipe.
                if let Some(reader) = self.reader.as_mut() {
                    if let Err(err) = io::copy(reader, &mut io::sink()) {
                        debug!(pipeline = %self.description, error = %err, "drain on close failed");
                    }
                }
            }
        }

        if let Some(feeder) = self.feeder.take() {
            match feeder.join() {
                Ok(Err(err)) if err.kind() != io::ErrorKind::BrokenPipe => {
                    warn!(pipeline = %self.description, error = %err, "feeding pipeline input failed");
                }
                Err(_) => warn!(pipeline = %self.description, "pipeline input feeder panicked"),
                _ => {}
            }
        }

        let mut first_failure = None;
        for (idx, stage) in self.stages.iter_mut().enumerate() {
            let exit = stage.process.wait().unwrap_or_else(|err| {
                warn!(command = %join_command(&stage.argv), error = %err, "wait failed");
                StageExit::Unknown
            });
            debug!(stage = idx, command = %join_command(&stage.argv), ?exit, "stage exited");

            let tolerated = self.allow_sigpipe && exit == StageExit::Signaled(SIGPIPE);
            if !exit.success() && !tolerated && first_failure.is_none() {
                first_failure = Some(StageFailure {
                    stage: idx,
                    command: join_command(&stage.argv),
                    exit,
                    description: self.description.clone(),
                });
            }
        }

        self.reader = None;
        self.state = match first_failure {
            Some(failure) => PipelineState::Failed(failure),
            None => PipelineState::Succeeded,
        };
    }
}

impl<P: StageProcess> Read for Pipeline<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(not_open(&self.description, "reading")),
        }
    }
}

impl<P: StageProcess> Write for Pipeline<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(not_open(&self.description, "writing")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Err(not_open(&self.description, "writing")),
        }
    }
}

impl<P: StageProcess> Drop for Pipeline<P> {
    fn drop(&mut self) {
        if self.state == PipelineState::Running {
            self.finish();
            if let PipelineState::Failed(failure) = &self.state {
                warn!(%failure, "pipeline dropped without close");
            }
        }
    }
}

impl<P: StageProcess> fmt::Debug for Pipeline<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("description", &self.description)
            .field("mode", &self.mode)
            .field("stages", &self.stages.len())
            .field("state", &self.state)
            .finish()
    }
}

fn not_open(description: &str, what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("pipeline \"{description}\" is not open for {what}"),
    )
}

/// Join one argument vector, quoting arguments that contain whitespace.
pub fn join_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join every stage with `" | "`.
pub fn describe<A: AsRef<[String]>>(commands: &[A]) -> String {
    commands
        .iter()
        .map(|argv| join_command(argv.as_ref()))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// Collects commands and end bindings for a [`Pipeline`].
#[derive(Debug)]
pub struct PipelineBuilder {
    commands: Vec<Vec<String>>,
    mode: PipeMode,
    other_end: PipeEnd,
    stderr: PipeEnd,
    allow_sigpipe: bool,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            mode: PipeMode::Read,
            other_end: PipeEnd::Inherited,
            stderr: PipeEnd::Inherited,
            allow_sigpipe: false,
        }
    }
}

impl PipelineBuilder {
    /// Append one stage.
    pub fn command<C, S>(mut self, argv: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands
            .push(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Append several stages.
    pub fn commands<I, C, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for argv in commands {
            self = self.command(argv);
        }
        self
    }

    /// Which end the caller holds. Defaults to [`PipeMode::Read`].
    pub fn mode(mut self, mode: PipeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bind the far end: first stdin for read, last stdout for write.
    pub fn other_end(mut self, end: PipeEnd) -> Self {
        self.other_end = end;
        self
    }

    /// Send every stage's stderr to a file.
    pub fn stderr(mut self, end: PipeEnd) -> Self {
        self.stderr = end;
        self
    }

    /// Do not count SIGPIPE terminations as failures.
    pub fn allow_sigpipe(mut self, allow: bool) -> Self {
        self.allow_sigpipe = allow;
        self
    }

    /// Start the stages as OS processes.
    pub fn spawn(self) -> Result<Pipeline<Child>, PipelineError> {
        self.spawn_with(&mut SystemLauncher)
    }

    /// Start the stages through `launcher`.
    pub fn spawn_with<L: Launcher>(
        self,
        launcher: &mut L,
    ) -> Result<Pipeline<L::Process>, PipelineError> {
        if self.commands.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        if let Some(idx) = self.commands.iter().position(Vec::is_empty) {
            return Err(PipelineError::EmptyCommand(idx));
        }

        let description = describe(&self.commands);
        let far_end = resolve_far_end(self.other_end, self.mode)?;
        let stderr = resolve_stderr(self.stderr)?;
        let wiring = plan(self.commands.len(), self.mode, far_end.is_inherited());

        let (mut far_stream, feed) = match far_end {
            ResolvedEnd::Inherited => (None, None),
            ResolvedEnd::Stream(stdio) => (Some(stdio), None),
            ResolvedEnd::Feed(buf) => (None, Some(buf)),
        };

        let mut processes: Vec<L::Process> = Vec::with_capacity(self.commands.len());
        for (argv, wires) in self.commands.iter().zip(&wiring) {
            let stderr = match &stderr {
                Some(file) => match file.try_clone() {
                    Ok(file) => Some(Stdio::from(file)),
                    Err(source) => {
                        abort_launched(&mut processes);
                        return Err(PipelineError::Spawn {
                            command: join_command(argv),
                            description,
                            source,
                        });
                    }
                },
                None => None,
            };
            let stdout = match wires.stdout {
                StdoutPlan::Inherited => StageStdout::Inherited,
                StdoutPlan::OtherEnd => far_stream
                    .take()
                    .map_or(StageStdout::Inherited, StageStdout::Bound),
                StdoutPlan::Downstream | StdoutPlan::Caller => StageStdout::Piped,
            };
            let launched = {
                let stdin = match wires.stdin {
                    StdinPlan::Inherited => StageStdin::Inherited,
                    StdinPlan::OtherEnd if feed.is_some() => StageStdin::Piped,
                    StdinPlan::OtherEnd => far_stream
                        .take()
                        .map_or(StageStdin::Inherited, StageStdin::Bound),
                    StdinPlan::Upstream => match processes.last_mut() {
                        Some(upstream) => StageStdin::Upstream(upstream),
                        None => StageStdin::Inherited,
                    },
                    StdinPlan::Caller => StageStdin::Piped,
                };
                launcher.launch(
                    argv,
                    StageIo {
                        stdin,
                        stdout,
                        stderr,
                    },
                )
            };

            match launched {
                Ok(process) => {
                    debug!(stage = processes.len(), command = %join_command(argv), "launched pipeline stage");
                    processes.push(process);
                }
                Err(source) => {
                    abort_launched(&mut processes);
                    return Err(PipelineError::Spawn {
                        command: join_command(argv),
                        description,
                        source,
                    });
                }
            }
        }

        let mut reader = None;
        let mut writer = None;
        let mut feeder = None;
        let handles_ok = match self.mode {
            PipeMode::Read => {
                reader = processes.last_mut().and_then(StageProcess::take_stdout);
                let fed = match feed {
                    Some(buf) => match processes.first_mut().and_then(StageProcess::take_stdin) {
                        Some(mut input) => {
                            feeder = Some(std::thread::spawn(move || {
                                input.write_all(&buf)?;
                                input.flush()
                            }));
                            true
                        }
                        None => false,
                    },
                    None => true,
                };
                reader.is_some() && fed
            }
            PipeMode::Write => {
                writer = processes.first_mut().and_then(StageProcess::take_stdin);
                writer.is_some()
            }
        };
        if !handles_ok {
            abort_launched(&mut processes);
            return Err(PipelineError::Spawn {
                command: join_command(&self.commands[0]),
                description,
                source: io::Error::new(io::ErrorKind::BrokenPipe, "launcher did not provide the caller's pipe"),
            });
        }

        let stages = self
            .commands
            .into_iter()
            .zip(processes)
            .map(|(argv, process)| Stage { argv, process })
            .collect();

        Ok(Pipeline {
            mode: self.mode,
            stages,
            description,
            reader,
            writer,
            feeder,
            allow_sigpipe: self.allow_sigpipe,
            state: PipelineState::Running,
        })
    }
}

/// Kill and reap stages started before a launch failure.
fn abort_launched<P: StageProcess>(processes: &mut Vec<P>) {
    for mut process in processes.drain(..) {
        if let Err(err) = process.kill() {
            debug!(error = %err, "kill after failed launch");
        }
        if let Err(err) = process.wait() {
            debug!(error = %err, "reap after failed launch");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Seen {
        Inherited,
        Bound,
        Upstream,
        Piped,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SeenOut {
        Inherited,
        Bound,
        Piped,
    }

    #[derive(Debug, Default)]
    struct Journal {
        launches: Vec<(String, Seen, SeenOut, bool)>,
        waits: Vec<usize>,
        killed: Vec<usize>,
        written: Vec<u8>,
    }

    #[derive(Debug)]
    struct FakeProcess {
        idx: usize,
        exit: StageExit,
        output: Vec<u8>,
        journal: Arc<Mutex<Journal>>,
    }

    struct JournalWriter(Arc<Mutex<Journal>>);

    impl Write for JournalWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().written.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl StageProcess for FakeProcess {
        fn take_stdin(&mut self) -> Option<Box<dyn Write + Send>> {
            Some(Box::new(JournalWriter(Arc::clone(&self.journal))))
        }
        fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
            Some(Box::new(io::Cursor::new(std::mem::take(&mut self.output))))
        }
        fn wait(&mut self) -> io::Result<StageExit> {
            self.journal.lock().unwrap().waits.push(self.idx);
            Ok(self.exit)
        }
        fn kill(&mut self) -> io::Result<()> {
            self.journal.lock().unwrap().killed.push(self.idx);
            Ok(())
        }
    }

    /// Launcher handing out scripted exits; `None` fails the launch.
    struct FakeLauncher {
        script: VecDeque<Option<StageExit>>,
        output: Vec<u8>,
        journal: Arc<Mutex<Journal>>,
    }

    impl FakeLauncher {
        fn new(script: impl IntoIterator<Item = Option<StageExit>>) -> Self {
            Self {
                script: script.into_iter().collect(),
                output: b"fake output\n".to_vec(),
                journal: Arc::default(),
            }
        }
    }

    impl Launcher for FakeLauncher {
        type Process = FakeProcess;

        fn launch(
            &mut self,
            argv: &[String],
            io: StageIo<'_, FakeProcess>,
        ) -> io::Result<FakeProcess> {
            let stdin = match io.stdin {
                StageStdin::Inherited => Seen::Inherited,
                StageStdin::Bound(_) => Seen::Bound,
                StageStdin::Upstream(_) => Seen::Upstream,
                StageStdin::Piped => Seen::Piped,
            };
            let stdout = match io.stdout {
                StageStdout::Inherited => SeenOut::Inherited,
                StageStdout::Bound(_) => SeenOut::Bound,
                StageStdout::Piped => SeenOut::Piped,
            };
            let mut journal = self.journal.lock().unwrap();
            let idx = journal.launches.len();
            journal
                .launches
                .push((join_command(argv), stdin, stdout, io.stderr.is_some()));
            match self.script.pop_front().flatten() {
                Some(exit) => Ok(FakeProcess {
                    idx,
                    exit,
                    output: self.output.clone(),
                    journal: Arc::clone(&self.journal),
                }),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "no such program")),
            }
        }
    }

    fn grep_sort() -> PipelineBuilder {
        Pipeline::builder()
            .command(["grep", "foo"])
            .command(["sort"])
    }

    #[test]
    fn description_quotes_whitespace_arguments() {
        let commands = vec![
            vec!["grep".to_string(), "foo bar".to_string()],
            vec!["sort".to_string(), "-k".to_string(), "1".to_string()],
        ];
        assert_eq!(describe(&commands), "grep 'foo bar' | sort -k 1");
        assert_eq!(join_command(&["echo".to_string(), String::new()]), "echo ''");
    }

    #[test]
    fn read_pipeline_wires_each_stage_once() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0)); 3]);
        let mut pipeline = Pipeline::builder()
            .command(["a"])
            .command(["b"])
            .command(["c"])
            .spawn_with(&mut launcher)
            .unwrap();

        let mut out = String::new();
        pipeline.read_to_string(&mut out).unwrap();
        assert_eq!(out, "fake output\n");
        assert_eq!(pipeline.wait(false).unwrap(), 0);

        let journal = launcher.journal.lock().unwrap();
        let wiring: Vec<(Seen, SeenOut)> =
            journal.launches.iter().map(|l| (l.1, l.2)).collect();
        assert_eq!(
            wiring,
            vec![
                (Seen::Inherited, SeenOut::Piped),
                (Seen::Upstream, SeenOut::Piped),
                (Seen::Upstream, SeenOut::Piped),
            ]
        );
        assert_eq!(journal.waits, vec![0, 1, 2]);
    }

    #[test]
    fn clean_exit_returns_zero() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0)); 2]);
        let mut pipeline = grep_sort()
            .other_end(PipeEnd::Memory(Vec::new()))
            .spawn_with(&mut launcher)
            .unwrap();
        assert_eq!(pipeline.description(), "grep foo | sort");
        assert_eq!(pipeline.wait(false).unwrap(), 0);
        assert_eq!(pipeline.state(), &PipelineState::Succeeded);
    }

    #[test]
    fn upstream_failure_is_reported_even_if_downstream_succeeds() {
        let mut launcher =
            FakeLauncher::new([Some(StageExit::Exited(2)), Some(StageExit::Exited(0))]);
        let mut pipeline = grep_sort().spawn_with(&mut launcher).unwrap();
        match pipeline.wait(false) {
            Err(PipelineError::Stage(failure)) => {
                assert_eq!(failure.stage, 0);
                assert_eq!(failure.command, "grep foo");
                assert_eq!(failure.exit_code(), 2);
                assert_eq!(failure.description, "grep foo | sort");
                assert_eq!(
                    failure.to_string(),
                    "process exited with 2: \"grep foo\" in pipeline \"grep foo | sort\""
                );
            }
            other => panic!("expected stage failure, got {other:?}"),
        }
    }

    #[test]
    fn earliest_constructed_failure_wins() {
        let mut launcher =
            FakeLauncher::new([Some(StageExit::Exited(3)), Some(StageExit::Exited(4))]);
        let mut pipeline = grep_sort().spawn_with(&mut launcher).unwrap();
        assert_eq!(pipeline.wait(true).unwrap(), 3);
    }

    #[test]
    fn wait_and_close_are_idempotent() {
        let mut launcher =
            FakeLauncher::new([Some(StageExit::Exited(0)), Some(StageExit::Exited(1))]);
        let mut pipeline = grep_sort().spawn_with(&mut launcher).unwrap();
        assert_eq!(pipeline.wait(true).unwrap(), 1);
        assert_eq!(pipeline.wait(true).unwrap(), 1);
        assert!(matches!(pipeline.close(), Err(PipelineError::Stage(f)) if f.stage == 1));
        assert!(matches!(pipeline.close(), Err(PipelineError::Stage(_))));
        assert_eq!(launcher.journal.lock().unwrap().waits, vec![0, 1]);
    }

    #[test]
    fn sigpipe_can_be_tolerated() {
        let script = [Some(StageExit::Signaled(SIGPIPE)), Some(StageExit::Exited(0))];
        let mut strict = grep_sort()
            .spawn_with(&mut FakeLauncher::new(script))
            .unwrap();
        assert_eq!(strict.wait(true).unwrap(), 128 + SIGPIPE);

        let mut lenient = grep_sort()
            .allow_sigpipe(true)
            .spawn_with(&mut FakeLauncher::new(script))
            .unwrap();
        assert_eq!(lenient.wait(false).unwrap(), 0);
    }

    #[test]
    fn write_pipeline_hands_caller_first_stdin() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0)); 2]);
        let mut pipeline = Pipeline::builder()
            .command(["gzip", "-c"])
            .command(["wc", "-c"])
            .mode(PipeMode::Write)
            .spawn_with(&mut launcher)
            .unwrap();
        pipeline.write_all(b"ACGT").unwrap();
        let mut buf = [0u8; 1];
        assert!(pipeline.read(&mut buf).is_err());
        pipeline.close().unwrap();
        assert!(pipeline.write_all(b"more").is_err());

        let journal = launcher.journal.lock().unwrap();
        assert_eq!(journal.written, b"ACGT");
        assert_eq!(journal.launches[0].1, Seen::Piped);
        assert_eq!(journal.launches[1].2, SeenOut::Inherited);
    }

    #[test]
    fn memory_input_is_fed_to_first_stage() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0))]);
        let mut pipeline = Pipeline::builder()
            .command(["cat"])
            .other_end(PipeEnd::Memory(b"chr1\t100\n".to_vec()))
            .spawn_with(&mut launcher)
            .unwrap();
        pipeline.close().unwrap();
        let journal = launcher.journal.lock().unwrap();
        assert_eq!(journal.launches[0].1, Seen::Piped);
        assert_eq!(journal.written, b"chr1\t100\n");
    }

    #[test]
    fn launch_failure_reaps_started_stages() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0)), None]);
        let err = grep_sort().spawn_with(&mut launcher).unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { ref command, .. } if command == "sort"));
        let journal = launcher.journal.lock().unwrap();
        assert_eq!(journal.killed, vec![0]);
        assert_eq!(journal.waits, vec![0]);
    }

    #[test]
    fn empty_commands_are_rejected() {
        let mut launcher = FakeLauncher::new([]);
        assert!(matches!(
            Pipeline::builder().spawn_with(&mut launcher),
            Err(PipelineError::EmptyPipeline)
        ));
        assert!(matches!(
            Pipeline::builder()
                .command(["ls"])
                .command(Vec::<String>::new())
                .spawn_with(&mut launcher),
            Err(PipelineError::EmptyCommand(1))
        ));
    }

    #[test]
    fn drop_waits_on_running_pipeline() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(1))]);
        let pipeline = Pipeline::builder()
            .command(["false"])
            .spawn_with(&mut launcher)
            .unwrap();
        drop(pipeline);
        assert_eq!(launcher.journal.lock().unwrap().waits, vec![0]);
    }

    #[test]
    fn bound_stream_sits_on_the_far_end() {
        let mut launcher = FakeLauncher::new([Some(StageExit::Exited(0)); 2]);
        let mut reading = grep_sort()
            .other_end(PipeEnd::BoundStream(Stdio::null()))
            .spawn_with(&mut launcher)
            .unwrap();
        reading.close().unwrap();

        let mut launcher_w = FakeLauncher::new([Some(StageExit::Exited(0)); 2]);
        let mut writing = grep_sort()
            .mode(PipeMode::Write)
            .other_end(PipeEnd::BoundStream(Stdio::null()))
            .spawn_with(&mut launcher_w)
            .unwrap();
        writing.close().unwrap();

        let wiring = |launcher: &FakeLauncher| -> Vec<(Seen, SeenOut)> {
            let journal = launcher.journal.lock().unwrap();
            journal.launches.iter().map(|l| (l.1, l.2)).collect()
        };
        assert_eq!(
            wiring(&launcher),
            vec![(Seen::Bound, SeenOut::Piped), (Seen::Upstream, SeenOut::Piped)]
        );
        assert_eq!(
            wiring(&launcher_w),
            vec![(Seen::Piped, SeenOut::Piped), (Seen::Upstream, SeenOut::Bound)]
        );
    }
}
