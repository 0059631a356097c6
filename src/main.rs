use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use genome_windows::partition::{read_lift, read_sizes, read_unplaced_specs};
use genome_windows::{GenomePartition, PipeEnd, PipeMode, Pipeline, PipelineError};

#[derive(Parser, Debug)]
#[command(
    name = "genome-windows",
    about = "Partition genomes into alignment windows and run tool pipelines"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one window specification per line.
    Windows(WindowArgs),
    /// Run a read pipeline; separate stages with a literal `|` argument.
    Pipe {
        /// File fed to the first stage (default: stdin).
        #[arg(long)]
        input: Option<PathBuf>,
        /// File receiving the last stage's output (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Do not treat SIGPIPE terminations as failures.
        #[arg(long)]
        allow_sigpipe: bool,
        /// Stage commands, e.g. `-- zcat a.gz '|' sort -k1,1`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct WindowArgs {
    /// Sequence sizes (`id<TAB>size` or `path<TAB>id<TAB>size`).
    #[arg(long)]
    sizes: PathBuf,
    /// Lift file describing ungapped regions.
    #[arg(long)]
    lift: Option<PathBuf>,
    /// Unplaced sequence name or glob (repeatable).
    #[arg(long = "unplaced")]
    unplaced: Vec<String>,
    /// File with one unplaced name or glob per line.
    #[arg(long)]
    unplaced_file: Option<PathBuf>,
    /// Sequence to leave out entirely (repeatable).
    #[arg(long = "skip")]
    skip: Vec<String>,
    /// Window width in bases.
    #[arg(long)]
    window_size: u64,
    /// Bases shared by consecutive windows.
    #[arg(long, default_value_t = 0)]
    overlap: u64,
    /// Gaps shorter than this are bridged.
    #[arg(long, default_value_t = 0)]
    max_gap: u64,
    /// Unplaced regions shorter than this are dropped.
    #[arg(long, default_value_t = 0)]
    min_unplaced_size: u64,
    /// Print the full region and window listing instead of specs.
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Windows(args) => run_windows(args)?,
        Commands::Pipe {
            input,
            output,
            allow_sigpipe,
            command,
        } => {
            let code = run_pipe(input, output, allow_sigpipe, command)?;
            if code != 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn run_windows(args: WindowArgs) -> Result<()> {
    let sizes = read_sizes(open(&args.sizes)?)
        .with_context(|| format!("failed to read sizes from {}", args.sizes.display()))?;

    let mut unplaced = args.unplaced;
    if let Some(path) = &args.unplaced_file {
        let specs = read_unplaced_specs(open(path)?)
            .with_context(|| format!("failed to read unplaced specs from {}", path.display()))?;
        unplaced.extend(specs);
    }

    let mut builder = GenomePartition::builder()
        .window_size(args.window_size)
        .overlap(args.overlap)
        .max_gap(args.max_gap)
        .min_unplaced_size(args.min_unplaced_size)
        .unplaced(unplaced)
        .skip(args.skip);
    if let Some(path) = &args.lift {
        let entries = read_lift(open(path)?)
            .with_context(|| format!("failed to read lift from {}", path.display()))?;
        builder = builder.lift(entries);
    }

    let partition = builder.build(sizes).context("partitioning failed")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if args.dump {
        out.write_all(partition.dump().as_bytes())?;
    } else {
        for view in partition.views() {
            writeln!(out, "{view}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn split_stages(words: Vec<String>) -> Result<Vec<Vec<String>>> {
    let mut stages = vec![Vec::new()];
    for word in words {
        if word == "|" {
            stages.push(Vec::new());
        } else if let Some(stage) = stages.last_mut() {
            stage.push(word);
        }
    }
    if stages.iter().any(Vec::is_empty) {
        bail!("empty stage in pipeline command");
    }
    Ok(stages)
}

fn run_pipe(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    allow_sigpipe: bool,
    command: Vec<String>,
) -> Result<i32> {
    let stages = split_stages(command)?;
    let other_end = input.map_or(PipeEnd::Inherited, PipeEnd::file);

    let mut pipeline = Pipeline::builder()
        .commands(stages)
        .mode(PipeMode::Read)
        .other_end(other_end)
        .allow_sigpipe(allow_sigpipe)
        .spawn()
        .context("failed to start pipeline")?;

    let mut sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    io::copy(&mut pipeline, &mut sink)
        .and_then(|_| sink.flush())
        .with_context(|| format!("failed to copy output of \"{}\"", pipeline.description()))?;

    match pipeline.wait(false) {
        Ok(code) => Ok(code),
        Err(PipelineError::Stage(failure)) => {
            eprintln!("{failure}");
            Ok(failure.exit_code())
        }
        Err(err) => Err(err.into()),
    }
}
