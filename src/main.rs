use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::info;

use mpi_patterns::error::Result;
use mpi_patterns::message::Classification;
use mpi_patterns::parallel::Comm;
use mpi_patterns::pattern::{Classifier, PhaseSorter, PipelineCoordinator, TreeSorter};
use mpi_patterns::{PatternError, PatternKind, RunOptions, storage};

#[derive(Parser)]
#[command(name = "mpi-patterns", version, about = "Parallel coordination patterns over rank-addressed messaging")]
struct Cli {
    /// Rank count for the in-process backend (ignored under MPI, where
    /// mpiexec decides).
    #[arg(long, default_value_t = 4, global = true)]
    ranks: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Source/workers/sink farm over a directory of images.
    Pipeline {
        /// Directory scanned recursively for .jpg files.
        #[arg(long)]
        images: PathBuf,
        /// Result log, one JSON object per line.
        #[arg(long, default_value = "output.txt")]
        output: PathBuf,
    },
    /// Divide-and-conquer merge sort mapped onto the rank tree.
    TreeSort {
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Decentralized neighbor-exchange sort.
    PhaseSort {
        #[command(flatten)]
        sort: SortArgs,
    },
}

#[derive(clap::Args, Clone)]
struct SortArgs {
    /// Number of elements to generate when no input file is given.
    #[arg(long)]
    size: usize,
    /// JSON array of integers to sort instead of generated input.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Where to persist the sorted array; defaults to sorted-<size>.json.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Command {
    fn pattern(&self) -> PatternKind {
        match self {
            Command::Pipeline { .. } => PatternKind::Pipeline,
            Command::TreeSort { .. } => PatternKind::TreeSort,
            Command::PhaseSort { .. } => PatternKind::PhaseSort,
        }
    }
}

/// Stand-in for the external image classifier: buckets the mean byte value
/// into a brightness label. Keeps the `Classifier` seam of the library
/// exercised without dragging a model runtime into the binary.
struct MeanBrightness;

impl Classifier for MeanBrightness {
    fn classify(&self, bytes: &[u8]) -> Result<Classification> {
        if bytes.is_empty() {
            return Err(PatternError::Classify {
                source_id: String::new(),
                reason: "empty image".into(),
            });
        }
        let mean = bytes.iter().map(|&b| b as u64).sum::<u64>() / bytes.len() as u64;
        let label = match mean {
            0..=63 => "dark",
            64..=127 => "dim",
            128..=191 => "bright",
            _ => "light",
        };
        Ok(Classification {
            label: label.to_string(),
            confidence: (mean % 64) as f32 / 64.0,
        })
    }
}

fn run_pattern<C: Comm>(comm: &C, command: &Command) -> Result<()> {
    match command {
        Command::Pipeline { images, output } => {
            let items = if comm.rank() == 0 {
                storage::collect_work_items(images)?
            } else {
                Vec::new()
            };
            let coordinator = PipelineCoordinator::new(comm)?;
            let summary = coordinator.run(items, &MeanBrightness, output)?;
            info!("rank {}: {:?} handled {} items", comm.rank(), summary.role, summary.items);
        }
        Command::TreeSort { sort } => {
            let input = load_input(comm, sort)?;
            if let Some(sorted) = TreeSorter::run(comm, input)? {
                persist_output(sort, &sorted)?;
            }
        }
        Command::PhaseSort { sort } => {
            let input = load_input(comm, sort)?;
            if let Some(sorted) = PhaseSorter::default().sort(comm, input)? {
                persist_output(sort, &sorted)?;
            }
        }
    }
    Ok(())
}

fn load_input<C: Comm>(comm: &C, args: &SortArgs) -> Result<Option<Vec<i32>>> {
    if comm.rank() != 0 {
        return Ok(None);
    }
    if args.size == 0 {
        return Err(PatternError::Config("size must be at least 1".into()));
    }
    let array = match &args.input {
        Some(path) => storage::load(path)?,
        None => storage::generate_random(args.size),
    };
    Ok(Some(array))
}

fn persist_output(args: &SortArgs, sorted: &[i32]) -> Result<()> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("sorted-{}.json", args.size)));
    storage::save(&path, sorted)?;
    info!("sorted {} elements -> {}", sorted.len(), path.display());
    Ok(())
}

#[cfg(feature = "mpi")]
fn run(cli: Cli) -> Result<()> {
    use mpi_patterns::parallel::MpiComm;

    let comm = MpiComm::new()?;
    RunOptions { pattern: cli.command.pattern(), ranks: comm.size() }.validate()?;
    run_pattern(&comm, &cli.command)
}

#[cfg(not(feature = "mpi"))]
fn run(cli: Cli) -> Result<()> {
    use mpi_patterns::parallel::LocalUniverse;

    RunOptions { pattern: cli.command.pattern(), ranks: cli.ranks }.validate()?;
    let command = &cli.command;
    LocalUniverse::new(cli.ranks).run(|comm| run_pattern(&comm, command))?;
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("mpi-patterns: {err}");
        process::exit(1);
    }
}
