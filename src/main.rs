use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use csim::report::{self, DEFAULT_RESULTS_FILE};
use csim::{Counters, Geometry, SimError, Simulator, Trace};

#[derive(Parser)]
#[command(
    name = "csim",
    version,
    about = "Set-associative LRU cache simulator for valgrind memory traces"
)]
struct Cli {
    /// Display trace info: every data record followed by its outcome
    #[arg(short, long)]
    verbose: bool,

    /// Number of set index bits (S = 2^s is the number of sets)
    #[arg(short = 's', value_name = "s")]
    set_bits: u32,

    /// Associativity (number of lines per set)
    #[arg(short = 'E', value_name = "E")]
    associativity: usize,

    /// Number of block bits (B = 2^b is the block size)
    #[arg(short = 'b', value_name = "b")]
    block_bits: u32,

    /// Name of the valgrind trace to replay
    #[arg(short = 't', value_name = "TRACE_FILE")]
    trace: PathBuf,

    /// Where to write the raw counters for the grading harness
    #[arg(long, value_name = "RESULTS_FILE", default_value = DEFAULT_RESULTS_FILE)]
    results: PathBuf,

    /// Do not write the results file
    #[arg(long, conflicts_with = "results")]
    no_results: bool,

    /// Print the final cache contents after the summary
    #[arg(long)]
    dump: bool,
}

fn run(cli: &Cli) -> Result<Counters, SimError> {
    let geometry = Geometry::new(cli.set_bits, cli.associativity, cli.block_bits)?;
    let trace = Trace::open(&cli.trace)?;
    info!(trace = %cli.trace.display(), verbose = cli.verbose, "replaying trace");

    let start = Instant::now();
    let mut simulator = Simulator::new(geometry);
    let counters = simulator.run_with(trace, |step| {
        if cli.verbose && step.is_data_access() {
            println!("{}", step);
        }
    })?;
    info!(elapsed = ?start.elapsed(), "trace replayed");

    let mut stdout = io::stdout().lock();
    report::print_summary(&mut stdout, &counters)?;
    if cli.dump {
        simulator.cache().print(&mut stdout)?;
    }
    if !cli.no_results {
        report::write_results(&cli.results, &counters)?;
    }

    Ok(counters)
}

fn main() -> ExitCode {
    fmt::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("csim: {e}");
            ExitCode::FAILURE
        }
    }
}
