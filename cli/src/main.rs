mod interactive;

use std::{fs::File, path::PathBuf};

use anyhow::Result;
use cache_sim::{
    cache::AssociativeCache,
    config::CacheConfig,
    scenario::Scenario,
    stat::{AddStats, Stats},
    trace::Trace,
};
use clap::{Args, Parser, Subcommand};
use terminal_size::terminal_size;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run built-in access scenarios on one cache
    Run(RunArgs),
    /// replay a JSON trace file
    Trace(TraceArgs),
    /// issue accesses by hand
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    /// File path to cache geometry (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of blocks in the cache (overrides config)
    #[arg(long)]
    num_blocks: Option<usize>,
    /// Words per block, a power of two (overrides config)
    #[arg(long = "block-size")]
    block_size_words: Option<usize>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    delegate: CommonArgs,
    /// Scenarios to run in order (all when omitted)
    scenarios: Vec<Scenario>,
    /// Print every cache line at the end
    #[arg(long)]
    dump: bool,
}

#[derive(Args, Debug)]
struct TraceArgs {
    #[command(flatten)]
    delegate: CommonArgs,
    /// File path to input trace
    input: PathBuf,
    /// Print every cache line at the end
    #[arg(long)]
    dump: bool,
}

#[derive(Args, Debug)]
struct InteractiveArgs {
    #[command(flatten)]
    delegate: CommonArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Run(RunArgs {
            delegate,
            scenarios,
            dump,
        }) => {
            let mut cache = setup(&delegate)?;
            let scenarios = if scenarios.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                scenarios
            };
            let max_width = get_terminal_width().unwrap_or(120) as usize;
            for report in run_scenarios(&mut cache, scenarios, dump, max_width)? {
                println!("{report}");
            }
            Ok(())
        }
        Command::Trace(TraceArgs {
            delegate,
            input,
            dump,
        }) => {
            let mut cache = setup(&delegate)?;
            let trace = Trace::deser(File::open(&input)?)?;
            log::info!("finished parsing trace. # of accesses: {}", trace.len());
            cache.access_all(trace)?;
            log::info!("finished replay.");
            output_stat(&cache, dump);
            Ok(())
        }
        Command::Interactive(InteractiveArgs { delegate }) => {
            let mut cache = setup(&delegate)?;
            interactive::execute_interactive(&mut cache)
        }
    }
}

fn setup(args: &CommonArgs) -> Result<AssociativeCache> {
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
    let mut config = read_config(args.config.as_ref())?;
    if let Some(n) = args.num_blocks {
        config.num_blocks = n;
    }
    if let Some(b) = args.block_size_words {
        config.block_size_words = b;
    }
    Ok(config.build()?)
}

fn read_config(config: Option<&PathBuf>) -> Result<CacheConfig> {
    let config = match config {
        Some(p) => {
            let file = File::open(p)?;
            CacheConfig::deser(file)?
        }
        None => Default::default(),
    };
    Ok(config)
}

/// one report per phase; the dump rides along with the final phase only.
fn run_scenarios(
    cache: &mut AssociativeCache,
    scenarios: Vec<Scenario>,
    dump: bool,
    max_width: usize,
) -> Result<Vec<String>> {
    let last = scenarios.len().saturating_sub(1);
    let mut reports = Vec::with_capacity(scenarios.len());
    for (i, sc) in scenarios.into_iter().enumerate() {
        let accesses = sc.accesses();
        log::info!("{sc}: {} accesses.", accesses.len());
        cache.access_all(accesses)?;
        reports.push(format!(
            "simulating {sc}:\n{}",
            render_stat(cache, dump && i == last, max_width)
        ));
    }
    Ok(reports)
}

fn render_stat(cache: &AssociativeCache, dump: bool, max_width: usize) -> String {
    let mut stats = Stats::default();
    cache.add_stats(&mut stats);
    if dump {
        stats.push(Box::new(cache.dump()));
    }
    let out = stats.view(max_width).to_string();
    out
}

fn output_stat(cache: &AssociativeCache, dump: bool) {
    let max_width = get_terminal_width().unwrap_or(120) as usize;
    println!("{}", render_stat(cache, dump, max_width));
}

fn get_terminal_width() -> Option<u16> {
    terminal_size().map(|(w, _)| w.0.saturating_sub(20))
}
