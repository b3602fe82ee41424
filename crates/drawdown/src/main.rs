use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use drawdown::{DeterministicReport, Dollars, MonteCarloReport, init_logging, load_config};
use drawdown_core::{project_deterministic, simulate_monte_carlo};

#[derive(Parser, Debug)]
#[command(name = "drawdown")]
#[command(about = "Project retirement portfolio sustainability under uncertain returns")]
struct Args {
    /// Configuration file (.yaml/.yml or .json)
    config: PathBuf,

    /// Run a single projection at expected returns instead of Monte Carlo
    #[arg(short, long)]
    deterministic: bool,

    /// Override the number of Monte Carlo trajectories
    #[arg(short = 'n', long)]
    simulations: Option<usize>,

    /// Override the master seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print results as JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Show report amounts in nominal dollars
    #[arg(long, requires = "inflation")]
    nominal: bool,

    /// Annual inflation rate used by --nominal (e.g. 0.025)
    #[arg(long)]
    inflation: Option<f64>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    let mut config = load_config(&args.config)?;
    if let Some(n) = args.simulations {
        config.num_simulations = n;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let dollars = match (args.nominal, args.inflation) {
        (true, Some(inflation)) => Dollars::Nominal { inflation },
        _ => Dollars::Real,
    };

    tracing::info!(
        config = %args.config.display(),
        deterministic = args.deterministic,
        "Running projection"
    );

    if args.deterministic {
        let results = project_deterministic(&config).wrap_err("Projection failed")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            print!(
                "{}",
                DeterministicReport {
                    config: &config,
                    results: &results,
                    dollars,
                }
            );
        }
    } else {
        let results = simulate_monte_carlo(&config).wrap_err("Simulation failed")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            print!(
                "{}",
                MonteCarloReport {
                    config: &config,
                    results: &results,
                    dollars,
                }
            );
        }
    }

    Ok(())
}
