mod commands;
mod input;
mod output;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::audit::AuditArgs;
use commands::distribution::DistributionArgs;
use commands::leaderboard::LeaderboardArgs;
use commands::normalize::NormalizeArgs;
use commands::savings::SavingsArgs;
use commands::Context;

/// Cost benchmarking for housing cooperatives
#[derive(Parser)]
#[command(
    name = "brfb",
    version,
    about = "Cost benchmarking for housing cooperatives",
    long_about = "Normalizes free-text cost categories, computes peer distributions, \
                  estimates savings against the cheapest quartile and ranks entities \
                  on financial metrics. Reads a JSON dataset from --dataset or stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to the JSON dataset (entities and cost records)
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// Path to a TOML engine configuration
    #[arg(long, global = true)]
    config: Option<String>,

    /// Group peers with the built-in Stockholm district table
    #[arg(long, global = true)]
    district_rules: bool,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Map raw cost labels to canonical categories
    Normalize(NormalizeArgs),
    /// Report raw labels no rule classifies
    Audit(AuditArgs),
    /// Distribution of a cost category or metric, optionally with one entity's standing
    Distribution(DistributionArgs),
    /// Estimate annual savings against the peer benchmark quartile
    Savings(SavingsArgs),
    /// Rank entities by a financial metric
    Leaderboard(LeaderboardArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let context = || -> Result<Context, Box<dyn std::error::Error>> {
        let config = settings::load_engine_config(cli.config.as_deref(), cli.district_rules)?;
        Context::load(cli.dataset.as_deref(), config)
    };

    match cli.command {
        Commands::Normalize(args) => commands::normalize::run_normalize(args),
        Commands::Audit(args) => commands::audit::run_audit(args, &context()?),
        Commands::Distribution(args) => commands::distribution::run_distribution(args, &context()?),
        Commands::Savings(args) => commands::savings::run_savings(args, &context()?),
        Commands::Leaderboard(args) => commands::leaderboard::run_leaderboard(args, &context()?),
        Commands::Version => Ok(serde_json::json!({
            "name": "brfb",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = cli.output.clone();

    match run(cli) {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
