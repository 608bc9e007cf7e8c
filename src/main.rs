use analyzer::{Analysis, leaderboard};
use anyhow::{Context, bail};
use api_client::IexClient;
use clap::{Args, Parser, Subcommand};
use configuration::{ModeArgs, Settings, init_logging, load_config, load_config_from, load_portfolio};
use core_types::{StatTable, Symbol};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod render;

/// The main entry point for the iexscope market-data tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Tokens usually live in a .env file next to the binary; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines reach the file on exit.
    let _log_guard = init_logging(&settings.logging)?;

    let mode = cli.mode.mode();
    let target = settings.target(mode)?;
    tracing::info!(%mode, base_url = %target.base_url, "Using market data service");

    let client = IexClient::new(&target)?;
    let analysis = Analysis::new(Arc::new(client), settings.api.max_concurrent_requests);

    // Execute the appropriate command
    let result = run(&cli, &settings, &analysis).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Batch market data, company information and momentum rankings for a list of symbols.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    mode: ModeArgs,

    /// Configuration file to read instead of `config.toml`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Symbol list used when a command is given no symbols.
    #[arg(long, value_name = "PATH")]
    portfolio: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key statistics and latest price.
    Stats(TableArgs),
    /// Advanced statistics (valuation ratios, margins, balance sheet figures).
    AdvancedStats(TableArgs),
    /// Company information.
    Info(TableArgs),
    /// Peer tickers.
    Peers(TableArgs),
    /// Sectors supported by the service.
    Sectors,
    /// Rank symbols by percent change over 1M, 3M, 6M and 1Y.
    Momentum(MomentumArgs),
}

#[derive(Args)]
struct TableArgs {
    /// Symbols to look up (e.g. "AAPL MSFT"). Defaults to the portfolio file.
    symbols: Vec<Symbol>,

    /// Comma-separated columns to show.
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    fields: Vec<String>,

    /// Show every column the service returned.
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct MomentumArgs {
    /// Symbols to rank. Defaults to the portfolio file.
    symbols: Vec<Symbol>,

    /// Only show the best N symbols.
    #[arg(long, value_name = "N")]
    top: Option<usize>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: &Cli, settings: &Settings, analysis: &Analysis) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Stats(args) => {
            let symbols = resolve_symbols(&args.symbols, cli, settings)?;
            let table = analysis.get_symbol_stats(&symbols).await?;
            print_stat_table(&table, args, render::STATS_FIELDS, cli.json)
        }
        Commands::AdvancedStats(args) => {
            let symbols = resolve_symbols(&args.symbols, cli, settings)?;
            let table = analysis.get_advanced_symbol_stats(&symbols).await?;
            print_stat_table(&table, args, render::ADVANCED_STATS_FIELDS, cli.json)
        }
        Commands::Info(args) => {
            let symbols = resolve_symbols(&args.symbols, cli, settings)?;
            let table = analysis.get_symbol_info(&symbols).await?;
            print_stat_table(&table, args, render::INFO_FIELDS, cli.json)
        }
        Commands::Peers(args) => {
            let symbols = resolve_symbols(&args.symbols, cli, settings)?;
            let table = analysis.get_peers(&symbols).await?;
            print_stat_table(&table, args, render::PEERS_FIELDS, cli.json)
        }
        Commands::Sectors => {
            let sectors = analysis.get_sectors().await?;
            if cli.json {
                print_json(&sectors)
            } else {
                println!("{}", render::sector_table(&sectors));
                Ok(())
            }
        }
        Commands::Momentum(args) => {
            let symbols = resolve_symbols(&args.symbols, cli, settings)?;
            let mut ranked = leaderboard(analysis.momentum_for(&symbols).await?);
            if let Some(top) = args.top {
                ranked.truncate(top);
            }
            if cli.json {
                print_json(&ranked)
            } else {
                println!("{}", render::momentum_table(&ranked));
                Ok(())
            }
        }
    }
}

/// Symbols given on the command line, or the portfolio file's contents.
/// Symbols are passed on exactly as written.
fn resolve_symbols(
    given: &[Symbol],
    cli: &Cli,
    settings: &Settings,
) -> anyhow::Result<Vec<Symbol>> {
    let portfolio = cli
        .portfolio
        .as_deref()
        .unwrap_or(settings.portfolio.path.as_path());
    symbols_or_portfolio(given, portfolio)
}

fn symbols_or_portfolio(given: &[Symbol], path: &Path) -> anyhow::Result<Vec<Symbol>> {
    if !given.is_empty() {
        return Ok(given.to_vec());
    }

    let symbols = load_portfolio(path)?;
    if symbols.is_empty() {
        bail!(
            "no symbols given and the portfolio file {} is empty",
            path.display()
        );
    }
    Ok(symbols)
}

fn print_stat_table(
    table: &StatTable,
    args: &TableArgs,
    defaults: &[&str],
    json: bool,
) -> anyhow::Result<()> {
    let fields = render::select_fields(table, &args.fields, args.all, defaults);
    if json {
        if args.all {
            print_json(table)
        } else {
            print_json(&render::project(table, &fields))
        }
    } else {
        println!("{}", render::stat_table(table, &fields));
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
