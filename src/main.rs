use anyhow::Result;
use bnpl_dash::cli::export::DEFAULT_EXPORT_FILE;
use bnpl_dash::core::filter::FilterArgs;
use bnpl_dash::core::log::init_logging;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Retailer dataset (CSV), overrides data_path from the config
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Skip the persistent metrics cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(flatten)]
    filters: Filters,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Filters {
    /// Year to analyse, defaults to the configured year
    #[arg(short, long, global = true)]
    year: Option<i32>,

    /// Named region from the config, or "All"
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Country code, repeat to select several
    #[arg(long = "country", global = true)]
    countries: Vec<String>,

    /// Product category, repeat to select several
    #[arg(long = "category", global = true)]
    categories: Vec<String>,

    /// BNPL type, e.g. "Outsourced only BNPL"; repeat to select several
    #[arg(long = "bnpl-type", global = true)]
    bnpl_types: Vec<String>,

    /// BNPL provider compared in the tier distribution; repeat to select several
    #[arg(long = "provider", global = true)]
    providers: Vec<String>,
}

impl From<Filters> for FilterArgs {
    fn from(filters: Filters) -> FilterArgs {
        FilterArgs {
            year: filters.year,
            region: filters.region,
            countries: filters.countries,
            categories: filters.categories,
            bnpl_types: filters.bnpl_types,
            providers: filters.providers,
        }
    }
}

impl From<Commands> for bnpl_dash::AppCommand {
    fn from(cmd: Commands) -> bnpl_dash::AppCommand {
        match cmd {
            Commands::Dashboard => bnpl_dash::AppCommand::Dashboard,
            Commands::Market => bnpl_dash::AppCommand::Market,
            Commands::Share => bnpl_dash::AppCommand::Share,
            Commands::Categories => bnpl_dash::AppCommand::Categories,
            Commands::Adoption => bnpl_dash::AppCommand::Adoption,
            Commands::Tiers => bnpl_dash::AppCommand::Tiers,
            Commands::Export { output } => bnpl_dash::AppCommand::Export { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display every dashboard section
    Dashboard,
    /// Display TAM, SAM and SOM per country
    Market,
    /// Display BNPL provider market share
    Share,
    /// Display product categories by volume and revenue
    Categories,
    /// Display BNPL adoption and payment option distribution
    Adoption,
    /// Display revenue contribution and provider spread by retailer tier
    Tiers,
    /// Export the filtered retailers as CSV
    Export {
        /// Output file; `-o` alone writes to filtered_bnpl_data.csv, omitted prints to stdout
        #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = bnpl_dash::RunOptions {
        config_path: cli.config_path,
        data_path: cli.data,
        filters: cli.filters.into(),
        no_cache: cli.no_cache,
    };

    let result = match cli.command {
        Some(Commands::Setup) => bnpl_dash::cli::setup::setup(),
        Some(cmd) => bnpl_dash::run_command(cmd.into(), &options),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
