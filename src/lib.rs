pub mod cli;
pub mod core;
pub mod store;

use crate::cli::Section;
use crate::core::cache::calculate_metrics_cached;
use crate::core::config::AppConfig;
use crate::core::filter::FilterArgs;
use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Dashboard,
    Market,
    Share,
    Categories,
    Adoption,
    Tiers,
    Export { output: Option<PathBuf> },
}

/// Options shared by every data command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub data_path: Option<PathBuf>,
    pub filters: FilterArgs,
    pub no_cache: bool,
}

pub fn run_command(command: AppCommand, options: &RunOptions) -> Result<()> {
    info!("BNPL dashboard starting...");

    let config = match options.config_path.as_deref() {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = match (&options.data_path, &config.data_path) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => {
            bail!("No dataset given, pass --data or set data_path in the config file")
        }
    };

    let dataset = cli::load_dataset(&data_path)?;
    let selection = options.filters.resolve(&dataset, &config)?;
    let filtered = dataset.filter(&selection);
    if filtered.is_empty() {
        info!("No retailers match the selected filters");
    }

    let sections: &[Section] = match command {
        AppCommand::Export { output } => return cli::export::run(&filtered, output.as_deref()),
        AppCommand::Dashboard => &Section::ALL,
        AppCommand::Market => &[Section::Market],
        AppCommand::Share => &[Section::Share],
        AppCommand::Categories => &[Section::Categories],
        AppCommand::Adoption => &[Section::Adoption],
        AppCommand::Tiers => &[Section::Tiers],
    };

    let cache = if options.no_cache {
        None
    } else {
        store::open_metrics_cache(&config)
    };
    let metrics = calculate_metrics_cached(filtered.records(), &selection, cache.as_deref());

    println!(
        "{}",
        cli::render_sections(sections, &selection, &metrics, filtered.len())
    );
    Ok(())
}
