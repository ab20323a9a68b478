pub mod cell_ref;
pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod index;
pub mod io_utils;
pub mod pipeline;
pub mod rewrite;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use log::{LevelFilter, info};

use crate::{cli::Cli, config::Settings, rewrite::RewriteStats};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_annotate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run(cli: Cli) -> Result<RewriteStats> {
    init_logging();
    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("Loading settings from {:?}", cli.config))?;
    cli.apply(&mut settings);
    let stats = pipeline::execute(&settings)?;
    info!(
        "Wrote {} record(s) to {:?}: {} rewritten, {} without definition, {} tag width mismatch(es), {} passed through",
        stats.records,
        settings.output,
        stats.rewritten,
        stats.unmatched,
        stats.width_mismatch,
        stats.passed_through
    );
    Ok(stats)
}
