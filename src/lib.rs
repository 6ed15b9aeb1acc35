pub mod cli;
pub mod compose;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod engine;
pub mod error;
pub mod group;
pub mod header;
pub mod inspect;
pub mod io_utils;
pub mod join;
pub mod reconcile_cmd;
pub mod serial;
pub mod table;
pub mod view;
pub mod view_cmd;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    dataset::{Dataset, ReconciledDataset, Record, Scalar},
    engine::{AuxiliarySource, Notice, Reconciliation, SourceReport, Supersession, reconcile},
    error::DatasetError,
    group::SelectionPolicy,
    view::{PageSize, Pager, ViewQuery, ViewerRole},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile(args) => reconcile_cmd::execute(&args),
        Commands::View(args) => view_cmd::execute(&args),
        Commands::Inspect(args) => inspect::execute(&args),
    }
}
