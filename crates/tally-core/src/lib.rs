pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod filter;
pub mod notice;
pub mod render;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting tally CLI");

    let mut cfg = config::Config::load(cli.rcfile.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value)));

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let storage = storage::FileStorage::open(&data_dir)
        .with_context(|| format!("failed to open storage at {}", data_dir.display()))?;

    let store = store::TaskStore::open(Box::new(storage));
    debug!(count = store.total_count(), "store loaded");

    let mut controller = controller::Controller::new(store);
    let mut renderer = render::Renderer::new(&cfg)?;
    let inv = cli::Invocation::parse(cli.rest)?;

    commands::dispatch(&mut controller, &mut renderer, inv)?;

    info!("done");
    Ok(())
}
