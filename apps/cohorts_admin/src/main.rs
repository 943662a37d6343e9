use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CohortService, HttpCohortService, MissingCohortService};
use crossbeam_channel::bounded;
use shared::domain::CohortName;
use tracing_subscriber::EnvFilter;

use cohorts_admin::{
    backend_bridge::{commands::BackendCommand, runtime},
    config::{self, Settings},
    controller::{events::CohortsEvent, orchestration::settle, view_model::CohortsViewModel},
    ui::grid::render_table,
};

const COMMAND_QUEUE_CAPACITY: usize = 256;
const EVENT_QUEUE_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "cohorts-admin", about = "List and remove cohorts")]
struct Args {
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Cohort service base URL, e.g. http://localhost:8080/api
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of cohorts.
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Delete a cohort by name.
    Remove { name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(url) = args.server_url {
        settings.set_server_url(url);
    }
    let service = build_service(&settings)?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = bounded::<CohortsEvent>(EVENT_QUEUE_CAPACITY);
    let worker = runtime::launch(cmd_rx, ui_tx, service);

    let wait = settings.settle_timeout();
    let mut view_model = CohortsViewModel::new(cmd_tx, settings.view_options());
    settle(&mut view_model, &ui_rx, wait).context("initial cohort listing")?;

    match args.command {
        Command::List {
            filter,
            order,
            limit,
            page,
        } => {
            if let Some(limit) = limit {
                view_model.change_page_size(limit);
                settle(&mut view_model, &ui_rx, wait)?;
            }
            if let Some(filter) = filter {
                view_model.search(filter);
                settle(&mut view_model, &ui_rx, wait)?;
            }
            if let Some(order) = order {
                view_model.change_sort_order(order);
                settle(&mut view_model, &ui_rx, wait)?;
            }
            if let Some(page) = page {
                view_model.change_page(page);
                settle(&mut view_model, &ui_rx, wait)?;
            }
        }
        Command::Remove { name } => {
            let name = CohortName::new(name);
            if view_model.remove(&name) {
                settle(&mut view_model, &ui_rx, wait)
                    .with_context(|| format!("removing cohort '{name}'"))?;
            } else if view_model.error().is_none() {
                tracing::warn!(cohort = %name, "cohort is not in the current listing");
            }
        }
    }

    print!("{}", render_table(&view_model));

    let error = view_model.error().map(str::to_owned);
    // Closing both queues stops the worker and releases any task still
    // waiting to deliver.
    drop(view_model);
    drop(ui_rx);
    if worker.join().is_err() {
        tracing::error!("cohort service worker panicked");
    }

    if let Some(error) = error {
        bail!(error);
    }
    Ok(())
}

fn build_service(settings: &Settings) -> Result<Arc<dyn CohortService>> {
    match settings.server_url.as_deref() {
        Some(url) => {
            let service = HttpCohortService::with_timeout(url, settings.request_timeout())
                .with_context(|| format!("failed to configure cohort service client for '{url}'"))?;
            Ok(Arc::new(service))
        }
        None => {
            tracing::warn!("no cohort service url configured; set --server-url or COHORTS_SERVER_URL");
            Ok(Arc::new(MissingCohortService))
        }
    }
}
