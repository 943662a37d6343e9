//! Backend worker: executes queued commands against the cohort service.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::CohortService;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{CohortsEvent, UiError, UiErrorContext};

/// Starts the worker thread. It runs until every command sender is dropped.
///
/// Each command runs as its own task, so overlapping requests complete
/// independently and in whatever order the service answers.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<CohortsEvent>,
    service: Arc<dyn CohortService>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(CohortsEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let service = Arc::clone(&service);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = run_command(service.as_ref(), cmd).await;
                    deliver(&ui_tx, event);
                });
            }
            tracing::debug!("cohort command queue closed; backend worker stopping");
        });
    })
}

async fn run_command(service: &dyn CohortService, cmd: BackendCommand) -> CohortsEvent {
    match cmd {
        BackendCommand::FetchCohorts { request, query } => {
            match service.get_cohorts(query.as_ref()).await {
                Ok(cohorts) => CohortsEvent::CohortsLoaded { request, cohorts },
                Err(err) => {
                    tracing::warn!(%request, "cohorts: listing failed: {err}");
                    CohortsEvent::CohortsLoadFailed {
                        request,
                        error: UiError::from_message(UiErrorContext::LoadCohorts, err.to_string()),
                    }
                }
            }
        }
        BackendCommand::RemoveCohort { name } => match service.remove_cohort(&name).await {
            Ok(()) => CohortsEvent::CohortRemoved { name },
            // Deleting a cohort that is already gone leaves the same outcome.
            Err(err) if err.is_not_found() => {
                tracing::debug!(cohort = %name, "cohorts: already removed: {err}");
                CohortsEvent::CohortRemoved { name }
            }
            Err(err) => {
                tracing::warn!(cohort = %name, "cohorts: removal failed: {err}");
                CohortsEvent::CohortRemoveFailed {
                    name,
                    error: UiError::from_message(UiErrorContext::RemoveCohort, err.to_string()),
                }
            }
        },
    }
}

/// Waits for room in the event queue. Completions are only dropped once the
/// view has hung up.
fn deliver(ui_tx: &Sender<CohortsEvent>, event: CohortsEvent) {
    if tokio::task::block_in_place(|| ui_tx.send(event)).is_err() {
        tracing::debug!("cohort view closed; dropping completion");
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
