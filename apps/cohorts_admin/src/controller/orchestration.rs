//! Command orchestration helpers between the view-model and the backend worker.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::CohortsEvent, view_model::CohortsViewModel};

/// Queues `cmd` without blocking the interaction thread.
///
/// The error string is meant for display in the view.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued view->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "backend command queue full");
            Err("Command queue is full; please retry".to_string())
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::warn!(command = cmd_name, "backend command processor disconnected");
            Err("Cohort service worker is not running; restart the application".to_string())
        }
    }
}

/// Applies every event already waiting in `ui_rx`. Returns how many were applied.
pub fn drain_events(view_model: &mut CohortsViewModel, ui_rx: &Receiver<CohortsEvent>) -> usize {
    let mut applied = 0;
    while let Ok(event) = ui_rx.try_recv() {
        view_model.apply(event);
        applied += 1;
    }
    applied
}

/// Feeds backend events into `view_model` until it has nothing in flight.
pub fn settle(
    view_model: &mut CohortsViewModel,
    ui_rx: &Receiver<CohortsEvent>,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while view_model.is_busy() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match ui_rx.recv_timeout(remaining) {
            Ok(event) => view_model.apply(event),
            Err(RecvTimeoutError::Timeout) => {
                bail!("timed out after {timeout:?} waiting for the cohort service")
            }
            Err(RecvTimeoutError::Disconnected) => {
                bail!("cohort service worker stopped before answering")
            }
        }
    }
    Ok(())
}
