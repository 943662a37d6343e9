//! View-model for the cohorts listing screen.
//!
//! The view reads state through `&CohortsViewModel` and reports gestures by
//! calling its operations. Service calls are queued to the backend worker and
//! their completions come back through [`CohortsViewModel::apply`].

use std::{collections::BTreeSet, fmt, time::Duration};

use crossbeam_channel::Sender;
use shared::{
    domain::{Cohort, CohortName},
    protocol::{CohortQuery, FIRST_PAGE},
};
use tracing::{debug, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::CohortsEvent, orchestration::dispatch_backend_command};
use crate::ui::grid::{GridOptions, COHORT_COLUMNS};

pub const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(DEFAULT_FILTER_DEBOUNCE_MS);

/// Sequence number of a listing request. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalState {
    Idle,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortRow {
    pub cohort: Cohort,
    pub removal: RemovalState,
}

impl CohortRow {
    pub fn name(&self) -> &CohortName {
        &self.cohort.name
    }

    pub fn is_removing(&self) -> bool {
        self.removal == RemovalState::Pending
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    draft: String,
    dirty: bool,
}

impl FilterForm {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_pristine(&mut self) {
        self.draft.clear();
        self.dirty = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    show: bool,
    form: Option<FilterForm>,
    debounce: Duration,
}

impl FilterState {
    pub fn is_shown(&self) -> bool {
        self.show
    }

    pub fn form(&self) -> Option<&FilterForm> {
        self.form.as_ref()
    }

    /// Quiet period the view waits after the last keystroke before searching.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub page_size: u32,
    pub order: String,
    pub filter_debounce: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        let query = CohortQuery::default();
        Self {
            page_size: query.limit,
            order: query.order,
            filter_debounce: DEFAULT_FILTER_DEBOUNCE,
        }
    }
}

pub struct CohortsViewModel {
    cmd_tx: Sender<BackendCommand>,
    query: CohortQuery,
    rows: Vec<CohortRow>,
    selected: BTreeSet<CohortName>,
    removing: BTreeSet<CohortName>,
    filter: FilterState,
    error: Option<String>,
    last_request: u64,
    pending: Option<RequestSeq>,
}

impl CohortsViewModel {
    /// Builds the view-model and requests the initial, unconstrained listing.
    pub fn new(cmd_tx: Sender<BackendCommand>, options: ViewOptions) -> Self {
        let mut view_model = Self {
            cmd_tx,
            query: CohortQuery {
                order: options.order,
                ..CohortQuery::with_page_size(options.page_size)
            },
            rows: Vec::new(),
            selected: BTreeSet::new(),
            removing: BTreeSet::new(),
            filter: FilterState {
                show: false,
                form: None,
                debounce: options.filter_debounce,
            },
            error: None,
            last_request: 0,
            pending: None,
        };
        view_model.initialize();
        view_model
    }

    fn initialize(&mut self) {
        self.request_cohorts(None);
    }

    /// Replaces the filter predicate and fetches the matching cohorts.
    pub fn search(&mut self, predicate: impl Into<String>) -> Option<RequestSeq> {
        self.query.filter = predicate.into();
        self.refresh()
    }

    pub fn change_sort_order(&mut self, order: impl Into<String>) -> Option<RequestSeq> {
        self.query.order = order.into();
        self.refresh()
    }

    pub fn change_page(&mut self, page: u32) -> Option<RequestSeq> {
        self.query.page = page;
        self.refresh()
    }

    pub fn change_page_size(&mut self, limit: u32) -> Option<RequestSeq> {
        self.query.limit = limit;
        self.query.page = FIRST_PAGE;
        self.refresh()
    }

    /// Re-fetches with the current query.
    pub fn refresh(&mut self) -> Option<RequestSeq> {
        let query = self.query.clone();
        self.request_cohorts(Some(query))
    }

    pub fn show_filter(&mut self) {
        self.filter.show = true;
        self.filter.form.get_or_insert_with(FilterForm::default);
    }

    pub fn edit_filter(&mut self, text: impl Into<String>) {
        let form = self.filter.form.get_or_insert_with(FilterForm::default);
        form.draft = text.into();
        form.dirty = true;
    }

    /// Hides the filter panel and drops the predicate. Does not re-fetch.
    pub fn remove_filter(&mut self) {
        self.filter.show = false;
        self.query.filter.clear();

        if let Some(form) = self.filter.form.as_mut() {
            if form.dirty {
                form.set_pristine();
            }
        }
    }

    /// Asks the service to delete `key`. The row stays until the deletion is
    /// confirmed. Returns false when nothing was requested.
    pub fn remove(&mut self, key: &CohortName) -> bool {
        if self.removing.contains(key) {
            debug!(cohort = %key, "cohorts: removal already in flight");
            return false;
        }
        let Some(row) = self.rows.iter_mut().find(|row| row.cohort.name == *key) else {
            debug!(cohort = %key, "cohorts: nothing to remove");
            return false;
        };

        match dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::RemoveCohort { name: key.clone() },
        ) {
            Ok(()) => {
                row.removal = RemovalState::Pending;
                self.removing.insert(key.clone());
                true
            }
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    /// Returns whether `name` is selected after the toggle.
    pub fn toggle_selection(&mut self, name: &CohortName) -> bool {
        if self.selected.remove(name) {
            false
        } else {
            self.selected.insert(name.clone());
            true
        }
    }

    /// Applies a completion reported by the backend worker.
    pub fn apply(&mut self, event: CohortsEvent) {
        match event {
            CohortsEvent::CohortsLoaded { request, cohorts } => {
                if !self.is_current(request) {
                    debug!(%request, "cohorts: discarding stale listing");
                    return;
                }
                self.pending = None;
                // A removal failure reported while this listing was in flight
                // is superseded by it.
                self.error = None;
                debug!(%request, count = cohorts.len(), "cohorts: listing applied");
                self.rows = cohorts
                    .into_iter()
                    .map(|cohort| {
                        let removal = if self.removing.contains(&cohort.name) {
                            RemovalState::Pending
                        } else {
                            RemovalState::Idle
                        };
                        CohortRow { cohort, removal }
                    })
                    .collect();
            }
            CohortsEvent::CohortsLoadFailed { request, error } => {
                if !self.is_current(request) {
                    debug!(%request, "cohorts: discarding stale listing failure");
                    return;
                }
                self.pending = None;
                self.error = Some(error.into_message());
            }
            CohortsEvent::CohortRemoved { name } => {
                self.removing.remove(&name);
                self.selected.remove(&name);
                if let Some(idx) = self.rows.iter().position(|row| row.cohort.name == name) {
                    self.rows.remove(idx);
                }
            }
            CohortsEvent::CohortRemoveFailed { name, error } => {
                self.removing.remove(&name);
                if let Some(row) = self
                    .rows
                    .iter_mut()
                    .find(|row| row.cohort.name == name && row.is_removing())
                {
                    row.removal = RemovalState::Idle;
                }
                self.error = Some(error.into_message());
            }
            CohortsEvent::Error(error) => {
                warn!(context = ?error.context(), "cohorts: backend error: {error}");
                // Nothing in flight will be answered after a worker failure.
                self.pending = None;
                self.removing.clear();
                for row in &mut self.rows {
                    row.removal = RemovalState::Idle;
                }
                self.error = Some(error.into_message());
            }
        }
    }

    pub fn query(&self) -> &CohortQuery {
        &self.query
    }

    pub fn rows(&self) -> &[CohortRow] {
        &self.rows
    }

    pub fn cohorts(&self) -> impl Iterator<Item = &Cohort> {
        self.rows.iter().map(|row| &row.cohort)
    }

    pub fn selected(&self) -> &BTreeSet<CohortName> {
        &self.selected
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Handle of the listing request whose result will be displayed next.
    pub fn pending_request(&self) -> Option<RequestSeq> {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || !self.removing.is_empty()
    }

    pub fn grid(&self) -> GridOptions<'_> {
        GridOptions {
            enable_sorting: true,
            column_defs: &COHORT_COLUMNS,
            data: &self.rows,
        }
    }

    fn is_current(&self, request: RequestSeq) -> bool {
        self.pending == Some(request)
    }

    fn request_cohorts(&mut self, query: Option<CohortQuery>) -> Option<RequestSeq> {
        self.error = None;
        self.last_request += 1;
        let request = RequestSeq(self.last_request);

        match dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::FetchCohorts { request, query },
        ) {
            Ok(()) => {
                self.pending = Some(request);
                Some(request)
            }
            Err(message) => {
                self.pending = None;
                self.error = Some(message);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
