use super::*;
use crossbeam_channel::{bounded, Receiver};

use crate::controller::events::{UiError, UiErrorContext};

fn view_model() -> (CohortsViewModel, Receiver<BackendCommand>) {
    let (cmd_tx, cmd_rx) = bounded(16);
    let view_model = CohortsViewModel::new(cmd_tx, ViewOptions::default());
    (view_model, cmd_rx)
}

fn cohorts(names: &[&str]) -> Vec<Cohort> {
    names.iter().map(|name| Cohort::named(*name)).collect()
}

fn row_names(view_model: &CohortsViewModel) -> Vec<&str> {
    view_model
        .cohorts()
        .map(|cohort| cohort.name.as_str())
        .collect()
}

fn next_fetch(cmd_rx: &Receiver<BackendCommand>) -> (RequestSeq, Option<CohortQuery>) {
    match cmd_rx.try_recv().expect("queued command") {
        BackendCommand::FetchCohorts { request, query } => (request, query),
        other => panic!("expected a fetch, got {other:?}"),
    }
}

fn load_failed(request: RequestSeq, message: &str) -> CohortsEvent {
    CohortsEvent::CohortsLoadFailed {
        request,
        error: UiError::from_message(UiErrorContext::LoadCohorts, message),
    }
}

/// View-model with its initial listing already answered.
fn loaded_with(names: &[&str]) -> (CohortsViewModel, Receiver<BackendCommand>) {
    let (mut view_model, cmd_rx) = view_model();
    let (request, _) = next_fetch(&cmd_rx);
    view_model.apply(CohortsEvent::CohortsLoaded {
        request,
        cohorts: cohorts(names),
    });
    (view_model, cmd_rx)
}

#[test]
fn construction_issues_one_unconstrained_fetch() {
    let (view_model, cmd_rx) = view_model();

    let (request, query) = next_fetch(&cmd_rx);
    assert_eq!(query, None);
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(view_model.pending_request(), Some(request));
    assert!(view_model.is_busy());
    assert!(view_model.rows().is_empty());
}

#[test]
fn successful_listing_replaces_rows_in_order() {
    let (view_model, _cmd_rx) = loaded_with(&["zeta", "alpha", "mid"]);

    assert_eq!(row_names(&view_model), ["zeta", "alpha", "mid"]);
    assert_eq!(view_model.pending_request(), None);
    assert!(!view_model.is_busy());
    assert_eq!(view_model.grid().data.len(), 3);
}

#[test]
fn failed_listing_sets_error_and_keeps_rows() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme", "beta"]);

    let request = view_model.refresh().expect("queued");
    assert_eq!(next_fetch(&cmd_rx).0, request);
    view_model.apply(load_failed(request, "cohort service returned 500: boom"));

    assert_eq!(view_model.error(), Some("cohort service returned 500: boom"));
    assert_eq!(row_names(&view_model), ["acme", "beta"]);
    assert!(!view_model.is_busy());
}

#[test]
fn new_retrieval_clears_previous_error() {
    let (mut view_model, cmd_rx) = view_model();
    let (request, _) = next_fetch(&cmd_rx);
    view_model.apply(load_failed(request, "unreachable"));
    assert_eq!(view_model.error(), Some("unreachable"));

    view_model.change_page(2);

    assert_eq!(view_model.error(), None);
}

#[test]
fn stale_responses_never_reach_the_view() {
    let (mut view_model, cmd_rx) = loaded_with(&["first"]);

    let page_two = view_model.change_page(2).expect("queued");
    let page_three = view_model.change_page(3).expect("queued");
    assert!(page_three > page_two);
    next_fetch(&cmd_rx);
    next_fetch(&cmd_rx);

    view_model.apply(CohortsEvent::CohortsLoaded {
        request: page_three,
        cohorts: cohorts(&["third"]),
    });
    view_model.apply(CohortsEvent::CohortsLoaded {
        request: page_two,
        cohorts: cohorts(&["second"]),
    });
    view_model.apply(load_failed(page_two, "late failure"));

    assert_eq!(row_names(&view_model), ["third"]);
    assert_eq!(view_model.error(), None);
}

#[test]
fn sort_and_page_changes_send_current_query_verbatim() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme"]);
    view_model.search("diab");
    next_fetch(&cmd_rx);

    view_model.change_sort_order("-created_at");
    let (_, query) = next_fetch(&cmd_rx);
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(
        query,
        Some(CohortQuery {
            filter: "diab".into(),
            order: "-created_at".into(),
            limit: 5,
            page: 1,
        })
    );

    view_model.change_page(4);
    let (_, query) = next_fetch(&cmd_rx);
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(
        query,
        Some(CohortQuery {
            filter: "diab".into(),
            order: "-created_at".into(),
            limit: 5,
            page: 4,
        })
    );
}

#[test]
fn search_replaces_filter_and_exposes_pending_handle() {
    let (mut view_model, cmd_rx) = loaded_with(&[]);

    let request = view_model.search("heart").expect("queued");

    assert_eq!(view_model.query().filter, "heart");
    assert_eq!(view_model.pending_request(), Some(request));
    let (sent, query) = next_fetch(&cmd_rx);
    assert_eq!(sent, request);
    assert_eq!(query.map(|query| query.filter), Some("heart".to_string()));
}

#[test]
fn page_size_change_returns_to_first_page() {
    let (mut view_model, cmd_rx) = loaded_with(&[]);
    view_model.change_page(3);
    next_fetch(&cmd_rx);

    view_model.change_page_size(15);

    let (_, query) = next_fetch(&cmd_rx);
    let query = query.expect("query");
    assert_eq!((query.limit, query.page), (15, 1));
}

#[test]
fn options_seed_the_query() {
    let (cmd_tx, cmd_rx) = bounded(4);
    let mut view_model = CohortsViewModel::new(
        cmd_tx,
        ViewOptions {
            page_size: 25,
            order: "-name".into(),
            filter_debounce: Duration::from_millis(250),
        },
    );
    next_fetch(&cmd_rx);

    view_model.refresh();

    let (_, query) = next_fetch(&cmd_rx);
    assert_eq!(
        query,
        Some(CohortQuery {
            filter: String::new(),
            order: "-name".into(),
            limit: 25,
            page: 1,
        })
    );
    assert_eq!(view_model.filter().debounce(), Duration::from_millis(250));
}

#[test]
fn remove_filter_resets_state_without_fetching() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme"]);
    view_model.show_filter();
    view_model.edit_filter("acm");
    view_model.search("acm");
    next_fetch(&cmd_rx);
    assert!(view_model.filter().form().is_some_and(FilterForm::is_dirty));

    view_model.remove_filter();

    assert!(!view_model.filter().is_shown());
    assert_eq!(view_model.query().filter, "");
    let form = view_model.filter().form().expect("form");
    assert!(!form.is_dirty());
    assert_eq!(form.draft(), "");
    assert!(cmd_rx.try_recv().is_err());
}

#[test]
fn remove_filter_without_form_only_hides_panel() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme"]);
    view_model.search("acme");
    next_fetch(&cmd_rx);

    view_model.remove_filter();

    assert!(!view_model.filter().is_shown());
    assert!(view_model.filter().form().is_none());
    assert_eq!(view_model.query().filter, "");
    assert!(cmd_rx.try_recv().is_err());
}

#[test]
fn removal_waits_for_confirmation_and_drops_first_match() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme", "beta", "acme2"]);
    let acme = CohortName::new("acme");

    assert!(view_model.remove(&acme));

    assert_eq!(
        cmd_rx.try_recv().expect("command"),
        BackendCommand::RemoveCohort { name: acme.clone() }
    );
    assert_eq!(row_names(&view_model), ["acme", "beta", "acme2"]);
    assert!(view_model.rows()[0].is_removing());
    assert!(view_model.is_busy());

    view_model.apply(CohortsEvent::CohortRemoved { name: acme });

    assert_eq!(row_names(&view_model), ["beta", "acme2"]);
    assert!(!view_model.is_busy());
}

#[test]
fn duplicate_names_lose_only_the_first_row() {
    let (mut view_model, _cmd_rx) = loaded_with(&["dup", "other", "dup"]);
    let dup = CohortName::new("dup");

    view_model.remove(&dup);
    view_model.apply(CohortsEvent::CohortRemoved { name: dup });

    assert_eq!(row_names(&view_model), ["other", "dup"]);
}

#[test]
fn failed_removal_restores_row_and_reports_error() {
    let (mut view_model, _cmd_rx) = loaded_with(&["acme", "beta"]);
    let acme = CohortName::new("acme");
    view_model.remove(&acme);

    view_model.apply(CohortsEvent::CohortRemoveFailed {
        name: acme,
        error: UiError::from_message(UiErrorContext::RemoveCohort, "cohort is in use"),
    });

    assert_eq!(row_names(&view_model), ["acme", "beta"]);
    assert!(!view_model.rows()[0].is_removing());
    assert_eq!(view_model.error(), Some("cohort is in use"));
    assert!(!view_model.is_busy());
}

#[test]
fn removing_absent_or_in_flight_key_is_a_no_op() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme", "beta"]);
    let acme = CohortName::new("acme");
    view_model.remove(&acme);
    cmd_rx.try_recv().expect("first removal");

    assert!(!view_model.remove(&acme));
    view_model.apply(CohortsEvent::CohortRemoved { name: acme.clone() });
    assert!(!view_model.remove(&acme));
    assert!(!view_model.remove(&CohortName::new("never-listed")));

    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(row_names(&view_model), ["beta"]);
    assert_eq!(view_model.error(), None);
}

#[test]
fn accepted_listing_clears_removal_error_reported_meanwhile() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme", "beta"]);
    let acme = CohortName::new("acme");
    view_model.remove(&acme);
    cmd_rx.try_recv().expect("removal");
    let request = view_model.refresh().expect("queued");

    view_model.apply(CohortsEvent::CohortRemoveFailed {
        name: acme,
        error: UiError::from_message(UiErrorContext::RemoveCohort, "cohort is in use"),
    });
    assert_eq!(view_model.error(), Some("cohort is in use"));
    view_model.apply(CohortsEvent::CohortsLoaded {
        request,
        cohorts: cohorts(&["acme", "beta"]),
    });

    assert_eq!(view_model.error(), None);
    assert_eq!(row_names(&view_model), ["acme", "beta"]);
    assert!(!view_model.is_busy());
}

#[test]
fn reload_during_removal_keeps_row_marked() {
    let (mut view_model, cmd_rx) = loaded_with(&["acme", "beta"]);
    let acme = CohortName::new("acme");
    view_model.remove(&acme);
    cmd_rx.try_recv().expect("removal");

    let request = view_model.refresh().expect("queued");
    view_model.apply(CohortsEvent::CohortsLoaded {
        request,
        cohorts: cohorts(&["acme", "beta", "gamma"]),
    });

    assert!(view_model.rows()[0].is_removing());
    assert!(view_model.is_busy());
}

#[test]
fn confirmed_removal_also_clears_selection() {
    let (mut view_model, _cmd_rx) = loaded_with(&["acme", "beta"]);
    let acme = CohortName::new("acme");
    let beta = CohortName::new("beta");
    assert!(view_model.toggle_selection(&acme));
    assert!(view_model.toggle_selection(&beta));
    assert!(!view_model.toggle_selection(&beta));

    view_model.remove(&acme);
    view_model.apply(CohortsEvent::CohortRemoved { name: acme });

    assert!(view_model.selected().is_empty());
}

#[test]
fn closed_command_queue_is_reported_as_error() {
    let (cmd_tx, cmd_rx) = bounded(4);
    drop(cmd_rx);

    let view_model = CohortsViewModel::new(cmd_tx, ViewOptions::default());

    assert_eq!(view_model.pending_request(), None);
    assert!(view_model
        .error()
        .is_some_and(|message| message.contains("not running")));
}

#[test]
fn worker_failure_releases_everything_in_flight() {
    let (mut view_model, _cmd_rx) = loaded_with(&["acme"]);
    view_model.remove(&CohortName::new("acme"));
    view_model.refresh();

    view_model.apply(CohortsEvent::Error(UiError::from_message(
        UiErrorContext::BackendStartup,
        "backend worker startup failure",
    )));

    assert!(!view_model.is_busy());
    assert!(!view_model.rows()[0].is_removing());
    assert_eq!(view_model.error(), Some("backend worker startup failure"));
}
