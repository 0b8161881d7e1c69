mod common;

use checkin::chart::ChartKind;
use checkin::dashboard::{CookieChange, DashboardState, Event, Status, View, reduce};
use checkin::response::ResponseForm;
use checkin::session::SubmissionState;
use checkin::store::ResponseStore;
use common::{CountingStore, FailingStore, LOCAL_REGION, alice_form, dashboard_with, memory_dashboard};
use std::sync::Arc;

fn fresh() -> DashboardState {
    DashboardState::seed(SubmissionState::NotSubmitted, false)
}

#[test]
fn test_invalid_submits_then_valid_submit_appends_once() {
    let (store, dashboard) = memory_dashboard();
    let mut state = fresh();

    // A few broken attempts first
    for broken in [
        ResponseForm::default(),
        ResponseForm { age: "thirty".to_string(), ..alice_form() },
        ResponseForm { christian: "Maybe".to_string(), ..alice_form() },
    ] {
        let outcome = dashboard.dispatch(&state, Event::Submit(broken));
        assert_eq!(outcome.state.view, View::Form, "Invalid submit must keep the form");
        assert!(outcome.cookies.is_empty(), "Invalid submit must not set cookies");
        state = outcome.state;
    }
    assert!(store.scan_all().unwrap().is_empty(), "Nothing should be stored yet");

    let outcome = dashboard.dispatch(&state, Event::Submit(alice_form()));
    assert_eq!(outcome.state.view, View::Results);
    assert_eq!(outcome.state.submission, SubmissionState::Submitted);
    assert_eq!(outcome.cookies, vec![CookieChange::SetSubmitted]);
    assert_eq!(store.scan_all().unwrap().len(), 1, "Exactly one row should be appended");
}

#[test]
fn test_submit_while_results_does_not_touch_store() {
    let store = Arc::new(CountingStore::default());
    let dashboard = dashboard_with(store.clone());

    let outcome = dashboard.dispatch(&fresh(), Event::Submit(alice_form()));
    assert_eq!(store.inserts(), 1);

    // Repeated submits from the results view
    let again = dashboard.dispatch_all(
        &outcome.state,
        vec![Event::Submit(alice_form()), Event::Submit(alice_form())],
    );
    assert_eq!(store.inserts(), 1, "Resubmits must be ignored");
    assert_eq!(again.state.view, View::Results);
    assert!(again.cookies.is_empty());
    assert_eq!(
        again.state.status,
        Some(Status::Info("You have already checked in. Thank you!".to_string()))
    );
}

#[test]
fn test_submitted_cookie_seeds_results_view() {
    let store = Arc::new(CountingStore::default());
    let dashboard = dashboard_with(store.clone());
    let state = DashboardState::seed(SubmissionState::from_cookie(Some("true")), false);

    assert_eq!(state.view, View::Results);
    dashboard.dispatch(&state, Event::Submit(alice_form()));
    assert_eq!(store.inserts(), 0);
}

#[test]
fn test_missing_fields_are_reported_together() {
    let form = ResponseForm {
        name: String::new(),
        faith: String::new(),
        ..alice_form()
    };

    let step = reduce(&fresh(), &Event::Submit(form.clone()), LOCAL_REGION);
    assert!(step.effects.is_empty(), "Validation failure must not produce effects");

    let status = step.state.status.expect("an error should be shown");
    assert!(status.is_error());
    assert!(status.text().contains("Name"), "Message should name the name field: {}", status.text());
    assert!(
        status.text().contains("Faith decision"),
        "Message should name the faith field: {}",
        status.text()
    );

    // Entered values stay in the form
    assert_eq!(step.state.form, form);
}

#[test]
fn test_every_missing_field_in_one_message() {
    let err = ResponseForm::default().validate(LOCAL_REGION).unwrap_err();
    assert_eq!(err.missing, vec!["Name", "Age", "Christian", "Faith decision"]);
    assert_eq!(
        err.to_string(),
        "Please fill in the following fields: Name, Age, Christian, Faith decision"
    );
}

#[test]
fn test_alice_is_a_visitor_in_the_25_40_bucket() {
    let response = alice_form().validate(LOCAL_REGION).unwrap();

    assert_eq!(response.name, "Alice");
    assert_eq!(response.age, Some(30));
    assert_eq!(response.age_range.label(), "25-40");
    assert!(!response.local, "Virginia is not the local region");
    assert_eq!(response.state.as_deref(), Some("Virginia"));
    assert_eq!(response.how_found_us, None);
}

#[test]
fn test_local_region_match_ignores_case() {
    let form = ResponseForm {
        state: "district of columbia".to_string(),
        ..alice_form()
    };
    assert!(form.validate(LOCAL_REGION).unwrap().local);
}

#[test]
fn test_failed_save_keeps_form_and_flag() {
    let dashboard = dashboard_with(Arc::new(FailingStore));

    let outcome = dashboard.dispatch(&fresh(), Event::Submit(alice_form()));

    assert_eq!(outcome.state.view, View::Form, "A failed save must not show results");
    assert_eq!(outcome.state.submission, SubmissionState::NotSubmitted);
    assert!(outcome.cookies.is_empty(), "A failed save must not set the cookie");
    assert_eq!(outcome.state.form, alice_form(), "Entered values should be restored");
    assert_eq!(
        outcome.state.status,
        Some(Status::Error("Could not save your response. Please try again.".to_string()))
    );
}

#[test]
fn test_chart_selection_and_loading() {
    let results = DashboardState::seed(SubmissionState::Submitted, false);

    let step = reduce(&results, &Event::SelectChart(ChartKind::AgeDistribution), LOCAL_REGION);
    assert_eq!(step.state.chart, ChartKind::AgeDistribution);
    assert!(step.state.loading, "Changing chart raises the loading flag");

    let step = reduce(&step.state, &Event::ChartRendered, LOCAL_REGION);
    assert!(!step.state.loading);
    assert_eq!(step.state.chart, ChartKind::AgeDistribution);
}

#[test]
fn test_raw_data_needs_admin() {
    let results = DashboardState::seed(SubmissionState::Submitted, false);
    let step = reduce(&results, &Event::SelectChart(ChartKind::RawData), LOCAL_REGION);
    assert_eq!(step.state.chart, ChartKind::Locality);
    assert!(step.state.status.is_some_and(|s| s.is_error()));

    let admin = DashboardState::seed(SubmissionState::Submitted, true);
    let step = reduce(&admin, &Event::SelectChart(ChartKind::RawData), LOCAL_REGION);
    assert_eq!(step.state.chart, ChartKind::RawData);
}

#[test]
fn test_page_changes_only_apply_to_raw_table() {
    let admin = DashboardState::seed(SubmissionState::Submitted, true);

    let step = reduce(&admin, &Event::ChangePage(3), LOCAL_REGION);
    assert_eq!(step.state.page, 1, "Paging is ignored outside the raw table");

    let table = reduce(&admin, &Event::SelectChart(ChartKind::RawData), LOCAL_REGION).state;
    let step = reduce(&table, &Event::ChangePage(3), LOCAL_REGION);
    assert_eq!(step.state.page, 3);

    let step = reduce(&table, &Event::ChangePage(0), LOCAL_REGION);
    assert_eq!(step.state.page, 1, "Pages are 1-based");
}

#[test]
fn test_chart_events_ignored_on_form_view() {
    let step = reduce(&fresh(), &Event::SelectChart(ChartKind::FaithDecision), LOCAL_REGION);
    assert_eq!(step.state, fresh());
}
