mod common;

use common::{PRIMARY_CSV, STATUS_CSV, TRACKER_CSV, TestWorkspace, dataset};
use encoding_rs::UTF_8;
use sheet_reconcile::{
    AuxiliarySource, Dataset, PageSize, Pager, Reconciliation, SelectionPolicy, ViewQuery,
    ViewerRole,
    dataset::record,
    engine::reconcile,
    header::FilterRole,
    io_utils::read_dataset,
    table::render_page,
    view::{self, filter_options},
};

fn reconciled_fixture() -> Reconciliation {
    let workspace = TestWorkspace::new();
    let primary = read_dataset(&workspace.write("roster.csv", PRIMARY_CSV), None, UTF_8).unwrap();
    let status = read_dataset(&workspace.write("status.csv", STATUS_CSV), None, UTF_8).unwrap();
    let tracker = read_dataset(&workspace.write("tracker.csv", TRACKER_CSV), None, UTF_8).unwrap();
    reconcile(
        &primary,
        &[
            AuxiliarySource::new("tracker", SelectionPolicy::TrackerLog, tracker),
            AuxiliarySource::new("status", SelectionPolicy::StatusSummary, status),
        ],
    )
}

fn site_codes(filtered: &view::FilteredView<'_>) -> Vec<String> {
    filtered
        .rows()
        .iter()
        .map(|row| row["SITE CODE"].as_display())
        .collect()
}

#[test]
fn fixture_reconciles_into_expected_layout() {
    let result = reconciled_fixture();
    assert_eq!(
        result.dataset.headers(),
        [
            "SL NO",
            "CIRCLE",
            "DIVISION",
            "SITE NAME",
            "_id",
            "ATTRIBUTE",
            "SITE CODE",
            "DEVICE STATUS",
            "DAYS OFFLINE",
            "REMARKS",
            "ENGINEER",
            "ACTION",
        ]
    );
    assert_eq!(result.reports[1].anchor.as_deref(), Some("DATE 01-01-2025"));
}

#[test]
fn rows_are_ordered_newest_first_by_order_field() {
    let result = reconciled_fixture();
    let filtered = view::apply(&result.dataset, &ViewQuery::default());
    assert_eq!(site_codes(&filtered), ["S3", "S2", "S1"]);
}

#[test]
fn rows_without_order_field_keep_input_order() {
    let result = reconcile(&dataset(&["SITE CODE"], &[&["B"], &["A"]]), &[]);
    let filtered = view::apply(&result.dataset, &ViewQuery::default());
    assert_eq!(site_codes(&filtered), ["B", "A"]);
}

#[test]
fn filters_are_conjunctive_exact_matches() {
    let result = reconciled_fixture();
    let query = ViewQuery::default()
        .with_filter(FilterRole::Circle, "North")
        .with_filter(FilterRole::DeviceStatus, "OFFLINE");
    let filtered = view::apply(&result.dataset, &query);
    assert_eq!(site_codes(&filtered), ["S1"]);

    let partial = ViewQuery::default().with_filter(FilterRole::Circle, "Nor");
    assert!(view::apply(&result.dataset, &partial).is_empty());
}

#[test]
fn filter_on_absent_column_is_ignored() {
    let result = reconciled_fixture();
    let query = ViewQuery::default().with_filter(FilterRole::SubDivision, "SD1");
    assert_eq!(view::apply(&result.dataset, &query).len(), 3);
}

#[test]
fn days_offline_threshold_parses_loosely() {
    let result = reconciled_fixture();
    let query = ViewQuery {
        min_days_offline: Some(3.0),
        ..ViewQuery::default()
    };
    assert_eq!(site_codes(&view::apply(&result.dataset, &query)), ["S1"]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let result = reconciled_fixture();
    let filtered = view::apply(&result.dataset, &ViewQuery::default().with_search("MODEM"));
    assert_eq!(site_codes(&filtered), ["S3"]);

    let blank = view::apply(&result.dataset, &ViewQuery::default().with_search("   "));
    assert_eq!(blank.len(), 3);
}

#[test]
fn restricted_columns_are_hidden_from_operators_only() {
    let result = reconciled_fixture();
    let operator = ViewQuery {
        restricted_columns: vec!["engineer".to_string()],
        ..ViewQuery::default()
    };
    let filtered = view::apply(&result.dataset, &operator);
    assert!(!filtered.headers().contains(&"ENGINEER"));
    assert!(
        view::apply(&result.dataset, &operator.clone().with_search("ravi")).is_empty()
    );

    let admin = ViewQuery {
        viewer: ViewerRole::Administrator,
        ..operator
    };
    assert!(view::apply(&result.dataset, &admin).headers().contains(&"ENGINEER"));
}

#[test]
fn filter_options_are_sorted_and_distinct() {
    let result = reconciled_fixture();
    assert_eq!(
        filter_options(&result.dataset, FilterRole::Circle),
        ["North", "South"]
    );
    assert_eq!(
        filter_options(&result.dataset, FilterRole::DeviceStatus),
        ["OFFLINE", "ONLINE"]
    );
    assert!(filter_options(&result.dataset, FilterRole::SubDivision).is_empty());
}

#[test]
fn viewing_never_mutates_the_reconciled_dataset() {
    let result = reconciled_fixture();
    let before = result.dataset.clone();
    let query = ViewQuery::default()
        .with_filter(FilterRole::Division, "D2")
        .with_search("river");
    let filtered = view::apply(&result.dataset, &query);
    let _ = filtered.page(&Pager::new(PageSize::Fifty));
    assert_eq!(result.dataset, before);
}

#[test]
fn rendered_page_shows_position_serials() {
    let result = reconciled_fixture();
    let filtered = view::apply(&result.dataset, &ViewQuery::default());
    let mut pager = Pager::default();
    pager.sync(PageSize::TwentyFive, filtered.len(), "");
    let rendered = render_page(&filtered.page(&pager));

    let lines: Vec<&str> = rendered.lines().collect();
    assert!(lines[0].starts_with("SL NO"));
    assert!(lines[2].starts_with("1 "));
    assert!(lines[2].contains("S3"));
    assert!(rendered.trim_end().ends_with("page 1 of 1 (3 row(s))"));
}

#[test]
fn search_covers_fields_outside_the_header_list() {
    let primary = Dataset::new(
        vec!["SITE CODE".to_string(), "NAME".to_string()],
        vec![
            record([("SITE CODE", "S1"), ("NAME", "a"), ("NOTE", "needle")]),
            record([("SITE CODE", "S2"), ("NAME", "b")]),
        ],
    )
    .unwrap();
    let result = reconcile(&primary, &[]);
    assert_eq!(
        result.dataset.rows()[0].get("NOTE").map(|v| v.as_display()),
        Some("needle".to_string())
    );

    let admin = ViewQuery {
        viewer: ViewerRole::Administrator,
        ..ViewQuery::default()
    }
    .with_search("needle");
    assert_eq!(site_codes(&view::apply(&result.dataset, &admin)), ["S1"]);

    let operator = ViewQuery::default().with_search("NEEDLE");
    assert_eq!(site_codes(&view::apply(&result.dataset, &operator)), ["S1"]);

    let restricted = ViewQuery {
        restricted_columns: vec!["note".to_string()],
        ..ViewQuery::default()
    }
    .with_search("needle");
    assert!(view::apply(&result.dataset, &restricted).is_empty());
}
