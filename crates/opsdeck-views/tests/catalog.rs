//! Built-in and custom saved views over the dashboard fixtures.

use chrono::{DateTime, TimeZone, Utc};
use opsdeck_views::{
    ComplianceTask, DashboardPage, EmailCampaign, Notification, Sop, Subscriber, ViewCatalog,
    ViewError,
};
use serde::de::DeserializeOwned;

// ============================================================================
// Fixtures
// ============================================================================

fn load<T: DeserializeOwned>(json: &str) -> Vec<T> {
    serde_json::from_str(json).unwrap()
}

fn campaigns() -> Vec<EmailCampaign> {
    load(include_str!("fixtures/campaigns.json"))
}

fn notifications() -> Vec<Notification> {
    load(include_str!("fixtures/notifications.json"))
}

fn compliance() -> Vec<ComplianceTask> {
    load(include_str!("fixtures/compliance.json"))
}

fn sops() -> Vec<Sop> {
    load(include_str!("fixtures/sops.json"))
}

fn subscribers() -> Vec<Subscriber> {
    load(include_str!("fixtures/subscribers.json"))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
}

fn catalog() -> ViewCatalog {
    ViewCatalog::builtin().unwrap()
}

macro_rules! ids {
    ($records:expr) => {
        $records.iter().map(|r| r.id).collect::<Vec<u64>>()
    };
}

// ============================================================================
// Campaigns
// ============================================================================

#[test]
fn recent_campaigns_breaks_ties_by_id() {
    let records = campaigns();
    let result = catalog().run("recent_campaigns", &records, now()).unwrap();
    let flat = result.into_flat().unwrap();
    assert_eq!(ids!(flat), vec![2, 7, 4, 1, 3]);
}

#[test]
fn scheduled_campaigns_only_lists_future_sends() {
    let records = campaigns();
    let result = catalog().run("scheduled_campaigns", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![4, 2]);
}

#[test]
fn a_day_later_the_newsletter_has_gone_out() {
    let records = campaigns();
    let later = Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap();
    let result = catalog().run("scheduled_campaigns", &records, later).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![2]);
}

// ============================================================================
// Notifications
// ============================================================================

#[test]
fn notifications_group_by_day() {
    let records = notifications();
    let result = catalog()
        .run("notifications_by_day", &records, now())
        .unwrap();
    assert!(result.is_grouped());

    let groups = result.into_groups().unwrap();
    assert_eq!(groups.labels(), vec!["Today", "Yesterday", "This Week", "Older"]);
    assert_eq!(ids!(groups.get("Today").unwrap()), vec![1, 2]);
    assert_eq!(ids!(groups.get("Yesterday").unwrap()), vec![3]);
    assert_eq!(ids!(groups.get("This Week").unwrap()), vec![4]);
    assert_eq!(ids!(groups.get("Older").unwrap()), vec![5, 6]);
    assert_eq!(groups.total(), records.len());
}

#[test]
fn unread_notifications_default_missing_read_flag() {
    let records = notifications();
    let result = catalog()
        .run("unread_notifications", &records, now())
        .unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![1, 3, 5, 6]);
}

// ============================================================================
// Compliance, SOPs, subscribers
// ============================================================================

#[test]
fn overdue_compliance_excludes_tasks_due_today() {
    let records = compliance();
    let result = catalog().run("overdue_compliance", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![2, 1]);
}

#[test]
fn compliance_by_priority_omits_empty_groups() {
    let records = compliance();
    let result = catalog()
        .run("compliance_by_priority", &records, now())
        .unwrap();
    let groups = result.into_groups().unwrap();

    assert_eq!(groups.labels(), vec!["critical", "high", "low"]);
    assert_eq!(ids!(groups.get("high").unwrap()), vec![1, 4]);
    assert_eq!(ids!(groups.get("low").unwrap()), vec![5, 6]);
}

#[test]
fn published_sops_sort_by_title() {
    let records = sops();
    let result = catalog().run("published_sops", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![4, 3, 1]);
}

#[test]
fn active_subscribers_newest_first() {
    let records = subscribers();
    let result = catalog().run("active_subscribers", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![3, 5, 1]);
}

// ============================================================================
// Errors and custom catalogs
// ============================================================================

#[test]
fn running_a_view_on_the_wrong_page_fails() {
    let records = notifications();
    let err = catalog()
        .run("recent_campaigns", &records, now())
        .unwrap_err();
    assert!(matches!(
        err,
        ViewError::WrongPage {
            expected: DashboardPage::Campaigns,
            found: DashboardPage::Notifications,
            ..
        }
    ));
}

#[test]
fn unknown_views_are_reported_by_name() {
    let records = sops();
    let err = catalog().run("archived_sops", &records, now()).unwrap_err();
    assert_eq!(err.to_string(), "unknown view: archived_sops");
}

#[test]
fn bad_comparisons_only_drop_the_offending_records() {
    let custom = ViewCatalog::from_yaml(
        r#"
views:
  drafts_or_old_owners:
    page: sops
    query:
      match_mode: any
      filters:
        - { field: status, operator: equals, value: draft }
        - { field: owner, operator: before, value: "2026-01-01" }
"#,
    )
    .unwrap();

    let records = sops();
    let result = custom.run("drafts_or_old_owners", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![2]);
}

#[test]
fn custom_views_layer_over_builtins() {
    let mut views = catalog();
    views.merge(
        ViewCatalog::from_yaml(
            r#"
views:
  find_subscriber:
    page: subscribers
    query:
      search: { text: " ADA ", fields: [email, firstName] }
"#,
        )
        .unwrap(),
    );

    let records = subscribers();
    let result = views.run("find_subscriber", &records, now()).unwrap();
    assert_eq!(ids!(result.as_flat().unwrap()), vec![1]);
    assert!(views.get("recent_campaigns").is_some());
}

#[test]
fn views_for_a_page_are_listed_by_name() {
    let views = catalog();
    let names: Vec<&str> = views
        .views_for(DashboardPage::Notifications)
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["notifications_by_day", "unread_notifications"]);
}
