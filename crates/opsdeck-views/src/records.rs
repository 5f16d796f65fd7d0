//! Record types for the dashboard's list pages.
//!
//! Each type deserializes from the backend's camelCase JSON and derives
//! [`Record`], so its fields are queryable under the same camelCase names
//! the API uses (`updatedAt`, `dueDate`, ...).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use opsdeck_query::{Record, ToValue, Value};
use serde::{Deserialize, Serialize};

/// The dashboard page a record type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPage {
    /// Email marketing hub.
    Campaigns,
    /// Mailing-list subscribers.
    Subscribers,
    /// Notifications center.
    Notifications,
    /// SOP builder.
    Sops,
    /// Legal and compliance center.
    Compliance,
}

impl DashboardPage {
    /// Returns the snake_case page name used in view catalogs.
    pub fn as_str(self) -> &'static str {
        match self {
            DashboardPage::Campaigns => "campaigns",
            DashboardPage::Subscribers => "subscribers",
            DashboardPage::Notifications => "notifications",
            DashboardPage::Sops => "sops",
            DashboardPage::Compliance => "compliance",
        }
    }
}

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record shown on one dashboard page.
pub trait DashboardRecord: Record {
    /// The page listing this record type.
    const PAGE: DashboardPage;
}

// Status-like enums read as their snake_case name, matching the JSON.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToValue for $name {
            fn to_value(&self) -> Value<'_> {
                Value::String(self.as_str())
            }
        }
    };
}

labelled_enum! {
    /// Lifecycle of an email campaign.
    pub enum CampaignStatus {
        Draft => "draft",
        Scheduled => "scheduled",
        Sending => "sending",
        Sent => "sent",
        Paused => "paused",
    }
}

labelled_enum! {
    /// Mailing-list state of a subscriber.
    pub enum SubscriberStatus {
        Active => "active",
        Pending => "pending",
        Unsubscribed => "unsubscribed",
        Bounced => "bounced",
    }
}

labelled_enum! {
    /// Severity of a notification.
    pub enum NotificationKind {
        Info => "info",
        Success => "success",
        Warning => "warning",
        Error => "error",
    }
}

labelled_enum! {
    /// Review state of a standard operating procedure.
    pub enum SopStatus {
        Draft => "draft",
        InReview => "in_review",
        Published => "published",
        Archived => "archived",
    }
}

labelled_enum! {
    /// Progress of a compliance task.
    pub enum ComplianceStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Waived => "waived",
    }
}

labelled_enum! {
    /// Priority of a compliance task.
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

/// An email marketing campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(all, rename_all = "camelCase")]
pub struct EmailCampaign {
    pub id: u64,
    pub name: String,
    pub subject: String,
    pub status: CampaignStatus,
    #[serde(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recipients: u32,
    #[serde(default)]
    pub open_rate: Option<f64>,
    #[serde(default)]
    pub click_rate: Option<f64>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[record(skip)]
    pub html_body: String,
}

impl DashboardRecord for EmailCampaign {
    const PAGE: DashboardPage = DashboardPage::Campaigns;
}

/// A mailing-list subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(all, rename_all = "camelCase")]
pub struct Subscriber {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub status: SubscriberStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lists: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub subscribed_at: DateTime<Utc>,
}

impl DashboardRecord for Subscriber {
    const PAGE: DashboardPage = DashboardPage::Subscribers;
}

/// An entry in the notifications center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(all, rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[record(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[record(skip)]
    pub link: Option<String>,
}

impl DashboardRecord for Notification {
    const PAGE: DashboardPage = DashboardPage::Notifications;
}

/// A standard operating procedure from the SOP builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(all, rename_all = "camelCase")]
pub struct Sop {
    pub id: u64,
    pub title: String,
    pub department: String,
    pub status: SopStatus,
    pub version: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl DashboardRecord for Sop {
    const PAGE: DashboardPage = DashboardPage::Sops;
}

/// A task from the legal and compliance center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase")]
#[record(all, rename_all = "camelCase")]
pub struct ComplianceTask {
    pub id: u64,
    pub title: String,
    pub framework: String,
    pub status: ComplianceStatus,
    pub priority: Priority,
    #[serde(default)]
    pub assignee: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DashboardRecord for ComplianceTask {
    const PAGE: DashboardPage = DashboardPage::Compliance;
}
