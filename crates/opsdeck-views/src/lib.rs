//! Dashboard records and saved list views.
//!
//! This crate connects the generic pipeline in `opsdeck-query` to the
//! business-ops dashboard. It defines the record types each page lists and a
//! catalog of saved views.
//!
//! # Records
//!
//! [`EmailCampaign`], [`Subscriber`], [`Notification`], [`Sop`] and
//! [`ComplianceTask`] deserialize from the backend's JSON and derive
//! [`Record`](opsdeck_query::Record), so every query operator works on them
//! by field name:
//!
//! ```ignore
//! use opsdeck_query::Query;
//! use opsdeck_views::EmailCampaign;
//!
//! let recent = Query::new()
//!     .sort_desc(EmailCampaign::UPDATED_AT)
//!     .tie_break(EmailCampaign::ID)
//!     .limit(3)
//!     .build()
//!     .filter(&campaigns, EmailCampaign::accessor);
//! ```
//!
//! # Saved views
//!
//! A [`ViewCatalog`] maps view names to query specs. The built-in catalog
//! covers the lists the dashboard shows by default:
//!
//! ```ignore
//! use opsdeck_views::ViewCatalog;
//!
//! let catalog = ViewCatalog::builtin()?;
//! let by_day = catalog.run("notifications_by_day", &notifications, chrono::Utc::now())?;
//! if let Some(groups) = by_day.as_groups() {
//!     for group in groups {
//!         println!("{} ({})", group.label, group.items.len());
//!     }
//! }
//! ```

mod catalog;
mod error;
mod records;

pub use catalog::{ViewCatalog, ViewDef};
pub use error::{Result, ViewError};
pub use records::{
    CampaignStatus, ComplianceStatus, ComplianceTask, DashboardPage, DashboardRecord,
    EmailCampaign, Notification, NotificationKind, Priority, Sop, SopStatus, Subscriber,
    SubscriberStatus,
};
