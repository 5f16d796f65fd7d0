//! Saved list views.
//!
//! A view is a named [`QuerySpec`] bound to one dashboard page. Views are
//! defined in YAML; the built-in set ships inside the crate and a deployment
//! can layer its own file on top with [`ViewCatalog::merge`].
//!
//! ```yaml
//! views:
//!   unread_notifications:
//!     page: notifications
//!     title: Unread
//!     query:
//!       filters:
//!         - { field: read, operator: equals, value: false }
//!       sort: { key: createdAt, direction: desc, tie_break: id }
//! ```
//!
//! Filter values may use two placeholders resolved when the view runs:
//! `$now` (the reference time, RFC 3339) and `$today` (its UTC date).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use opsdeck_query::{QueryResult, QuerySpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ViewError};
use crate::records::{DashboardPage, DashboardRecord};

const BUILTIN_VIEWS: &str = include_str!("../views/builtin.yaml");

const NOW: &str = "$now";
const TODAY: &str = "$today";

/// One saved view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDef {
    /// The page whose records this view lists.
    pub page: DashboardPage,
    /// Heading shown above the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer text shown under the heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The query, with placeholders unresolved.
    pub query: QuerySpec,
}

impl ViewDef {
    /// Returns the query with `$now` and `$today` replaced.
    pub fn resolve(&self, now: DateTime<Utc>) -> QuerySpec {
        let mut spec = self.query.clone();
        for filter in &mut spec.filters {
            let replacement = match filter.value.as_str() {
                Some(NOW) => now.to_rfc3339_opts(SecondsFormat::Millis, true),
                Some(TODAY) => now.date_naive().format("%Y-%m-%d").to_string(),
                _ => continue,
            };
            filter.value = serde_json::Value::String(replacement);
        }
        spec
    }
}

/// A set of saved views, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewCatalog {
    #[serde(default)]
    views: BTreeMap<String, ViewDef>,
}

impl ViewCatalog {
    /// Loads the views shipped with the crate.
    pub fn builtin() -> Result<Self> {
        ViewCatalog::from_yaml(BUILTIN_VIEWS)
    }

    /// Parses and validates a catalog.
    ///
    /// Every view's query is built once so that an unknown operator or a bad
    /// pattern fails here rather than when the page renders.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let catalog: ViewCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        debug!(views = catalog.len(), "loaded view catalog");
        Ok(catalog)
    }

    /// Reads a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.display().to_string(),
            source,
        })?;
        ViewCatalog::from_yaml(&yaml)
    }

    /// Adds the views of `other`, replacing views with the same name.
    pub fn merge(&mut self, other: ViewCatalog) {
        for (name, view) in other.views {
            if self.views.insert(name.clone(), view).is_some() {
                debug!(view = %name, "view overridden");
            }
        }
    }

    /// Adds or replaces one view.
    pub fn insert(&mut self, name: impl Into<String>, view: ViewDef) -> Result<()> {
        let name = name.into();
        view.query.to_query().map_err(|source| ViewError::Query {
            view: name.clone(),
            source,
        })?;
        self.views.insert(name, view);
        Ok(())
    }

    /// Looks up a view.
    pub fn get(&self, name: &str) -> Option<&ViewDef> {
        self.views.get(name)
    }

    /// View names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Views for one page, sorted by name.
    pub fn views_for(&self, page: DashboardPage) -> impl Iterator<Item = (&str, &ViewDef)> {
        self.views
            .iter()
            .filter(move |(_, view)| view.page == page)
            .map(|(name, view)| (name.as_str(), view))
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns `true` if the catalog has no views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn validate(&self) -> Result<()> {
        for (name, view) in &self.views {
            view.query.to_query().map_err(|source| ViewError::Query {
                view: name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Runs a view over typed records.
    ///
    /// `now` resolves placeholders and anchors date groupings.
    pub fn run<'a, R>(
        &self,
        view: &str,
        records: &'a [R],
        now: DateTime<Utc>,
    ) -> Result<QueryResult<'a, R>>
    where
        R: DashboardRecord + 'static,
    {
        let def = self
            .get(view)
            .ok_or_else(|| ViewError::UnknownView(view.to_string()))?;
        if def.page != R::PAGE {
            return Err(ViewError::WrongPage {
                view: view.to_string(),
                expected: def.page,
                found: R::PAGE,
            });
        }

        debug!(view, page = %def.page, records = records.len(), "running saved view");
        def.resolve(now)
            .run(records, R::accessor, Some(now))
            .map_err(|source| ViewError::Query {
                view: view.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ViewCatalog::builtin().unwrap();
        for name in [
            "recent_campaigns",
            "scheduled_campaigns",
            "notifications_by_day",
            "unread_notifications",
            "overdue_compliance",
            "published_sops",
            "active_subscribers",
        ] {
            assert!(catalog.get(name).is_some(), "missing view {name}");
        }
    }

    #[test]
    fn placeholders_resolve() {
        let view: ViewDef = serde_yaml::from_str(
            r#"
page: compliance
query:
  filters:
    - { field: dueDate, operator: before, value: $today }
    - { field: completedAt, operator: before, value: $now }
    - { field: title, operator: contains, value: "$nowhere" }
"#,
        )
        .unwrap();

        let spec = view.resolve(now());
        assert_eq!(spec.filters[0].value, serde_json::json!("2026-03-10"));
        assert_eq!(spec.filters[1].value, serde_json::json!("2026-03-10T15:00:00.000Z"));
        assert_eq!(spec.filters[2].value, serde_json::json!("$nowhere"));
    }

    #[test]
    fn invalid_views_fail_at_load() {
        let err = ViewCatalog::from_yaml(
            r#"
views:
  broken:
    page: sops
    query:
      filters:
        - { field: status, operator: resembles, value: draft }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ViewError::Query { ref view, .. } if view == "broken"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ViewCatalog::from_yaml("views: {}\nextra: 1").unwrap_err();
        assert!(matches!(err, ViewError::Yaml(_)));
    }

    #[test]
    fn merge_overrides_by_name() {
        let mut catalog = ViewCatalog::builtin().unwrap();
        let before = catalog.len();
        let extra = ViewCatalog::from_yaml(
            r#"
views:
  recent_campaigns:
    page: campaigns
    query: { sort: { key: createdAt, direction: desc }, limit: 10 }
  draft_campaigns:
    page: campaigns
    query:
      filters: [{ field: status, operator: equals, value: draft }]
"#,
        )
        .unwrap();

        catalog.merge(extra);
        assert_eq!(catalog.len(), before + 1);
        assert_eq!(catalog.get("recent_campaigns").unwrap().query.limit, Some(10));
        assert_eq!(catalog.views_for(DashboardPage::Campaigns).count(), 3);
    }

    #[test]
    fn from_path_reports_missing_files() {
        let err = ViewCatalog::from_path("/nonexistent/views.yaml").unwrap_err();
        assert!(matches!(err, ViewError::Io { .. }));
    }
}
