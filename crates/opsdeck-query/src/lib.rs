//! Record query pipeline: filter, sort, group and slice in-memory records.
//!
//! Every list in the dashboard (campaigns, subscribers, notifications, SOPs,
//! compliance tasks) narrows, orders, buckets and truncates a slice of
//! records. This crate does that once, for any record type, through an
//! accessor function that reads a named field as a [`Value`].
//!
//! - Predicates over strings, numbers, dates, booleans and string lists
//! - Case-insensitive free-text search across a set of fields
//! - Stable sorting with missing values last and an optional tie-break key
//! - Grouping with caller-declared label order and an `Unclassified` bucket
//! - Limit/offset and page slicing
//! - Declarative [`QuerySpec`]s in JSON or YAML
//!
//! # Quick Start
//!
//! ```rust
//! use opsdeck_query::{Query, Value, Number, Timestamp};
//!
//! struct Campaign {
//!     id: u32,
//!     name: String,
//!     status: String,
//!     updated_at: Timestamp,
//! }
//!
//! fn accessor<'a>(c: &'a Campaign, field: &str) -> Value<'a> {
//!     match field {
//!         "id" => Value::Number(Number::from(c.id)),
//!         "name" => Value::String(&c.name),
//!         "status" => Value::String(&c.status),
//!         "updatedAt" => Value::Timestamp(c.updated_at),
//!         _ => Value::None,
//!     }
//! }
//!
//! let at = |s: &str| Timestamp::parse(s).unwrap();
//! let campaigns = vec![
//!     Campaign { id: 1, name: "Spring Sale".into(), status: "sent".into(), updated_at: at("2026-03-01") },
//!     Campaign { id: 2, name: "Newsletter".into(), status: "draft".into(), updated_at: at("2026-03-04") },
//!     Campaign { id: 3, name: "Webinar".into(), status: "sent".into(), updated_at: at("2026-03-04") },
//! ];
//!
//! let recent = Query::new()
//!     .sort_desc("updatedAt")
//!     .tie_break("id")
//!     .limit(2)
//!     .build();
//!
//! let ids: Vec<u32> = recent.filter(&campaigns, accessor).iter().map(|c| c.id).collect();
//! assert_eq!(ids, vec![2, 3]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! records -> filter -> sort -> group (optional) -> offset/limit -> result
//! ```
//!
//! A record passes the filter when
//!
//! ```text
//! (search is blank OR any search field contains the text)
//!   AND (no predicates OR all/any predicates match, per match mode)
//! ```
//!
//! With grouping, offset and limit apply per group.
//!
//! # Failure isolation
//!
//! A predicate that cannot be evaluated for one record (a `before` filter
//! against a field that is not a date) logs a `tracing` warning and
//! excludes that record only. A classifier that fails for one record sends
//! it to the [`UNCLASSIFIED`] group. Build-time problems (bad regex, unknown
//! operator in a spec) are returned as [`QueryError`].
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `equals`, `not_equals`, `contains`, `does_not_contain`, `starts_with`, `ends_with`, `matches`, `in` |
//! | Number | `equals`, `not_equals`, `greater_than`, `greater_or_equal`, `less_than`, `less_or_equal` |
//! | Timestamp | `equals`, `not_equals`, `before`, `after`, and the numeric comparisons |
//! | List | `contains`, `does_not_contain`, `equals` |
//! | Any | `exists`, `does_not_exist` |

mod error;
mod filter;
mod group;
mod op;
mod page;
mod predicate;
mod query;
mod record;
mod search;
mod sort;
mod spec;
mod value;

pub use error::{QueryError, Result};
pub use filter::{Filter, MatchMode};
pub use group::{group_by, DateBucket, DateBuckets, Group, GroupBy, Groups, UNCLASSIFIED};
pub use op::Op;
pub use page::{paginate, take_first, Page};
pub use predicate::{evaluate, Operand, Predicate};
pub use query::{Query, QueryResult};
pub use record::{DynRecord, FieldValue, Record, ToValue};
pub use search::Search;
pub use sort::{compare_values, sort_by_key_fn, sort_by_key_fns, Dir, Sort, SortValue};
pub use spec::{GroupBySpec, GroupKind, PredicateSpec, QuerySpec, SearchSpec, SortSpec};
pub use value::{Number, Timestamp, Value};

#[cfg(feature = "derive")]
pub use opsdeck_macros::Record;
