//! Proc macros for opsdeck.
//!
//! # Derive Macros
//!
//! - [`Record`] - Generate field accessors and field name constants for the
//!   query pipeline
//!
//! Use these through `opsdeck-query` with the `derive` feature enabled,
//! which re-exports them next to the traits they implement.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derives the `Record` trait for queryable structs.
///
/// Exposed fields are read through `opsdeck_query::ToValue`, so any field
/// type with a `ToValue` impl works: strings, integers, floats, `bool`,
/// `Vec<String>`, `Timestamp`, `chrono::DateTime`, `chrono::NaiveDate`, and
/// `Option` of any of these (where `None` reads as a missing field).
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[record]` | Expose this field under its Rust name |
/// | `#[record(rename = "...")]` | Expose this field under a custom name |
/// | `#[record(skip)]` | Never expose this field |
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[record(rename_all = "...")]` | Rename exposed fields: `camelCase`, `PascalCase`, `snake_case`, `SCREAMING_SNAKE_CASE`, `kebab-case`, `lowercase` |
/// | `#[record(all)]` | Expose every field that is not skipped |
///
/// # Generated Code
///
/// 1. Field name constants (e.g., `Campaign::UPDATED_AT`), named after the
///    exposed name in SCREAMING_SNAKE_CASE
/// 2. `RECORD_FIELDS`, the list of exposed names
/// 3. Implementation of `Record::field_value()`
///
/// # Example
///
/// ```ignore
/// use opsdeck_query::{Query, Record};
///
/// #[derive(Record)]
/// #[record(rename_all = "camelCase")]
/// struct Campaign {
///     #[record]
///     name: String,
///
///     #[record]
///     open_rate: f64,
///
///     #[record]
///     sent_at: Option<chrono::DateTime<chrono::Utc>>,
///
///     html_body: String,
/// }
///
/// let query = Query::new()
///     .greater_than(Campaign::OPEN_RATE, 0.25)
///     .exists(Campaign::SENT_AT)
///     .sort_desc(Campaign::SENT_AT)
///     .build();
///
/// let results = query.filter(&campaigns, Campaign::accessor);
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
