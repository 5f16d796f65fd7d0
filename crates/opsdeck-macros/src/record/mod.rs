//! Implementation of the `#[derive(Record)]` macro.
//!
//! This module generates field accessors and field name constants from
//! struct annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
