//! vibemap-ingest: venue catalog loading (JSON), schema migration and opening-hours parsing.

pub mod catalog;
pub mod hours;
pub mod schema;

pub use catalog::{builtin_catalog, load_catalog, parse_catalog, Catalog};
pub use hours::{parse_day_window, parse_opening_hours};
pub use schema::{RawCatalog, SCHEMA_LATEST};
