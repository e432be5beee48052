pub mod activity;
pub mod catalog;

pub use activity::{normalize_email, Activity};
pub use catalog::{default_catalog, load_catalog, validate_catalog, CatalogEntries, CatalogError};
