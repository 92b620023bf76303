//! Parsing, validation, and time handling for catalog data.

pub mod post;
pub mod time;

pub use post::{parse_catalog_json_str, validate_post, CatalogDocument};
