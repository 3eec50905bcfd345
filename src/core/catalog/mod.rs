//! Celestial catalog
//!
//! CRUD surface for systems, planets, and satellites. Reads are public;
//! writes are gated on the Admin role carried in the access token.

pub mod api;

pub use api::{CatalogApiState, catalog_api_router};
