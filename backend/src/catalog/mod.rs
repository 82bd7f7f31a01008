pub mod routes;
pub mod service;

pub use service::{CatalogError, CatalogService, NewProduct};
