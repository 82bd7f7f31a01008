pub mod routes;
pub mod service;

pub use service::{OrderError, OrderService};
