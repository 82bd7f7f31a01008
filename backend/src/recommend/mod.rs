pub mod client;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod service;
pub mod upload;

pub use client::{PredictionClient, UpstreamError};
pub use service::RecommendationService;
pub use upload::{TempUpload, UploadError, UploadSettings};
