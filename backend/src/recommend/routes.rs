use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use shared::{RecommendationResponse, RecommendationResult};
use url::Url;

use super::client::UpstreamError;
use super::service::RecommendationService;
use super::upload::{self, UploadError, UploadSettings};
use crate::auth::models::Session;

const SUCCESS_MESSAGE: &str = "Recommendations retrieved successfully";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

fn recommendations(results: Vec<RecommendationResult>) -> HttpResponse {
    HttpResponse::Ok().json(RecommendationResponse {
        message: SUCCESS_MESSAGE.to_string(),
        recommendations: results,
    })
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": message }))
}

fn server_error(err: &UpstreamError) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "message": "Server error",
        "error": err.payload(),
    }))
}

pub async fn upload_image_and_predict(
    session: Session,
    recommender: web::Data<RecommendationService>,
    settings: web::Data<UploadSettings>,
    mut payload: Multipart,
) -> HttpResponse {
    log::info!("Image recommendation requested by user {}", session.user_id);

    let mut upload = match upload::receive_image(&mut payload, &settings.dir, settings.max_bytes).await {
        Ok(upload) => upload,
        Err(e @ UploadError::Io(_)) => {
            log::error!("Failed to store upload: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "message": "Server error",
                "error": e.to_string(),
            }));
        }
        Err(e) => {
            log::warn!("Rejected upload from user {}: {}", session.user_id, e);
            return bad_request(&e.to_string());
        }
    };

    let outcome = recommender.for_upload(&upload).await;
    upload.cleanup().await;

    match outcome {
        Ok(results) => recommendations(results),
        Err(e) => {
            log::error!("Error processing image: {}", e);
            server_error(&e)
        }
    }
}

pub async fn recommendations_by_product_id(
    _session: Session,
    recommender: web::Data<RecommendationService>,
    path: web::Path<String>,
) -> HttpResponse {
    let product_id = path.into_inner();
    if product_id.trim().is_empty() {
        return bad_request("Product ID is required");
    }

    match recommender.for_product(product_id.trim()).await {
        Ok(results) => recommendations(results),
        Err(e) => {
            log::error!("Error getting recommendations by product ID {}: {}", product_id, e);
            server_error(&e)
        }
    }
}

pub async fn recommendations_by_image_url(
    _session: Session,
    recommender: web::Data<RecommendationService>,
    body: web::Json<ImageUrlRequest>,
) -> HttpResponse {
    let Some(image_url) = body.image_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return bad_request("Image URL is required");
    };
    match Url::parse(image_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => return bad_request("Image URL must be an absolute http(s) URL"),
    }

    match recommender.for_image_url(image_url).await {
        Ok(results) => recommendations(results),
        Err(e) => {
            log::error!("Error getting recommendations by image URL: {}", e);
            server_error(&e)
        }
    }
}
