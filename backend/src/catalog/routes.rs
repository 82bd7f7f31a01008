use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::service::{CatalogError, CatalogService, NewProduct};
use crate::auth::models::Session;
use crate::error::failure;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleProductRequest {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveProductRequest {
    pub id: String,
}

pub async fn list_products(catalog: web::Data<CatalogService>) -> HttpResponse {
    match catalog.list().await {
        Ok(products) => HttpResponse::Ok().json(json!({ "success": true, "products": products })),
        Err(e) => {
            log::error!("Failed to list products: {}", e);
            failure(e.to_string())
        }
    }
}

pub async fn single_product(
    _session: Session,
    catalog: web::Data<CatalogService>,
    body: web::Json<SingleProductRequest>,
) -> HttpResponse {
    match catalog.get(&body.product_id).await {
        Ok(product) => HttpResponse::Ok().json(json!({ "success": true, "product": product })),
        Err(CatalogError::NotFound) => failure("Product not found"),
        Err(e) => {
            log::error!("Failed to load product {}: {}", body.product_id, e);
            failure(e.to_string())
        }
    }
}

pub async fn add_product(
    session: Session,
    catalog: web::Data<CatalogService>,
    body: web::Json<NewProduct>,
) -> HttpResponse {
    match catalog.add(body.into_inner()).await {
        Ok(product) => {
            log::info!("Admin {} added product {}", session.user_id, product.id);
            HttpResponse::Ok().json(json!({ "success": true, "message": "Product Added" }))
        }
        Err(e) => {
            log::warn!("Product creation rejected: {}", e);
            failure(e.to_string())
        }
    }
}

pub async fn remove_product(
    session: Session,
    catalog: web::Data<CatalogService>,
    body: web::Json<RemoveProductRequest>,
) -> HttpResponse {
    match catalog.remove(&body.id).await {
        Ok(()) => {
            log::info!("Admin {} removed product {}", session.user_id, body.id);
            HttpResponse::Ok().json(json!({ "success": true, "message": "Product Removed" }))
        }
        Err(e) => failure(e.to_string()),
    }
}
