use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::service::{item_count, CartService};
use crate::auth::models::Session;
use crate::error::failure;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub item_id: String,
    pub size: String,
    pub quantity: i64,
}

pub async fn add_to_cart(
    session: Session,
    cart: web::Data<CartService>,
    body: web::Json<AddToCartRequest>,
) -> HttpResponse {
    match cart.add(session.user_id, &body.item_id, &body.size).await {
        Ok(cart_data) => {
            log::info!(
                "User {} added {} ({}), cart holds {} items",
                session.user_id,
                body.item_id,
                body.size,
                item_count(&cart_data)
            );
            HttpResponse::Ok().json(json!({ "success": true, "message": "Added To Cart" }))
        }
        Err(e) => {
            log::error!("Add to cart failed for user {}: {}", session.user_id, e);
            failure(e.to_string())
        }
    }
}

pub async fn update_cart(
    session: Session,
    cart: web::Data<CartService>,
    body: web::Json<UpdateCartRequest>,
) -> HttpResponse {
    match cart
        .update(session.user_id, &body.item_id, &body.size, body.quantity)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true, "message": "Cart Updated" })),
        Err(e) => {
            log::error!("Cart update failed for user {}: {}", session.user_id, e);
            failure(e.to_string())
        }
    }
}

pub async fn get_cart(session: Session, cart: web::Data<CartService>) -> HttpResponse {
    match cart.get(session.user_id).await {
        Ok(cart_data) => HttpResponse::Ok().json(json!({ "success": true, "cartData": cart_data })),
        Err(e) => {
            log::error!("Loading cart failed for user {}: {}", session.user_id, e);
            failure(e.to_string())
        }
    }
}
