use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::OrderStatus;
use uuid::Uuid;

use super::service::OrderService;
use crate::auth::models::Session;
use crate::error::failure;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub address: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

pub async fn place_order(
    session: Session,
    orders: web::Data<OrderService>,
    body: web::Json<PlaceOrderRequest>,
) -> HttpResponse {
    match orders.place(session.user_id, body.into_inner().address).await {
        Ok(order) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order Placed",
            "orderId": order.id,
        })),
        Err(e) => {
            log::warn!("Order placement failed for user {}: {}", session.user_id, e);
            failure(e.to_string())
        }
    }
}

pub async fn user_orders(session: Session, orders: web::Data<OrderService>) -> HttpResponse {
    match orders.for_user(session.user_id).await {
        Ok(orders) => HttpResponse::Ok().json(json!({ "success": true, "orders": orders })),
        Err(e) => {
            log::error!("Loading orders failed for user {}: {}", session.user_id, e);
            failure(e.to_string())
        }
    }
}

pub async fn all_orders(_session: Session, orders: web::Data<OrderService>) -> HttpResponse {
    match orders.all().await {
        Ok(orders) => HttpResponse::Ok().json(json!({ "success": true, "orders": orders })),
        Err(e) => {
            log::error!("Loading all orders failed: {}", e);
            failure(e.to_string())
        }
    }
}

pub async fn update_status(
    _session: Session,
    orders: web::Data<OrderService>,
    body: web::Json<UpdateStatusRequest>,
) -> HttpResponse {
    match orders.update_status(body.order_id, body.status).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true, "message": "Status Updated" })),
        Err(e) => failure(e.to_string()),
    }
}
