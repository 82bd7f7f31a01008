use actix_web::{web, HttpResponse};
use serde_json::json;

use super::models::{AdminLoginRequest, LoginRequest, RegisterRequest, Session};
use super::service::{AccountError, AuthService};
use crate::error::failure;

fn account_failure(action: &str, err: AccountError) -> HttpResponse {
    match &err {
        AccountError::Password(_)
        | AccountError::Token(_)
        | AccountError::Repository(_)
        | AccountError::Blocking => log::error!("{} failed: {}", action, err),
        _ => log::info!("{} rejected: {}", action, err),
    }
    failure(err.to_string())
}

pub async fn register(
    auth: web::Data<AuthService>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse {
    match auth.register(body.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => account_failure("Registration", e),
    }
}

pub async fn login(auth: web::Data<AuthService>, body: web::Json<LoginRequest>) -> HttpResponse {
    match auth.login(body.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => account_failure("Login", e),
    }
}

pub async fn admin_login(
    auth: web::Data<AuthService>,
    body: web::Json<AdminLoginRequest>,
) -> HttpResponse {
    match auth.admin_login(body.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => account_failure("Admin login", e),
    }
}

pub async fn profile(session: Session) -> HttpResponse {
    log::info!("Profile requested for user ID: {}", session.user_id);
    HttpResponse::Ok().json(json!({ "user": session }))
}

pub async fn admin_dashboard(_session: Session) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Admin dashboard access granted" }))
}

pub async fn customer_dashboard(_session: Session) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Customer dashboard access granted" }))
}
