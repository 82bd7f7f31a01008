use super::jwt::JwtService;
use super::models::Session;
use crate::error::ApiError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ok, ready, Ready};
use shared::Role;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// Header carrying the bearer credential.
pub const TOKEN_HEADER: &str = "token";

#[derive(Clone)]
pub struct AuthMiddleware {
    jwt_service: Arc<JwtService>,
    required_role: Option<Role>,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            jwt_service: Arc::new(jwt_service),
            required_role: None,
        }
    }

    pub fn require_role(&self, role: Role) -> Self {
        Self {
            jwt_service: self.jwt_service.clone(),
            required_role: Some(role),
        }
    }

    pub fn admin_only(&self) -> Self {
        self.require_role(Role::Admin)
    }

    pub fn customer_only(&self) -> Self {
        self.require_role(Role::Customer)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
            required_role: self.required_role,
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: Arc<JwtService>,
    required_role: Option<Role>,
}

#[derive(Debug)]
enum AuthError {
    NoTokenHeader,
    InvalidHeaderFormat,
    VerificationFailed(String),
    RoleNotAllowed { required: Role, actual: Role },
}

impl AuthError {
    fn log_message(&self, path: &str) -> String {
        match self {
            AuthError::NoTokenHeader => format!("No token header found for path: {}", path),
            AuthError::InvalidHeaderFormat => {
                format!("Invalid token header format (non-UTF-8) for path: {}", path)
            }
            AuthError::VerificationFailed(e) => {
                format!("Token verification failed for path {}: {}", path, e)
            }
            AuthError::RoleNotAllowed { required, actual } => format!(
                "Role {} rejected for path {} (requires {})",
                actual, path, required
            ),
        }
    }

    fn into_response(self) -> HttpResponse {
        let api_error = match self {
            AuthError::RoleNotAllowed { required, .. } => {
                ApiError::Forbidden(format!("Access denied. {} only.", capitalize(required.as_ref())))
            }
            _ => ApiError::Unauthorized("Not Authorized Login Again".to_string()),
        };
        actix_web::ResponseError::error_response(&api_error)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn validate_request_token(
    req: &ServiceRequest,
    jwt_service: &JwtService,
    required_role: Option<Role>,
) -> Result<Session, AuthError> {
    let header = req.headers().get(TOKEN_HEADER).ok_or(AuthError::NoTokenHeader)?;
    let token = header.to_str().map_err(|_| AuthError::InvalidHeaderFormat)?.trim();

    let session = jwt_service
        .session_from_token(token)
        .map_err(|e| AuthError::VerificationFailed(e.to_string()))?;
    log::debug!("Token verified for user: {}", session.user_id);

    match required_role {
        Some(required) if session.role != required => Err(AuthError::RoleNotAllowed {
            required,
            actual: session.role,
        }),
        _ => Ok(session),
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();
        let required_role = self.required_role;

        Box::pin(async move {
            let path_str = req.path().to_string();
            log::debug!("Auth middleware processing path: {}", &path_str);

            match validate_request_token(&req, &jwt_service, required_role) {
                Ok(session) => {
                    req.extensions_mut().insert(session);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(auth_error) => {
                    log::warn!("{}", auth_error.log_message(&path_str));

                    let (http_req, _payload) = req.into_parts();
                    let response = auth_error.into_response().map_into_right_body();
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Session>() {
            Some(session) => ready(Ok(*session)),
            None => {
                log::warn!("No session in request extensions for path: {}", req.path());
                ready(Err(ApiError::Unauthorized("Not Authorized Login Again".to_string()).into()))
            }
        }
    }
}
