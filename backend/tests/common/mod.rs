#![allow(dead_code)]

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

use storefront::config::AppConfig;
use storefront::db::memory::MemoryStore;
use storefront::db::models::Product;
use storefront::routes::configure_routes;
use storefront::services::Services;

pub const JWT_SECRET: &str = "integration-secret";
pub const ADMIN_APP_URL: &str = "http://localhost:5174";
pub const BOUNDARY: &str = "----storefront-test-boundary";

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub upstream: MockServer,
    pub upload_dir: TempDir,
    pub config: AppConfig,
}

impl TestContext {
    pub async fn new(products: Vec<Product>) -> Self {
        let upstream = MockServer::start().await;
        let upload_dir = tempfile::tempdir().unwrap();
        let config = test_config(&upstream.uri(), &upload_dir);
        Self {
            store: Arc::new(MemoryStore::with_products(products)),
            upstream,
            upload_dir,
            config,
        }
    }

    pub fn services(&self) -> Services {
        Services::new(&self.config, self.store.clone()).unwrap()
    }

    pub fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

pub fn test_config(upstream_uri: &str, upload_dir: &TempDir) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("STORAGE_BACKEND", "memory".to_string()),
        ("BCRYPT_COST", "4".to_string()),
        ("PREDICTION_URL", format!("{}/predict", upstream_uri)),
        ("RECOMMENDATION_URL", format!("{}/recommendations", upstream_uri)),
        ("UPLOAD_DIR", upload_dir.path().display().to_string()),
        ("MAX_UPLOAD_BYTES", "1024".to_string()),
        ("ADMIN_APP_URL", ADMIN_APP_URL.to_string()),
    ]);
    AppConfig::from_lookup(|key: &str| vars.get(key).cloned()).unwrap()
}

pub fn app(
    services: &Services,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let middleware = services.auth_middleware();
    let services = services.clone();
    App::new()
        .configure(move |cfg| services.register(cfg))
        .configure(move |cfg| configure_routes(cfg, middleware))
}

/// Sends a request and returns the status with the body parsed as JSON (null when it isn't).
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub fn post_json(uri: &str, body: Value, token: Option<&str>) -> test::TestRequest {
    let req = test::TestRequest::post().uri(uri).set_json(body);
    match token {
        Some(token) => req.insert_header(("token", token)),
        None => req,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
    let req = test::TestRequest::get().uri(uri);
    match token {
        Some(token) => req.insert_header(("token", token)),
        None => req,
    }
}

pub fn registration(name: &str, email: &str, role: Option<&str>) -> test::TestRequest {
    let mut body = json!({ "name": name, "email": email, "password": "correct-horse" });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    post_json("/api/user/register", body, None)
}

pub fn token_of(body: &Value) -> String {
    body["token"]
        .as_str()
        .unwrap_or_else(|| panic!("no token in {}", body))
        .to_string()
}

pub fn product(id: &str, name: &str, price: f64, images: &[&str]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        brand: Some("Acme".to_string()),
        image: images.iter().map(|s| s.to_string()).collect(),
        category: "Women".to_string(),
        sub_category: "Topwear".to_string(),
        sizes: vec!["S".to_string(), "M".to_string()],
        bestseller: false,
        date: 1_700_000_000_000,
    }
}

/// A multipart body holding one file part.
pub fn multipart_upload(field: &str, file_name: &str, bytes: &[u8]) -> test::TestRequest {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    test::TestRequest::post()
        .uri("/api/fashion/uploadImageAndPredict")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}
