use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, App, HttpServer};
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

use storefront::auth::middleware::TOKEN_HEADER;
use storefront::config::{AppConfig, StorageBackend};
use storefront::db::dynamodb_repository::DynamoDbRepository;
use storefront::db::memory::MemoryStore;
use storefront::routes::configure_routes;
use storefront::services::Services;

fn startup_error(context: &str, err: impl std::fmt::Display) -> Error {
    log::error!("{}: {}", context, err);
    Error::new(ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let services = match (config.storage, config.tables.clone()) {
        (StorageBackend::DynamoDb, Some(tables)) => {
            let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            let dynamodb_client = DynamoDbClient::new(&aws_config);
            log::info!(
                "Using DynamoDB tables {}, {}, {}",
                tables.users,
                tables.products,
                tables.orders
            );
            Services::new(&config, Arc::new(DynamoDbRepository::new(dynamodb_client, tables)))
        }
        _ => {
            let store = match &config.catalog_seed_path {
                Some(path) => MemoryStore::seed_from_file(path)
                    .await
                    .map_err(|e| startup_error("Failed to seed catalog", e))?,
                None => MemoryStore::new(),
            };
            log::warn!("Using the in-memory store; data is lost on restart");
            Services::new(&config, Arc::new(store))
        }
    }
    .map_err(|e| startup_error("Failed to build prediction client", e))?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| startup_error("Failed to create upload directory", e))?;
    log::info!("Spooling uploads to {}", config.upload_dir.display());
    log::info!("Prediction service: {}", config.prediction_url);

    let auth_middleware = services.auth_middleware();
    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                    .allowed_header(TOKEN_HEADER)
                    .max_age(3600),
            )
            .configure(|cfg| services.register(cfg))
            .configure(|cfg| configure_routes(cfg, auth_middleware.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
