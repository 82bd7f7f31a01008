use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StorageBackend::DynamoDb),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DynamoTables {
    pub users: String,
    pub products: String,
    pub orders: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub storage: StorageBackend,
    pub tables: Option<DynamoTables>,
    pub catalog_seed_path: Option<PathBuf>,
    pub prediction_url: Url,
    pub recommendation_url: Url,
    pub num_recommendations: u32,
    pub upstream_timeout: Option<Duration>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub delivery_fee: f64,
    pub admin_app_url: Option<String>,
}

const DEFAULT_PREDICTION_URL: &str =
    "http://localhost:8000/v1/models/fashion_recommender/versions/1:predict";
const DEFAULT_RECOMMENDATION_URL: &str = "http://localhost:8501/recommendations";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let storage: StorageBackend = parse_or(&var, "STORAGE_BACKEND", StorageBackend::DynamoDb)?;

        let tables = match storage {
            StorageBackend::DynamoDb => Some(DynamoTables {
                users: var("DYNAMODB_USERS_TABLE").ok_or(ConfigError::Missing("DYNAMODB_USERS_TABLE"))?,
                products: var("DYNAMODB_PRODUCTS_TABLE")
                    .ok_or(ConfigError::Missing("DYNAMODB_PRODUCTS_TABLE"))?,
                orders: var("DYNAMODB_ORDERS_TABLE").ok_or(ConfigError::Missing("DYNAMODB_ORDERS_TABLE"))?,
            }),
            StorageBackend::Memory => None,
        };

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value("UPSTREAM_TIMEOUT_SECS", &raw)?)),
            None => None,
        };

        Ok(Self {
            port: parse_or(&var, "PORT", 4000)?,
            jwt_secret,
            token_ttl_hours: parse_or(&var, "TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: parse_or(&var, "BCRYPT_COST", 10)?,
            storage,
            tables,
            catalog_seed_path: var("CATALOG_SEED_PATH").map(PathBuf::from),
            prediction_url: parse_url(&var, "PREDICTION_URL", DEFAULT_PREDICTION_URL)?,
            recommendation_url: parse_url(&var, "RECOMMENDATION_URL", DEFAULT_RECOMMENDATION_URL)?,
            num_recommendations: parse_or(&var, "NUM_RECOMMENDATIONS", 5)?,
            upstream_timeout,
            upload_dir: var("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            delivery_fee: parse_or(&var, "DELIVERY_FEE", 100.0)?,
            admin_app_url: var("ADMIN_APP_URL"),
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => parse_value(key, &raw),
        None => {
            log::info!("{} not set, using default", key);
            Ok(default)
        }
    }
}

fn parse_url<F>(var: &F, key: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
