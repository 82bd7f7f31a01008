pub mod dynamodb_repository;
pub mod memory;
pub mod models;

use async_trait::async_trait;
use shared::{CartData, OrderStatus};
use uuid::Uuid;

use models::{Order, Product, User};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Item not found")]
    NotFound,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid data format: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError>;
    /// Replaces the stored cart wholesale.
    async fn save_cart(&self, user_id: Uuid, cart: &CartData) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, RepositoryError>;
    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError>;
    /// Returns whether a product was removed.
    async fn delete_product(&self, product_id: &str) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError>;
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;
    /// Returns whether an order with this id existed.
    async fn update_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<bool, RepositoryError>;
}
