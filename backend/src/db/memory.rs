use async_trait::async_trait;
use shared::{CartData, OrderStatus};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Order, Product, User};
use super::{OrderRepository, ProductRepository, RepositoryError, UserRepository};

/// Process-local store used for local development and tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    products: RwLock<Vec<Product>>,
    orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            ..Self::default()
        }
    }

    /// Loads a JSON array of products, e.g. an export of the catalog collection.
    pub async fn seed_from_file(path: &Path) -> Result<Self, RepositoryError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepositoryError::InvalidData(format!("{}: {}", path.display(), e)))?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;
        log::info!("Seeded {} products from {}", products.len(), path.display());
        Ok(Self::with_products(products))
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!("email {} already registered", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn save_cart(&self, user_id: Uuid, cart: &CartData) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or(RepositoryError::NotFound)?;
        user.cart = cart.clone();
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(RepositoryError::Conflict(format!("product {} already exists", product.id)));
        }
        products.push(product.clone());
        Ok(())
    }

    async fn delete_product(&self, product_id: &str) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != product_id);
        Ok(products.len() != before)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.orders.read().await.clone())
    }

    async fn update_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<bool, RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
