use chrono::Utc;
use serde_json::Value;
use shared::OrderStatus;
use std::sync::Arc;
use uuid::Uuid;

use crate::cart::{CartError, CartService};
use crate::db::models::{Order, OrderItem};
use crate::db::{OrderRepository, ProductRepository, RepositoryError};

pub const PAYMENT_METHOD_COD: &str = "COD";

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Delivery address is required")]
    MissingAddress,
    #[error("Product {0} is no longer available")]
    UnavailableProduct(String),
    #[error("Order not found")]
    NotFound,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    cart: CartService,
    delivery_fee: f64,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        cart: CartService,
        delivery_fee: f64,
    ) -> Self {
        Self {
            orders,
            products,
            cart,
            delivery_fee,
        }
    }

    /// Converts the user's cart into a cash-on-delivery order and empties the cart.
    pub async fn place(&self, user_id: Uuid, address: Value) -> Result<Order, OrderError> {
        if !address.as_object().is_some_and(|fields| !fields.is_empty()) {
            return Err(OrderError::MissingAddress);
        }

        let cart = self.cart.get(user_id).await?;
        let mut items = Vec::new();
        for (product_id, sizes) in &cart {
            let product = self
                .products
                .get_product(product_id)
                .await?
                .ok_or_else(|| OrderError::UnavailableProduct(product_id.clone()))?;
            for (size, quantity) in sizes.iter().filter(|(_, q)| **q > 0) {
                items.push(OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    size: size.clone(),
                    quantity: *quantity,
                });
            }
        }

        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let subtotal: f64 = items.iter().map(|i| i.price * f64::from(i.quantity)).sum();
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            items,
            amount: subtotal + self.delivery_fee,
            address,
            status: OrderStatus::OrderPlaced,
            payment_method: PAYMENT_METHOD_COD.to_string(),
            payment: false,
            date: Utc::now().timestamp_millis(),
        };

        self.orders.create_order(&order).await?;
        // Order is already stored.
        if let Err(e) = self.cart.clear(user_id).await {
            log::error!("Order {} stored but clearing the cart of user {} failed: {}", order.id, user_id, e);
        }
        log::info!(
            "Order {} placed by user {} for {:.2}",
            order.id,
            user_id,
            order.amount
        );
        Ok(order)
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.orders.orders_for_user(user_id).await?;
        orders.sort_by_key(|o| o.date);
        Ok(orders)
    }

    pub async fn all(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.orders.list_orders().await?;
        orders.sort_by_key(|o| o.date);
        Ok(orders)
    }

    pub async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<(), OrderError> {
        if self.orders.update_order_status(order_id, status).await? {
            log::info!("Order {} moved to '{}'", order_id, status);
            Ok(())
        } else {
            Err(OrderError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::{Product, User};
    use crate::db::UserRepository;
    use async_trait::async_trait;
    use serde_json::json;
    use shared::{CartData, Role};

    /// User store that refuses to save an emptied cart.
    struct StickyCarts(Arc<MemoryStore>);

    #[async_trait]
    impl UserRepository for StickyCarts {
        async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
            self.0.create_user(user).await
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            self.0.find_user_by_email(email).await
        }

        async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError> {
            self.0.get_user_by_id(user_id).await
        }

        async fn save_cart(&self, user_id: Uuid, cart: &CartData) -> Result<(), RepositoryError> {
            if cart.is_empty() {
                return Err(RepositoryError::DynamoDb("throttled".into()));
            }
            self.0.save_cart(user_id, cart).await
        }
    }

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: format!("Product {}", id),
            description: String::new(),
            price,
            brand: None,
            image: vec![format!("https://cdn.example.com/{}.png", id)],
            category: "Women".into(),
            sub_category: "Topwear".into(),
            sizes: vec!["S".into(), "M".into()],
            bestseller: false,
            date: 0,
        }
    }

    async fn setup() -> (OrderService, CartService, Uuid) {
        let store = Arc::new(MemoryStore::with_products(vec![product("p1", 200.0), product("p2", 50.0)]));
        let user = User::new("Bo".into(), "bo@example.com".into(), "hash".into(), Role::Customer);
        let user_id = user.id;
        store.create_user(&user).await.unwrap();
        let cart = CartService::new(store.clone());
        (OrderService::new(store.clone(), store, cart.clone(), 100.0), cart, user_id)
    }

    #[actix_web::test]
    async fn placing_an_order_prices_the_cart_and_clears_it() {
        let (orders, cart, user_id) = setup().await;
        cart.add(user_id, "p1", "M").await.unwrap();
        cart.add(user_id, "p1", "M").await.unwrap();
        cart.add(user_id, "p2", "S").await.unwrap();

        let order = orders.place(user_id, json!({"city": "Pune"})).await.unwrap();
        assert_eq!(order.amount, 200.0 * 2.0 + 50.0 + 100.0);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.status, OrderStatus::OrderPlaced);
        assert!(cart.get(user_id).await.unwrap().is_empty());
        assert_eq!(orders.for_user(user_id).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn order_survives_a_failed_cart_clear() {
        let store = Arc::new(MemoryStore::with_products(vec![product("p1", 200.0)]));
        let user = User::new("Bo".into(), "bo@example.com".into(), "hash".into(), Role::Customer);
        let user_id = user.id;
        store.create_user(&user).await.unwrap();
        let cart = CartService::new(Arc::new(StickyCarts(store.clone())));
        let orders = OrderService::new(store.clone(), store, cart.clone(), 100.0);

        cart.add(user_id, "p1", "M").await.unwrap();
        let order = orders.place(user_id, json!({"city": "Pune"})).await.unwrap();

        assert_eq!(order.amount, 300.0);
        assert_eq!(orders.for_user(user_id).await.unwrap().len(), 1);
        assert_eq!(cart.get(user_id).await.unwrap()["p1"]["M"], 1);
    }

    #[actix_web::test]
    async fn empty_cart_and_missing_address_are_rejected() {
        let (orders, cart, user_id) = setup().await;
        assert!(matches!(
            orders.place(user_id, json!({"city": "Pune"})).await,
            Err(OrderError::EmptyCart)
        ));
        cart.add(user_id, "p1", "M").await.unwrap();
        assert!(matches!(
            orders.place(user_id, json!({})).await,
            Err(OrderError::MissingAddress)
        ));
    }

    #[actix_web::test]
    async fn status_updates_require_an_existing_order() {
        let (orders, cart, user_id) = setup().await;
        cart.add(user_id, "p2", "S").await.unwrap();
        let order = orders.place(user_id, json!({"city": "Goa"})).await.unwrap();

        orders.update_status(order.id, OrderStatus::Shipped).await.unwrap();
        assert_eq!(orders.all().await.unwrap()[0].status, OrderStatus::Shipped);
        assert!(matches!(
            orders.update_status(Uuid::new_v4(), OrderStatus::Delivered).await,
            Err(OrderError::NotFound)
        ));
    }
}
