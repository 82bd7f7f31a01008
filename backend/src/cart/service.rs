use shared::CartData;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{RepositoryError, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Largest quantity a single `(product, size)` entry can hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Increments `cart[product_id][size]`, creating the nested entries on demand.
/// Stops at `MAX_LINE_QUANTITY`.
pub fn add_item(cart: &mut CartData, product_id: &str, size: &str) {
    let quantity = cart
        .entry(product_id.to_string())
        .or_default()
        .entry(size.to_string())
        .or_insert(0);
    *quantity = quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
}

/// Sets a quantity, capped at `MAX_LINE_QUANTITY`. Zero or less removes the size, and the
/// product once it has no sizes left.
pub fn set_quantity(cart: &mut CartData, product_id: &str, size: &str, quantity: i64) {
    if quantity > 0 {
        let quantity = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(MAX_LINE_QUANTITY);
        cart.entry(product_id.to_string())
            .or_default()
            .insert(size.to_string(), quantity);
        return;
    }

    if let Some(sizes) = cart.get_mut(product_id) {
        sizes.remove(size);
        if sizes.is_empty() {
            cart.remove(product_id);
        }
    }
}

pub fn item_count(cart: &CartData) -> u32 {
    cart.values().flat_map(|sizes| sizes.values()).sum()
}

#[derive(Clone)]
pub struct CartService {
    users: Arc<dyn UserRepository>,
}

impl CartService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<CartData, CartError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(CartError::UserNotFound)?;
        Ok(user.cart)
    }

    pub async fn add(&self, user_id: Uuid, product_id: &str, size: &str) -> Result<CartData, CartError> {
        validate_key(product_id, size)?;
        let mut cart = self.get(user_id).await?;
        add_item(&mut cart, product_id, size);
        self.users.save_cart(user_id, &cart).await?;
        Ok(cart)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        product_id: &str,
        size: &str,
        quantity: i64,
    ) -> Result<CartData, CartError> {
        validate_key(product_id, size)?;
        let mut cart = self.get(user_id).await?;
        set_quantity(&mut cart, product_id, size, quantity);
        self.users.save_cart(user_id, &cart).await?;
        Ok(cart)
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<(), CartError> {
        self.users.save_cart(user_id, &CartData::new()).await?;
        Ok(())
    }
}

fn validate_key(product_id: &str, size: &str) -> Result<(), CartError> {
    if product_id.trim().is_empty() {
        return Err(CartError::Validation("Item id is required"));
    }
    if size.trim().is_empty() {
        return Err(CartError::Validation("Please select a size"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::User;
    use shared::Role;

    async fn service_with_user() -> (CartService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("Ann".into(), "ann@example.com".into(), "hash".into(), Role::Customer);
        let user_id = user.id;
        store.create_user(&user).await.unwrap();
        (CartService::new(store), user_id)
    }

    #[test]
    fn adding_twice_accumulates() {
        let mut cart = CartData::new();
        add_item(&mut cart, "p1", "M");
        add_item(&mut cart, "p1", "M");
        add_item(&mut cart, "p1", "L");
        assert_eq!(cart["p1"]["M"], 2);
        assert_eq!(cart["p1"]["L"], 1);
        assert_eq!(item_count(&cart), 3);
    }

    #[test]
    fn zero_quantity_prunes_empty_entries() {
        let mut cart = CartData::new();
        add_item(&mut cart, "p1", "M");
        add_item(&mut cart, "p1", "L");

        set_quantity(&mut cart, "p1", "M", 0);
        assert!(!cart["p1"].contains_key("M"));

        set_quantity(&mut cart, "p1", "L", -3);
        assert!(cart.is_empty());

        set_quantity(&mut cart, "missing", "S", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn positive_quantity_is_set_directly() {
        let mut cart = CartData::new();
        set_quantity(&mut cart, "p2", "XL", 4);
        assert_eq!(cart["p2"]["XL"], 4);
    }

    #[actix_web::test]
    async fn cart_changes_are_persisted() {
        let (service, user_id) = service_with_user().await;
        service.add(user_id, "p1", "M").await.unwrap();
        service.add(user_id, "p1", "M").await.unwrap();
        assert_eq!(service.get(user_id).await.unwrap()["p1"]["M"], 2);

        service.update(user_id, "p1", "M", 5).await.unwrap();
        assert_eq!(service.get(user_id).await.unwrap()["p1"]["M"], 5);

        service.clear(user_id).await.unwrap();
        assert!(service.get(user_id).await.unwrap().is_empty());
    }

    #[test]
    fn quantities_are_capped() {
        let mut cart = CartData::new();
        set_quantity(&mut cart, "p1", "M", 5_000_000_000);
        assert_eq!(cart["p1"]["M"], MAX_LINE_QUANTITY);
        add_item(&mut cart, "p1", "M");
        assert_eq!(cart["p1"]["M"], MAX_LINE_QUANTITY);
    }

    #[actix_web::test]
    async fn adding_after_a_huge_update_keeps_a_positive_quantity() {
        let (service, user_id) = service_with_user().await;
        service.update(user_id, "p1", "M", 5_000_000_000).await.unwrap();
        let cart = service.add(user_id, "p1", "M").await.unwrap();
        assert_eq!(cart["p1"]["M"], MAX_LINE_QUANTITY);
        assert_eq!(service.get(user_id).await.unwrap()["p1"]["M"], MAX_LINE_QUANTITY);
    }

    #[actix_web::test]
    async fn unknown_user_and_missing_size_fail() {
        let (service, user_id) = service_with_user().await;
        assert!(matches!(
            service.add(Uuid::new_v4(), "p1", "M").await,
            Err(CartError::UserNotFound)
        ));
        assert!(matches!(
            service.add(user_id, "p1", " ").await,
            Err(CartError::Validation(_))
        ));
    }
}
