use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::db::models::Product;
use crate::db::{ProductRepository, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("Product not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub brand: Option<String>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub bestseller: bool,
}

impl NewProduct {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("Product name is required".into()));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(CatalogError::Validation("Price must be greater than zero".into()));
        }
        if self.image.is_empty() {
            return Err(CatalogError::Validation("At least one image URL is required".into()));
        }
        if let Some(bad) = self.image.iter().find(|u| Url::parse(u).is_err()) {
            return Err(CatalogError::Validation(format!("Invalid image URL: {}", bad)));
        }
        Ok(())
    }

    fn into_product(self) -> Product {
        Product {
            id: Uuid::new_v4().simple().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            brand: self.brand.filter(|b| !b.trim().is_empty()),
            image: self.image,
            category: self.category,
            sub_category: self.sub_category,
            sizes: self.sizes,
            bestseller: self.bestseller,
            date: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list_products().await?)
    }

    pub async fn get(&self, product_id: &str) -> Result<Product, CatalogError> {
        self.products
            .get_product(product_id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    pub async fn add(&self, new_product: NewProduct) -> Result<Product, CatalogError> {
        new_product.validate()?;
        let product = new_product.into_product();
        self.products.create_product(&product).await?;
        log::info!("Added product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn remove(&self, product_id: &str) -> Result<(), CatalogError> {
        if self.products.delete_product(product_id).await? {
            log::info!("Removed product {}", product_id);
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn new_product(price: f64, image: Vec<&str>) -> NewProduct {
        NewProduct {
            name: "Linen Shirt".into(),
            description: String::new(),
            price,
            brand: Some("  ".into()),
            image: image.into_iter().map(String::from).collect(),
            category: "Men".into(),
            sub_category: "Topwear".into(),
            sizes: vec!["M".into()],
            bestseller: false,
        }
    }

    #[actix_web::test]
    async fn add_then_remove_product() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::new()));
        let product = catalog
            .add(new_product(899.0, vec!["https://cdn.example.com/shirt.png"]))
            .await
            .unwrap();
        assert!(product.brand.is_none());
        assert_eq!(catalog.list().await.unwrap().len(), 1);

        catalog.remove(&product.id).await.unwrap();
        assert!(matches!(catalog.get(&product.id).await, Err(CatalogError::NotFound)));
        assert!(matches!(catalog.remove(&product.id).await, Err(CatalogError::NotFound)));
    }

    #[actix_web::test]
    async fn rejects_free_products_and_bad_urls() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            catalog.add(new_product(0.0, vec!["https://cdn.example.com/a.png"])).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            catalog.add(new_product(10.0, vec!["not a url"])).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(catalog.list().await.unwrap().is_empty());
    }
}
