use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use shared::{CartData, OrderStatus, Role};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use super::models::{Order, Product, User};
use super::{OrderRepository, ProductRepository, RepositoryError, UserRepository};
use crate::config::DynamoTables;

type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoDbRepository {
    client: Client,
    users_table: String,
    products_table: String,
    orders_table: String,
}

impl DynamoDbRepository {
    pub fn new(client: Client, tables: DynamoTables) -> Self {
        Self {
            client,
            users_table: tables.users,
            products_table: tables.products,
            orders_table: tables.orders,
        }
    }

    async fn scan_all(
        &self,
        table: &str,
        filter: Option<(&str, &str, AttributeValue)>,
    ) -> Result<Vec<Item>, RepositoryError> {
        let mut request = self.client.scan().table_name(table);
        if let Some((expression, placeholder, value)) = filter {
            request = request
                .filter_expression(expression)
                .expression_attribute_values(placeholder, value);
        }

        request
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| {
                log::error!("DynamoDB scan on '{}' failed: {:?}", table, e);
                RepositoryError::DynamoDb(e.to_string())
            })
    }

    async fn get_item(&self, table: &str, id: String) -> Result<Option<Item>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(table)
            .key("id", AttributeValue::S(id))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
        Ok(result.item)
    }

    async fn put_item(&self, table: &str, item: Item, guard_new: bool) -> Result<(), RepositoryError> {
        let mut request = self.client.put_item().table_name(table).set_item(Some(item));
        if guard_new {
            request = request.condition_expression("attribute_not_exists(id)");
        }

        request.send().await.map_err(|e| {
            if let Some(service_err) = e.as_service_error() {
                if service_err.is_conditional_check_failed_exception() {
                    return RepositoryError::Conflict(format!("item already exists in '{}'", table));
                }
            }
            log::error!("DynamoDB put_item on '{}' failed: {:?}", table, e);
            RepositoryError::DynamoDb(e.to_string())
        })?;
        Ok(())
    }

    // Item encoding

    fn user_to_item(user: &User) -> Result<Item, RepositoryError> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(user.id.to_string()));
        item.insert("name".to_string(), AttributeValue::S(user.name.clone()));
        item.insert("email".to_string(), AttributeValue::S(user.email.clone()));
        item.insert(
            "password_hash".to_string(),
            AttributeValue::S(user.password_hash.clone()),
        );
        item.insert("role".to_string(), AttributeValue::S(user.role.to_string()));
        item.insert(
            "cart_data".to_string(),
            AttributeValue::S(serde_json::to_string(&user.cart)?),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(user.created_at.to_rfc3339()),
        );
        Ok(item)
    }

    fn product_to_item(product: &Product) -> Item {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(product.id.clone()));
        item.insert("name".to_string(), AttributeValue::S(product.name.clone()));
        item.insert(
            "description".to_string(),
            AttributeValue::S(product.description.clone()),
        );
        item.insert("price".to_string(), AttributeValue::N(product.price.to_string()));
        if let Some(brand) = &product.brand {
            item.insert("brand".to_string(), AttributeValue::S(brand.clone()));
        }
        item.insert("image".to_string(), string_list(&product.image));
        item.insert("category".to_string(), AttributeValue::S(product.category.clone()));
        item.insert(
            "sub_category".to_string(),
            AttributeValue::S(product.sub_category.clone()),
        );
        item.insert("sizes".to_string(), string_list(&product.sizes));
        item.insert("bestseller".to_string(), AttributeValue::Bool(product.bestseller));
        item.insert("date".to_string(), AttributeValue::N(product.date.to_string()));
        item
    }

    fn order_to_item(order: &Order) -> Result<Item, RepositoryError> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(order.id.to_string()));
        item.insert("user_id".to_string(), AttributeValue::S(order.user_id.to_string()));
        item.insert(
            "items".to_string(),
            AttributeValue::S(serde_json::to_string(&order.items)?),
        );
        item.insert("amount".to_string(), AttributeValue::N(order.amount.to_string()));
        item.insert(
            "address".to_string(),
            AttributeValue::S(order.address.to_string()),
        );
        item.insert("status".to_string(), AttributeValue::S(order.status.to_string()));
        item.insert(
            "payment_method".to_string(),
            AttributeValue::S(order.payment_method.clone()),
        );
        item.insert("payment".to_string(), AttributeValue::Bool(order.payment));
        item.insert("date".to_string(), AttributeValue::N(order.date.to_string()));
        Ok(item)
    }

    // Helper methods for parsing DynamoDB items

    fn parse_user_from_item(item: &Item) -> Result<User, RepositoryError> {
        let id = required_s(item, "id")
            .and_then(|s| Uuid::parse_str(s).map_err(|_| invalid("id")))?;
        let role = required_s(item, "role")
            .and_then(|s| Role::from_str(s).map_err(|_| invalid("role")))?;

        let cart = match item.get("cart_data").and_then(|v| v.as_s().ok()) {
            Some(raw) => serde_json::from_str(raw)?,
            None => CartData::new(),
        };

        let created_at = required_s(item, "created_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).map_err(|_| invalid("created_at")))?
            .with_timezone(&Utc);

        Ok(User {
            id,
            name: required_s(item, "name")?.clone(),
            email: required_s(item, "email")?.clone(),
            password_hash: required_s(item, "password_hash")?.clone(),
            role,
            cart,
            created_at,
        })
    }

    fn parse_product_from_item(item: &Item) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: required_s(item, "id")?.clone(),
            name: required_s(item, "name")?.clone(),
            description: optional_s(item, "description").unwrap_or_default(),
            price: required_n(item, "price")?,
            brand: optional_s(item, "brand"),
            image: parse_string_list(item, "image"),
            category: optional_s(item, "category").unwrap_or_default(),
            sub_category: optional_s(item, "sub_category").unwrap_or_default(),
            sizes: parse_string_list(item, "sizes"),
            bestseller: item
                .get("bestseller")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            date: item
                .get("date")
                .and_then(|v| v.as_n().ok())
                .and_then(|n| n.parse().ok())
                .unwrap_or_default(),
        })
    }

    fn parse_order_from_item(item: &Item) -> Result<Order, RepositoryError> {
        let id = required_s(item, "id")
            .and_then(|s| Uuid::parse_str(s).map_err(|_| invalid("id")))?;
        let user_id = required_s(item, "user_id")
            .and_then(|s| Uuid::parse_str(s).map_err(|_| invalid("user_id")))?;
        let status = required_s(item, "status")
            .and_then(|s| OrderStatus::from_str(s).map_err(|_| invalid("status")))?;

        Ok(Order {
            id,
            user_id,
            items: serde_json::from_str(required_s(item, "items")?)?,
            amount: required_n(item, "amount")?,
            address: serde_json::from_str(required_s(item, "address")?)?,
            status,
            payment_method: required_s(item, "payment_method")?.clone(),
            payment: item
                .get("payment")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            date: required_n(item, "date")? as i64,
        })
    }
}

fn invalid(field: &str) -> RepositoryError {
    RepositoryError::InvalidData(format!("Invalid {}", field))
}

fn required_s<'a>(item: &'a Item, field: &str) -> Result<&'a String, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| invalid(field))
}

fn optional_s(item: &Item, field: &str) -> Option<String> {
    item.get(field).and_then(|v| v.as_s().ok()).cloned()
}

fn required_n(item: &Item, field: &str) -> Result<f64, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<f64>().ok())
        .ok_or_else(|| invalid(field))
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn parse_string_list(item: &Item, field: &str) -> Vec<String> {
    item.get(field)
        .and_then(|v| v.as_l().ok())
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_s().ok().cloned())
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl UserRepository for DynamoDbRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepositoryError> {
        log::info!("Creating user in DynamoDB table '{}': {}", self.users_table, user.email);

        if self.find_user_by_email(&user.email).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        let item = Self::user_to_item(user)?;
        self.put_item(&self.users_table, item, true).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let items = self
            .scan_all(
                &self.users_table,
                Some(("email = :email", ":email", AttributeValue::S(email.to_string()))),
            )
            .await?;

        items.first().map(Self::parse_user_from_item).transpose()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, RepositoryError> {
        self.get_item(&self.users_table, user_id.to_string())
            .await?
            .as_ref()
            .map(Self::parse_user_from_item)
            .transpose()
    }

    async fn save_cart(&self, user_id: Uuid, cart: &CartData) -> Result<(), RepositoryError> {
        log::debug!("Saving cart for user {}", user_id);

        self.client
            .update_item()
            .table_name(&self.users_table)
            .key("id", AttributeValue::S(user_id.to_string()))
            .condition_expression("attribute_exists(id)")
            .update_expression("SET cart_data = :cart_data")
            .expression_attribute_values(":cart_data", AttributeValue::S(serde_json::to_string(cart)?))
            .send()
            .await
            .map_err(|e| {
                if let Some(service_err) = e.as_service_error() {
                    if service_err.is_conditional_check_failed_exception() {
                        return RepositoryError::NotFound;
                    }
                }
                log::error!("DynamoDB update_item failed for user {}: {:?}", user_id, e);
                RepositoryError::DynamoDb(e.to_string())
            })?;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for DynamoDbRepository {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.scan_all(&self.products_table, None)
            .await?
            .iter()
            .map(Self::parse_product_from_item)
            .collect()
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, RepositoryError> {
        self.get_item(&self.products_table, product_id.to_string())
            .await?
            .as_ref()
            .map(Self::parse_product_from_item)
            .transpose()
    }

    async fn create_product(&self, product: &Product) -> Result<(), RepositoryError> {
        log::info!("Creating product '{}' ({})", product.name, product.id);
        self.put_item(&self.products_table, Self::product_to_item(product), true)
            .await
    }

    async fn delete_product(&self, product_id: &str) -> Result<bool, RepositoryError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.products_table)
            .key("id", AttributeValue::S(product_id.to_string()))
            .return_values(aws_sdk_dynamodb::types::ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
        Ok(result.attributes.is_some())
    }
}

#[async_trait]
impl OrderRepository for DynamoDbRepository {
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        log::info!("Creating order {} for user {}", order.id, order.user_id);
        self.put_item(&self.orders_table, Self::order_to_item(order)?, true)
            .await
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        self.scan_all(
            &self.orders_table,
            Some(("user_id = :user_id", ":user_id", AttributeValue::S(user_id.to_string()))),
        )
        .await?
        .iter()
        .map(Self::parse_order_from_item)
        .collect()
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.scan_all(&self.orders_table, None)
            .await?
            .iter()
            .map(Self::parse_order_from_item)
            .collect()
    }

    async fn update_order_status(&self, order_id: Uuid, status: OrderStatus) -> Result<bool, RepositoryError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.orders_table)
            .key("id", AttributeValue::S(order_id.to_string()))
            .condition_expression("attribute_exists(id)")
            .update_expression("SET #status = :status")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match e.as_service_error() {
                Some(service_err) if service_err.is_conditional_check_failed_exception() => Ok(false),
                _ => {
                    log::error!("DynamoDB update_item failed for order {}: {:?}", order_id, e);
                    Err(RepositoryError::DynamoDb(e.to_string()))
                }
            },
        }
    }
}
