use crate::model::{Product, User};
use hal_framework::{Entity, FieldValue, Fields, HalError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Represents a customer order.
///
/// The customer and the product are held as entities, so they are rendered
/// under `_embedded` with their own `self` links.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer: Arc<User>,
    pub product: Arc<Product>,
    pub quantity: u32,
    pub total: f64,
    pub status: String,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: crate::model::UserId,
    pub product_id: crate::model::ProductId,
    pub quantity: u32,
}

impl Order {
    /// The order is initialized with status "Created".
    pub fn new(id: OrderId, customer: Arc<User>, product: Arc<Product>, quantity: u32) -> Self {
        let total = product.price * f64::from(quantity);
        Self {
            id,
            customer,
            product,
            quantity,
            total,
            status: "Created".to_string(),
        }
    }
}

impl Entity for Order {
    fn entity_type(&self) -> &str {
        "Order"
    }

    fn public_fields(&self) -> Result<Fields, HalError> {
        let customer: Arc<dyn Entity> = self.customer.clone();
        let product: Arc<dyn Entity> = self.product.clone();
        Ok(Fields::new()
            .with("id", json!(self.id))
            .with("quantity", json!(self.quantity))
            .with("total", json!(self.total))
            .with("status", json!(self.status))
            .with("customer", FieldValue::Entity(customer))
            .with("product", FieldValue::Entity(product)))
    }
}
