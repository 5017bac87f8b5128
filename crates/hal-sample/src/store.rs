//! In-memory records for users, products and orders.
//!
//! Ids are assigned sequentially per table, starting at 1. Orders snapshot the
//! customer and the product at the time they are placed.

use crate::error::StoreError;
use crate::model::{
    Catalog, Order, OrderCreate, OrderId, Product, ProductCreate, ProductId, User, UserCreate, UserId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct Store {
    users: BTreeMap<UserId, Arc<User>>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Arc<Order>>,
    next_user: u32,
    next_product: u32,
    next_order: u32,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(&mut self, params: UserCreate) -> Result<UserId, StoreError> {
        if params.name.trim().is_empty() {
            return Err(StoreError::Validation("user name must not be empty".into()));
        }
        if !params.email.contains('@') {
            return Err(StoreError::Validation(format!("invalid email: {}", params.email)));
        }
        self.next_user += 1;
        let id = UserId(self.next_user);
        self.users.insert(id, Arc::new(User::new(id, params.name, params.email)));
        info!(user_id = %id, "User created");
        Ok(id)
    }

    pub fn create_product(&mut self, params: ProductCreate) -> Result<ProductId, StoreError> {
        if !(params.price.is_finite() && params.price >= 0.0) {
            return Err(StoreError::Validation(format!("invalid price: {}", params.price)));
        }
        self.next_product += 1;
        let id = ProductId(self.next_product);
        self.products
            .insert(id, Product::new(id, params.name, params.price, params.quantity));
        info!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Validates the customer and the stock, then reserves the quantity.
    pub fn place_order(&mut self, params: OrderCreate) -> Result<OrderId, StoreError> {
        if params.quantity == 0 {
            return Err(StoreError::Validation("quantity must be positive".into()));
        }
        let customer = self.user(params.user_id)?;
        let product = self
            .products
            .get_mut(&params.product_id)
            .ok_or(StoreError::ProductNotFound(params.product_id))?;

        if product.quantity < params.quantity {
            warn!(
                product_id = %product.id,
                requested = params.quantity,
                available = product.quantity,
                "Insufficient stock"
            );
            return Err(StoreError::InsufficientStock {
                product: product.id,
                requested: params.quantity,
                available: product.quantity,
            });
        }
        product.quantity -= params.quantity;
        debug!(product_id = %product.id, remaining = product.quantity, "Stock reserved");

        self.next_order += 1;
        let id = OrderId(self.next_order);
        let order = Order::new(id, customer, Arc::new(product.clone()), params.quantity);
        self.orders.insert(id, Arc::new(order));
        info!(order_id = %id, "Order placed");
        Ok(id)
    }

    pub fn user(&self, id: UserId) -> Result<Arc<User>, StoreError> {
        self.users.get(&id).cloned().ok_or(StoreError::UserNotFound(id))
    }

    pub fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.products.get(&id).cloned().ok_or(StoreError::ProductNotFound(id))
    }

    pub fn order(&self, id: OrderId) -> Result<Arc<Order>, StoreError> {
        self.orders.get(&id).cloned().ok_or(StoreError::OrderNotFound(id))
    }

    /// All products, ordered by id.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.products.values().cloned().map(Arc::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Store, UserId, ProductId) {
        let mut store = Store::new();
        let user = store
            .create_user(UserCreate {
                name: "Alice".into(),
                email: "alice@example.com".into(),
            })
            .unwrap();
        let product = store
            .create_product(ProductCreate {
                name: "Widget".into(),
                price: 2.5,
                quantity: 10,
            })
            .unwrap();
        (store, user, product)
    }

    #[test]
    fn ids_are_sequential() {
        let (mut store, user, product) = seeded();
        assert_eq!(user, UserId(1));
        assert_eq!(product, ProductId(1));
        let second = store
            .create_user(UserCreate {
                name: "Bob".into(),
                email: "bob@example.com".into(),
            })
            .unwrap();
        assert_eq!(second, UserId(2));
    }

    #[test]
    fn order_reserves_stock() {
        let (mut store, user, product) = seeded();
        let order = store
            .place_order(OrderCreate {
                user_id: user,
                product_id: product,
                quantity: 4,
            })
            .unwrap();

        assert_eq!(store.product(product).unwrap().quantity, 6);
        let order = store.order(order).unwrap();
        assert_eq!(order.total, 10.0);
        assert_eq!(order.product.quantity, 6);
    }

    #[test]
    fn order_rejects_insufficient_stock() {
        let (mut store, user, product) = seeded();
        let err = store
            .place_order(OrderCreate {
                user_id: user,
                product_id: product,
                quantity: 11,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { requested: 11, available: 10, .. }
        ));
        assert_eq!(store.product(product).unwrap().quantity, 10);
    }

    #[test]
    fn order_requires_known_user() {
        let (mut store, _, product) = seeded();
        let err = store
            .place_order(OrderCreate {
                user_id: UserId(42),
                product_id: product,
                quantity: 1,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(UserId(42))));
    }

    #[test]
    fn invalid_input_is_rejected() {
        let mut store = Store::new();
        assert!(matches!(
            store.create_user(UserCreate {
                name: "".into(),
                email: "a@b".into()
            }),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.create_product(ProductCreate {
                name: "Broken".into(),
                price: -1.0,
                quantity: 1
            }),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn catalog_lists_products_in_id_order() {
        let (mut store, _, _) = seeded();
        store
            .create_product(ProductCreate {
                name: "Gadget".into(),
                price: 1.0,
                quantity: 1,
            })
            .unwrap();
        let names: Vec<_> = store.catalog().products.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Widget", "Gadget"]);
    }
}
