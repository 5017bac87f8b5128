//! # HAL Store Sample
//!
//! A runnable tour of the HAL framework over an in-memory store.
//!
//! ## Core Components
//!
//! - **`model`**: Pure data structures ([`User`](hal_sample::model::User), [`Product`](hal_sample::model::Product), [`Order`](hal_sample::model::Order)) implementing [`Entity`](hal_framework::Entity).
//! - **`store`**: Sequential ids, stock checks and order placement.
//! - **`lifecycle`**: [`StoreSystem`], which loads `config/hal.json` and answers with HAL or Problem payloads.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p hal-sample
//! ```
//!
//! The binary creates a user and two products, places an order, then prints
//! the order, the catalog and a few failing requests.

use hal_framework::tracing::setup_tracing;
use hal_framework::HalResponse;
use hal_sample::error::StoreError;
use hal_sample::lifecycle::StoreSystem;
use hal_sample::model::{OrderCreate, ProductCreate, ProductId, UserCreate, UserId};
use tracing::info;

fn main() -> Result<(), StoreError> {
    setup_tracing();

    info!("Starting HAL store sample");
    let mut system = StoreSystem::new()?;

    print("POST /users", &system.create_user(UserCreate {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    }))?;

    for (name, price, quantity) in [("Super Widget", 25.5, 100), ("Gizmo", 4.0, 3)] {
        print("POST /products", &system.create_product(ProductCreate {
            name: name.to_string(),
            price,
            quantity,
        }))?;
    }

    print("POST /orders", &system.create_order(OrderCreate {
        user_id: UserId(1),
        product_id: ProductId(1),
        quantity: 5,
    }))?;

    print("GET /products?page=1", &system.list_products(1, 1))?;
    print("GET /products?page=2", &system.list_products(2, 1))?;
    print("GET /products?page=9", &system.list_products(9, 1))?;

    print("POST /orders (too many)", &system.create_order(OrderCreate {
        user_id: UserId(1),
        product_id: ProductId(2),
        quantity: 50,
    }))?;
    print("GET /users/7", &system.get_user(UserId(7)))?;

    info!("Sample finished");
    Ok(())
}

fn print(request: &str, response: &HalResponse) -> Result<(), StoreError> {
    println!("{request} -> {} {}", response.status, response.content_type);
    println!("{}\n", response.to_json_string()?);
    Ok(())
}
