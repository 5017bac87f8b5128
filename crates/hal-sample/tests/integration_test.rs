use hal_framework::ContentType;
use hal_sample::lifecycle::StoreSystem;
use hal_sample::model::{OrderCreate, OrderId, ProductCreate, ProductId, UserCreate, UserId};
use serde_json::json;

/// A system with one user and the given products.
fn seeded(products: &[(&str, f64, u32)]) -> StoreSystem {
    let mut system = StoreSystem::new().expect("embedded configuration is valid");
    let response = system.create_user(UserCreate {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    });
    assert_eq!(response.status, 201);

    for (name, price, quantity) in products {
        let response = system.create_product(ProductCreate {
            name: name.to_string(),
            price: *price,
            quantity: *quantity,
        });
        assert_eq!(response.status, 201);
    }
    system
}

#[test]
fn test_user_is_rendered_without_private_fields() {
    let system = seeded(&[]);
    let response = system.get_user(UserId(1));

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, ContentType::HalJson);
    assert_eq!(
        response.body,
        json!({
            "id": 1,
            "name": "Alice",
            "_links": { "self": { "href": "http://localhost:8080/users/1" } }
        })
        .as_object()
        .cloned()
        .unwrap()
    );
}

#[test]
fn test_full_order_flow() {
    let mut system = seeded(&[("Super Widget", 25.5, 100)]);

    let response = system.create_order(OrderCreate {
        user_id: UserId(1),
        product_id: ProductId(1),
        quantity: 5,
    });
    assert_eq!(response.status, 201);

    let order = system.get_order(OrderId(1));
    assert_eq!(order.status, 200);
    let body = &order.body;
    assert_eq!(body["total"], json!(127.5));
    assert_eq!(body["status"], json!("Created"));
    assert!(body.get("customer").is_none());

    let links = &body["_links"];
    assert_eq!(links["self"]["href"], json!("http://localhost:8080/orders/1"));
    assert_eq!(links["customer"]["href"], json!("http://localhost:8080/users/1"));
    assert_eq!(links["product"]["href"], json!("http://localhost:8080/products/1"));
    assert_eq!(links["describedby"]["href"], json!("http://localhost:8080/docs/orders"));

    let customer = &body["_embedded"]["customer"];
    assert_eq!(customer["name"], json!("Alice"));
    assert!(customer.get("email").is_none());
    assert_eq!(customer["_links"]["self"]["href"], json!("http://localhost:8080/users/1"));

    let product = &body["_embedded"]["product"];
    assert_eq!(product["quantity"], json!(95));
    assert_eq!(product["_links"]["self"]["href"], json!("http://localhost:8080/products/1"));

    // stock was reserved
    let product = system.get_product(ProductId(1));
    assert_eq!(product.body["quantity"], json!(95));
}

#[test]
fn test_rejected_order_is_a_problem() {
    let mut system = seeded(&[("Gizmo", 4.0, 3)]);

    let response = system.create_order(OrderCreate {
        user_id: UserId(1),
        product_id: ProductId(1),
        quantity: 50,
    });

    assert_eq!(response.status, 422);
    assert_eq!(response.content_type, ContentType::ProblemJson);
    assert_eq!(response.body["title"], json!("Unprocessable Entity"));
    assert_eq!(response.body["httpStatus"], json!(422));
    assert_eq!(
        response.body["detail"],
        json!("Insufficient stock for product_1: requested 50, available 3")
    );
    assert_eq!(system.get_product(ProductId(1)).body["quantity"], json!(3));
}

#[test]
fn test_missing_records_are_404() {
    let system = seeded(&[]);

    let response = system.get_user(UserId(7));
    assert_eq!(response.status, 404);
    assert_eq!(response.content_type, ContentType::ProblemJson);
    assert_eq!(response.body["detail"], json!("User not found: user_7"));

    assert_eq!(system.get_order(OrderId(1)).status, 404);
    assert_eq!(system.get_product(ProductId(1)).status, 404);
}

#[test]
fn test_catalog_pages() {
    let system = seeded(&[("Widget", 1.0, 1), ("Gadget", 2.0, 2), ("Gizmo", 3.0, 3)]);

    let first = system.list_products(1, 2);
    assert_eq!(first.status, 200);
    assert_eq!(first.content_type, ContentType::HalJson);
    let links = &first.body["_links"];
    assert_eq!(links["self"]["href"], json!("http://localhost:8080/products"));
    assert_eq!(links["next"]["href"], json!("http://localhost:8080/products?page=2"));
    assert_eq!(links["last"]["href"], json!("http://localhost:8080/products?page=2"));
    assert_eq!(links["help"]["href"], json!("http://localhost:8080/docs/products"));
    assert!(links.get("prev").is_none());
    assert!(links.get("first").is_none());

    let items = first.body["_embedded"]["products"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], json!("Widget"));
    assert_eq!(items[1]["_links"]["self"]["href"], json!("http://localhost:8080/products/2"));

    let second = system.list_products(2, 2);
    let links = &second.body["_links"];
    assert_eq!(links["self"]["href"], json!("http://localhost:8080/products?page=2"));
    assert_eq!(links["prev"]["href"], json!("http://localhost:8080/products"));
    assert_eq!(links["first"]["href"], json!("http://localhost:8080/products"));
    assert!(links.get("next").is_none());
    assert_eq!(second.body["_embedded"]["products"].as_array().unwrap().len(), 1);
}

#[test]
fn test_catalog_page_out_of_range_is_409() {
    let system = seeded(&[("Widget", 1.0, 1)]);

    for page in [0, -1, 2] {
        let response = system.list_products(page, 10);
        assert_eq!(response.status, 409, "page {page}");
        assert_eq!(response.content_type, ContentType::ProblemJson);
        assert_eq!(response.body["detail"], json!("Invalid page provided"));
    }
}

#[test]
fn test_empty_catalog_has_only_self() {
    let system = seeded(&[]);
    let response = system.list_products(1, 10);

    assert_eq!(response.status, 200);
    assert!(response.body.get("_embedded").is_none());
    let links = response.body["_links"].as_object().unwrap();
    assert_eq!(links["self"]["href"], json!("http://localhost:8080/products"));
    assert!(!links.contains_key("next"));
}

#[test]
fn test_zero_page_size_is_rejected() {
    let system = seeded(&[("Widget", 1.0, 1)]);
    let response = system.list_products(1, 0);
    assert_eq!(response.status, 422);
}

#[test]
fn test_config_without_router_fails() {
    let err = StoreSystem::from_config_str(r#"{ "metadata_map": {} }"#).unwrap_err();
    assert_eq!(err.to_string(), "Invalid configuration: missing `router` section");
}
