//! Contract tests run against every storage backend.
//!
//! Both the in-memory store and the SeaORM/SQLite store must satisfy the
//! same observable behavior: cart upserts merge per (identity, product),
//! concurrent adds sum, checkout writes are atomic, and reads are scoped
//! to their identity.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use storefront_api::db::{self, DbConfig};
use storefront_api::entities::{
    CategoryModel, Identity, OrderItemModel, OrderModel, OrderStatus, PaymentMethod, ProductModel,
};
use storefront_api::storage::{DatabaseStorage, MemoryStorage, Storage};
use uuid::Uuid;

async fn sqlite_storage() -> Arc<dyn Storage> {
    let cfg = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(600),
        acquire_timeout: Duration::from_secs(5),
    };
    let pool = db::establish_connection_with_config(&cfg)
        .await
        .expect("open sqlite test database");
    db::run_migrations(&pool)
        .await
        .expect("run migrations for contract tests");
    Arc::new(DatabaseStorage::new(pool))
}

async fn backends() -> Vec<(&'static str, Arc<dyn Storage>)> {
    vec![
        ("memory", Arc::new(MemoryStorage::new()) as Arc<dyn Storage>),
        ("database", sqlite_storage().await),
    ]
}

fn product(name: &str, price: Decimal) -> ProductModel {
    ProductModel {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        compare_price: None,
        image_url: "/images/test.jpg".to_string(),
        category: "electronics".to_string(),
        rating: 0.0,
        review_count: 0,
        in_stock: true,
        is_new: false,
        is_featured: false,
        created_at: Utc::now(),
    }
}

fn order_for(identity: &Identity, total: Decimal) -> OrderModel {
    OrderModel {
        id: Uuid::new_v4(),
        user_id: identity.user_id(),
        session_id: identity.session_id().map(str::to_string),
        total_amount: total,
        status: OrderStatus::Pending,
        shipping_address: "1 Main St, Springfield, 12345, USA".to_string(),
        billing_address: "1 Main St, Springfield, 12345, USA".to_string(),
        payment_method: PaymentMethod::CreditCard,
        created_at: Utc::now(),
    }
}

fn order_item(order_id: Uuid, product_id: Uuid, quantity: i32, price: Decimal) -> OrderItemModel {
    OrderItemModel {
        id: Uuid::new_v4(),
        order_id,
        product_id,
        quantity,
        price,
        created_at: Utc::now(),
    }
}

// ==================== Cart Upsert Tests ====================

#[tokio::test]
async fn repeated_adds_merge_into_one_cart_line() {
    for (backend, storage) in backends().await {
        let identity = Identity::Session("shopper-1".to_string());
        let item = storage.insert_product(product("Desk", dec!(120.00))).await.unwrap();

        storage.upsert_cart_item(&identity, item.id, 1).await.unwrap();
        let merged = storage.upsert_cart_item(&identity, item.id, 2).await.unwrap();

        assert_eq!(merged.quantity, 3, "backend: {}", backend);
        let lines = storage.list_cart_items(&identity).await.unwrap();
        assert_eq!(lines.len(), 1, "backend: {}", backend);
        assert_eq!(lines[0].quantity, 3, "backend: {}", backend);
    }
}

#[tokio::test]
async fn concurrent_adds_sum_their_quantities() {
    for (backend, storage) in backends().await {
        let identity = Identity::Session("shopper-racy".to_string());
        let item = storage.insert_product(product("Lamp", dec!(35.00))).await.unwrap();

        let first = {
            let storage = storage.clone();
            let identity = identity.clone();
            let product_id = item.id;
            tokio::spawn(async move { storage.upsert_cart_item(&identity, product_id, 1).await })
        };
        let second = {
            let storage = storage.clone();
            let identity = identity.clone();
            let product_id = item.id;
            tokio::spawn(async move { storage.upsert_cart_item(&identity, product_id, 1).await })
        };

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let lines = storage.list_cart_items(&identity).await.unwrap();
        assert_eq!(lines.len(), 1, "backend: {}", backend);
        assert_eq!(
            lines[0].quantity, 2,
            "a concurrent add must never be lost (backend: {})",
            backend
        );
    }
}

#[tokio::test]
async fn cart_lines_are_scoped_to_their_identity() {
    for (backend, storage) in backends().await {
        let user = Identity::User(Uuid::new_v4());
        let session = Identity::Session("shopper-2".to_string());
        let other_session = Identity::Session("shopper-3".to_string());
        let item = storage.insert_product(product("Chair", dec!(60.00))).await.unwrap();

        storage.upsert_cart_item(&user, item.id, 1).await.unwrap();
        storage.upsert_cart_item(&session, item.id, 2).await.unwrap();

        assert_eq!(storage.list_cart_items(&user).await.unwrap().len(), 1, "backend: {}", backend);
        let session_lines = storage.list_cart_items(&session).await.unwrap();
        assert_eq!(session_lines.len(), 1, "backend: {}", backend);
        assert_eq!(session_lines[0].quantity, 2, "backend: {}", backend);
        assert!(
            storage.list_cart_items(&other_session).await.unwrap().is_empty(),
            "backend: {}",
            backend
        );
    }
}

#[tokio::test]
async fn set_quantity_overwrites_and_reports_missing_lines() {
    for (backend, storage) in backends().await {
        let identity = Identity::Session("shopper-4".to_string());
        let item = storage.insert_product(product("Rug", dec!(80.00))).await.unwrap();
        let line = storage.upsert_cart_item(&identity, item.id, 2).await.unwrap();

        let updated = storage.set_cart_item_quantity(line.id, 7).await.unwrap();
        assert_eq!(updated.map(|l| l.quantity), Some(7), "backend: {}", backend);

        let missing = storage.set_cart_item_quantity(Uuid::new_v4(), 3).await.unwrap();
        assert!(missing.is_none(), "backend: {}", backend);
    }
}

#[tokio::test]
async fn delete_and_clear_report_what_they_removed() {
    for (backend, storage) in backends().await {
        let identity = Identity::Session("shopper-5".to_string());
        let a = storage.insert_product(product("Mug", dec!(8.00))).await.unwrap();
        let b = storage.insert_product(product("Bowl", dec!(12.00))).await.unwrap();

        let line = storage.upsert_cart_item(&identity, a.id, 1).await.unwrap();
        storage.upsert_cart_item(&identity, b.id, 1).await.unwrap();

        assert!(storage.delete_cart_item(line.id).await.unwrap(), "backend: {}", backend);
        assert!(!storage.delete_cart_item(line.id).await.unwrap(), "backend: {}", backend);

        assert_eq!(storage.clear_cart(&identity).await.unwrap(), 1, "backend: {}", backend);
        assert_eq!(storage.clear_cart(&identity).await.unwrap(), 0, "backend: {}", backend);
    }
}

// ==================== Checkout Atomicity Tests ====================

#[tokio::test]
async fn place_order_persists_everything_and_clears_the_cart() {
    for (backend, storage) in backends().await {
        let identity = Identity::Session("shopper-6".to_string());
        let a = storage.insert_product(product("Desk", dec!(10.00))).await.unwrap();
        let b = storage.insert_product(product("Lamp", dec!(25.00))).await.unwrap();

        storage.upsert_cart_item(&identity, a.id, 2).await.unwrap();
        storage.upsert_cart_item(&identity, b.id, 1).await.unwrap();

        let order = order_for(&identity, dec!(45.00));
        let order_id = order.id;
        let items = vec![
            order_item(order_id, a.id, 2, dec!(10.00)),
            order_item(order_id, b.id, 1, dec!(25.00)),
        ];

        let placed = storage.place_order(order, items).await.unwrap();
        assert_eq!(placed.id, order_id, "backend: {}", backend);

        let stored = storage.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, dec!(45.00), "backend: {}", backend);
        assert_eq!(stored.status, OrderStatus::Pending, "backend: {}", backend);

        let stored_items = storage.list_order_items(order_id).await.unwrap();
        assert_eq!(stored_items.len(), 2, "backend: {}", backend);

        assert!(
            storage.list_cart_items(&identity).await.unwrap().is_empty(),
            "cart must be empty after checkout (backend: {})",
            backend
        );

        let orders = storage.list_orders(&identity).await.unwrap();
        assert_eq!(orders.len(), 1, "backend: {}", backend);
    }
}

#[tokio::test]
async fn orders_are_scoped_and_listed_newest_first() {
    for (backend, storage) in backends().await {
        let buyer = Identity::Session("shopper-7".to_string());
        let stranger = Identity::Session("shopper-8".to_string());

        let mut older = order_for(&buyer, dec!(10.00));
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = order_for(&buyer, dec!(20.00));
        let newer_id = newer.id;

        storage.place_order(older, vec![]).await.unwrap();
        storage.place_order(newer, vec![]).await.unwrap();

        let orders = storage.list_orders(&buyer).await.unwrap();
        assert_eq!(orders.len(), 2, "backend: {}", backend);
        assert_eq!(orders[0].id, newer_id, "newest first (backend: {})", backend);

        assert!(
            storage.list_orders(&stranger).await.unwrap().is_empty(),
            "backend: {}",
            backend
        );
    }
}

// ==================== Catalog Tests ====================

#[tokio::test]
async fn search_matches_name_and_description_case_insensitively() {
    for (backend, storage) in backends().await {
        let mut desk = product("Walnut Desk", dec!(450.00));
        desk.description = "Solid walnut writing desk".to_string();
        let mut chair = product("Office Chair", dec!(150.00));
        chair.description = "Ergonomic chair with oak legs".to_string();
        storage.insert_product(desk).await.unwrap();
        storage.insert_product(chair).await.unwrap();

        let by_name = storage.search_products("wAlNuT").await.unwrap();
        assert_eq!(by_name.len(), 1, "backend: {}", backend);
        assert_eq!(by_name[0].name, "Walnut Desk", "backend: {}", backend);

        let by_description = storage.search_products("OAK").await.unwrap();
        assert_eq!(by_description.len(), 1, "backend: {}", backend);
        assert_eq!(by_description[0].name, "Office Chair", "backend: {}", backend);

        assert!(storage.search_products("zzz").await.unwrap().is_empty(), "backend: {}", backend);
    }
}

#[tokio::test]
async fn category_and_flag_listings_filter_exactly() {
    for (backend, storage) in backends().await {
        let mut desk = product("Desk", dec!(120.00));
        desk.category = "furniture".to_string();
        desk.is_featured = true;
        let mut phone = product("Phone", dec!(600.00));
        phone.is_new = true;
        storage.insert_product(desk).await.unwrap();
        storage.insert_product(phone).await.unwrap();

        let furniture = storage.list_products_by_category("furniture").await.unwrap();
        assert_eq!(furniture.len(), 1, "backend: {}", backend);
        assert_eq!(furniture[0].name, "Desk", "backend: {}", backend);

        let featured = storage.list_featured_products().await.unwrap();
        assert_eq!(featured.len(), 1, "backend: {}", backend);
        assert_eq!(featured[0].name, "Desk", "backend: {}", backend);

        let fresh = storage.list_new_products().await.unwrap();
        assert_eq!(fresh.len(), 1, "backend: {}", backend);
        assert_eq!(fresh[0].name, "Phone", "backend: {}", backend);
    }
}

#[tokio::test]
async fn categories_round_trip_by_slug() {
    for (backend, storage) in backends().await {
        let category = CategoryModel {
            id: Uuid::new_v4(),
            name: "electronics".to_string(),
            display_name: "Electronics".to_string(),
            description: Some("Phones, laptops and accessories".to_string()),
            image_url: None,
            icon: Some("bolt".to_string()),
        };
        storage.insert_category(category).await.unwrap();

        let found = storage.get_category_by_name("electronics").await.unwrap().unwrap();
        assert_eq!(found.display_name, "Electronics", "backend: {}", backend);
        assert!(
            storage.get_category_by_name("garden").await.unwrap().is_none(),
            "backend: {}",
            backend
        );
        assert_eq!(storage.list_categories().await.unwrap().len(), 1, "backend: {}", backend);
    }
}

#[tokio::test]
async fn ping_reports_reachable_backends() {
    for (backend, storage) in backends().await {
        assert!(storage.ping().await.is_ok(), "backend: {}", backend);
    }
}
