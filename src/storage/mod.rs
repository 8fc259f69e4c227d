pub mod database;
pub mod memory;

pub use database::DatabaseStorage;
pub use memory::MemoryStorage;

use crate::entities::{
    CartItemModel, CategoryModel, Identity, OrderItemModel, OrderModel, ProductModel,
};
use crate::errors::StorageError;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence port for the storefront. Two implementations exist: an
/// in-memory table set for development and tests, and a SeaORM-backed
/// store for durable deployments. Which one backs the running server is
/// a configuration choice; services only ever see this trait.
///
/// Store methods carry no business validation. Quantity floors, empty-cart
/// rules and the like are enforced by the service layer.
#[async_trait]
pub trait Storage: Send + Sync {
    // ---- Catalog ----

    /// All products, oldest first.
    async fn list_products(&self) -> Result<Vec<ProductModel>, StorageError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductModel>, StorageError>;

    /// Products flagged as featured.
    async fn list_featured_products(&self) -> Result<Vec<ProductModel>, StorageError>;

    /// Products flagged as new arrivals.
    async fn list_new_products(&self) -> Result<Vec<ProductModel>, StorageError>;

    /// Products whose category slug equals `category` exactly.
    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductModel>, StorageError>;

    /// Case-insensitive substring match against product name and
    /// description. No ranking.
    async fn search_products(&self, term: &str) -> Result<Vec<ProductModel>, StorageError>;

    /// Inserts a product row. Used at seed time and by tests.
    async fn insert_product(&self, product: ProductModel) -> Result<ProductModel, StorageError>;

    async fn list_categories(&self) -> Result<Vec<CategoryModel>, StorageError>;

    /// Looks a category up by its unique slug.
    async fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryModel>, StorageError>;

    /// Inserts a category row. Used at seed time and by tests.
    async fn insert_category(
        &self,
        category: CategoryModel,
    ) -> Result<CategoryModel, StorageError>;

    // ---- Cart ----

    /// Cart lines for one identity, oldest first.
    async fn list_cart_items(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CartItemModel>, StorageError>;

    /// Cart lines joined with their products. Lines whose product no
    /// longer resolves are dropped from the result.
    async fn list_cart_items_with_products(
        &self,
        identity: &Identity,
    ) -> Result<Vec<(CartItemModel, ProductModel)>, StorageError>;

    /// Atomic add-or-increment for one (identity, product) cart line.
    /// Concurrent calls must sum their quantities, never lose one.
    async fn upsert_cart_item(
        &self,
        identity: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, StorageError>;

    async fn get_cart_item(&self, id: Uuid) -> Result<Option<CartItemModel>, StorageError>;

    /// Overwrites the quantity of one cart line. Returns `None` when the
    /// line does not exist. The store applies whatever value it is given.
    async fn set_cart_item_quantity(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, StorageError>;

    /// Removes one cart line. Returns whether a row was deleted.
    async fn delete_cart_item(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Removes every cart line for one identity. Returns the row count.
    async fn clear_cart(&self, identity: &Identity) -> Result<u64, StorageError>;

    // ---- Orders ----

    /// Persists an order, its line items, and clears the owning
    /// identity's cart in one atomic unit. Either all of it becomes
    /// visible or none of it does.
    async fn place_order(
        &self,
        order: OrderModel,
        items: Vec<OrderItemModel>,
    ) -> Result<OrderModel, StorageError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderModel>, StorageError>;

    /// Orders for one identity, newest first.
    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderModel>, StorageError>;

    /// Line items of one order, oldest first.
    async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, StorageError>;

    // ---- Health ----

    /// Verifies the backing store is reachable.
    async fn ping(&self) -> Result<(), StorageError>;
}
