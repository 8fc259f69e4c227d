use super::Storage;
use crate::entities::{
    CartItemModel, CategoryModel, Identity, OrderItemModel, OrderModel, ProductModel,
};
use crate::errors::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory storage backend.
///
/// All tables live behind one mutex, which is what makes the cart upsert
/// and the order-plus-cart-clear write atomic here without a transaction
/// machinery. The lock is never held across an await point.
#[derive(Clone)]
pub struct MemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, ProductModel>,
    categories: HashMap<Uuid, CategoryModel>,
    cart_items: HashMap<Uuid, CartItemModel>,
    orders: HashMap<Uuid, OrderModel>,
    order_items: HashMap<Uuid, OrderItemModel>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_oldest_first(mut products: Vec<ProductModel>) -> Vec<ProductModel> {
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    products
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_oldest_first(tables.products.values().cloned().collect()))
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.products.get(&id).cloned())
    }

    async fn list_featured_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_oldest_first(
            tables
                .products
                .values()
                .filter(|p| p.is_featured)
                .cloned()
                .collect(),
        ))
    }

    async fn list_new_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_oldest_first(
            tables
                .products
                .values()
                .filter(|p| p.is_new)
                .cloned()
                .collect(),
        ))
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(sorted_oldest_first(
            tables
                .products
                .values()
                .filter(|p| p.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn search_products(&self, term: &str) -> Result<Vec<ProductModel>, StorageError> {
        let needle = term.to_lowercase();
        let tables = self.tables.lock().unwrap();
        Ok(sorted_oldest_first(
            tables
                .products
                .values()
                .filter(|p| {
                    p.name.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn insert_product(&self, product: ProductModel) -> Result<ProductModel, StorageError> {
        let mut tables = self.tables.lock().unwrap();
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let mut categories: Vec<_> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .categories
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn insert_category(
        &self,
        category: CategoryModel,
    ) -> Result<CategoryModel, StorageError> {
        let mut tables = self.tables.lock().unwrap();
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_cart_items(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CartItemModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<_> = tables
            .cart_items
            .values()
            .filter(|item| item.matches_identity(identity))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn list_cart_items_with_products(
        &self,
        identity: &Identity,
    ) -> Result<Vec<(CartItemModel, ProductModel)>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<_> = tables
            .cart_items
            .values()
            .filter(|item| item.matches_identity(identity))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        // Lines whose product has vanished are dropped, not surfaced
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let product = tables.products.get(&item.product_id).cloned()?;
                Some((item, product))
            })
            .collect())
    }

    async fn upsert_cart_item(
        &self,
        identity: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, StorageError> {
        let mut tables = self.tables.lock().unwrap();

        if let Some(existing) = tables
            .cart_items
            .values_mut()
            .find(|item| item.matches_identity(identity) && item.product_id == product_id)
        {
            existing.quantity += quantity;
            return Ok(existing.clone());
        }

        let item = CartItemModel {
            id: Uuid::new_v4(),
            user_id: identity.user_id(),
            session_id: identity.session_id().map(str::to_string),
            product_id,
            quantity,
            created_at: chrono::Utc::now(),
        };
        tables.cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_cart_item(&self, id: Uuid) -> Result<Option<CartItemModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.cart_items.get(&id).cloned())
    }

    async fn set_cart_item_quantity(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, StorageError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.cart_items.get_mut(&id).map(|item| {
            item.quantity = quantity;
            item.clone()
        }))
    }

    async fn delete_cart_item(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.cart_items.remove(&id).is_some())
    }

    async fn clear_cart(&self, identity: &Identity) -> Result<u64, StorageError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|_, item| !item.matches_identity(identity));
        Ok((before - tables.cart_items.len()) as u64)
    }

    async fn place_order(
        &self,
        order: OrderModel,
        items: Vec<OrderItemModel>,
    ) -> Result<OrderModel, StorageError> {
        // One lock scope covers the order insert, the item inserts and the
        // cart clear, so a reader never observes a half-placed order.
        let mut tables = self.tables.lock().unwrap();

        let owner = match (order.user_id, order.session_id.as_deref()) {
            (Some(user_id), _) => Identity::User(user_id),
            (None, Some(session_id)) => Identity::Session(session_id.to_string()),
            (None, None) => {
                return Err(StorageError::Backend(
                    "order carries neither user_id nor session_id".to_string(),
                ))
            }
        };

        tables.orders.insert(order.id, order.clone());
        for item in items {
            tables.order_items.insert(item.id, item);
        }
        tables
            .cart_items
            .retain(|_, item| !item.matches_identity(&owner));

        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.orders.get(&id).cloned())
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let mut orders: Vec<_> = tables
            .orders
            .values()
            .filter(|order| match identity {
                Identity::User(user_id) => order.user_id == Some(*user_id),
                Identity::Session(session_id) => {
                    order.user_id.is_none() && order.session_id.as_deref() == Some(session_id)
                }
            })
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let mut items: Vec<_> = tables
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
