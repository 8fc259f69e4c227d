use super::Storage;
use crate::entities::{
    cart_item, category, order, order_item, product, CartItem, CartItemModel, Category,
    CategoryModel, Identity, Order, OrderItem, OrderItemModel, OrderModel, Product, ProductModel,
};
use crate::errors::StorageError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

/// SeaORM-backed storage. Works against Postgres and SQLite through the
/// same code paths; the cart upsert relies on a relational atomic
/// increment plus the unique (owner, product) indexes, and checkout runs
/// in a single transaction.
#[derive(Clone)]
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn cart_owner_condition(identity: &Identity) -> Condition {
    match identity {
        Identity::User(user_id) => Condition::all().add(cart_item::Column::UserId.eq(*user_id)),
        Identity::Session(session_id) => {
            Condition::all().add(cart_item::Column::SessionId.eq(session_id.clone()))
        }
    }
}

fn order_owner_condition(identity: &Identity) -> Condition {
    match identity {
        Identity::User(user_id) => Condition::all().add(order::Column::UserId.eq(*user_id)),
        Identity::Session(session_id) => Condition::all()
            .add(order::Column::UserId.is_null())
            .add(order::Column::SessionId.eq(session_id.clone())),
    }
}

fn product_to_active(p: ProductModel) -> product::ActiveModel {
    product::ActiveModel {
        id: Set(p.id),
        name: Set(p.name),
        description: Set(p.description),
        price: Set(p.price),
        compare_price: Set(p.compare_price),
        image_url: Set(p.image_url),
        category: Set(p.category),
        rating: Set(p.rating),
        review_count: Set(p.review_count),
        in_stock: Set(p.in_stock),
        is_new: Set(p.is_new),
        is_featured: Set(p.is_featured),
        created_at: Set(p.created_at),
    }
}

fn category_to_active(c: CategoryModel) -> category::ActiveModel {
    category::ActiveModel {
        id: Set(c.id),
        name: Set(c.name),
        display_name: Set(c.display_name),
        description: Set(c.description),
        image_url: Set(c.image_url),
        icon: Set(c.icon),
    }
}

fn order_to_active(o: OrderModel) -> order::ActiveModel {
    order::ActiveModel {
        id: Set(o.id),
        user_id: Set(o.user_id),
        session_id: Set(o.session_id),
        total_amount: Set(o.total_amount),
        status: Set(o.status),
        shipping_address: Set(o.shipping_address),
        billing_address: Set(o.billing_address),
        payment_method: Set(o.payment_method),
        created_at: Set(o.created_at),
    }
}

fn order_item_to_active(i: OrderItemModel) -> order_item::ActiveModel {
    order_item::ActiveModel {
        id: Set(i.id),
        order_id: Set(i.order_id),
        product_id: Set(i.product_id),
        quantity: Set(i.quantity),
        price: Set(i.price),
        created_at: Set(i.created_at),
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn list_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        Ok(Product::find()
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<ProductModel>, StorageError> {
        Ok(Product::find_by_id(id).one(&self.db).await?)
    }

    async fn list_featured_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        Ok(Product::find()
            .filter(product::Column::IsFeatured.eq(true))
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_new_products(&self) -> Result<Vec<ProductModel>, StorageError> {
        Ok(Product::find()
            .filter(product::Column::IsNew.eq(true))
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductModel>, StorageError> {
        Ok(Product::find()
            .filter(product::Column::Category.eq(category))
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn search_products(&self, term: &str) -> Result<Vec<ProductModel>, StorageError> {
        // lower() on both sides keeps the match case-insensitive on
        // Postgres as well as SQLite
        let pattern = format!("%{}%", term.to_lowercase());
        let matches = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern.clone()))
            .add(Expr::expr(Func::lower(Expr::col(product::Column::Description))).like(pattern));

        Ok(Product::find()
            .filter(matches)
            .order_by_asc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn insert_product(&self, product: ProductModel) -> Result<ProductModel, StorageError> {
        Ok(product_to_active(product).insert(&self.db).await?)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryModel>, StorageError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?)
    }

    async fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<CategoryModel>, StorageError> {
        Ok(Category::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    async fn insert_category(
        &self,
        category: CategoryModel,
    ) -> Result<CategoryModel, StorageError> {
        Ok(category_to_active(category).insert(&self.db).await?)
    }

    async fn list_cart_items(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CartItemModel>, StorageError> {
        Ok(CartItem::find()
            .filter(cart_owner_condition(identity))
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_cart_items_with_products(
        &self,
        identity: &Identity,
    ) -> Result<Vec<(CartItemModel, ProductModel)>, StorageError> {
        let rows = CartItem::find()
            .filter(cart_owner_condition(identity))
            .find_also_related(Product)
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .all(&self.db)
            .await?;

        // Lines whose product has vanished are dropped, not surfaced
        Ok(rows
            .into_iter()
            .filter_map(|(item, product)| product.map(|p| (item, p)))
            .collect())
    }

    async fn upsert_cart_item(
        &self,
        identity: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, StorageError> {
        let owner = cart_owner_condition(identity);

        // Atomic increment first; the common case is an existing line
        let updated = CartItem::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).add(quantity),
            )
            .filter(owner.clone())
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        if updated.rows_affected == 0 {
            let fresh = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(identity.user_id()),
                session_id: Set(identity.session_id().map(str::to_string)),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(Utc::now()),
            };

            match fresh.insert(&self.db).await {
                Ok(item) => return Ok(item),
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    // Lost the insert race to a concurrent add; fold this
                    // quantity into the winner's row instead
                    CartItem::update_many()
                        .col_expr(
                            cart_item::Column::Quantity,
                            Expr::col(cart_item::Column::Quantity).add(quantity),
                        )
                        .filter(owner.clone())
                        .filter(cart_item::Column::ProductId.eq(product_id))
                        .exec(&self.db)
                        .await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        CartItem::find()
            .filter(owner)
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| StorageError::Backend("cart line vanished during upsert".to_string()))
    }

    async fn get_cart_item(&self, id: Uuid) -> Result<Option<CartItemModel>, StorageError> {
        Ok(CartItem::find_by_id(id).one(&self.db).await?)
    }

    async fn set_cart_item_quantity(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, StorageError> {
        let Some(item) = CartItem::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        Ok(Some(active.update(&self.db).await?))
    }

    async fn delete_cart_item(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = CartItem::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_cart(&self, identity: &Identity) -> Result<u64, StorageError> {
        let result = CartItem::delete_many()
            .filter(cart_owner_condition(identity))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn place_order(
        &self,
        order: OrderModel,
        items: Vec<OrderItemModel>,
    ) -> Result<OrderModel, StorageError> {
        let owner = match (order.user_id, order.session_id.as_deref()) {
            (Some(user_id), _) => Identity::User(user_id),
            (None, Some(session_id)) => Identity::Session(session_id.to_string()),
            (None, None) => {
                return Err(StorageError::Backend(
                    "order carries neither user_id nor session_id".to_string(),
                ))
            }
        };

        // Order row, line items and the cart clear commit together or
        // not at all; a half-placed order must never be observable
        let txn = self.db.begin().await?;

        let placed = order_to_active(order).insert(&txn).await?;
        for item in items {
            order_item_to_active(item).insert(&txn).await?;
        }
        CartItem::delete_many()
            .filter(cart_owner_condition(&owner))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(placed)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderModel>, StorageError> {
        Ok(Order::find_by_id(id).one(&self.db).await?)
    }

    async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderModel>, StorageError> {
        Ok(Order::find()
            .filter(order_owner_condition(identity))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, StorageError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .order_by_asc(order_item::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(self.db.ping().await?)
    }
}
