use crate::entities::{CartItemModel, Identity, ProductModel};
use crate::errors::ServiceError;
use crate::storage::Storage;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Shopping cart service.
///
/// All operations are scoped by [`Identity`]: an authenticated user id
/// when one is present, otherwise the anonymous session id from the
/// visitor's cookie. Quantity rules live here, not in the stores; the
/// storage port applies whatever it is told.
#[derive(Clone)]
pub struct CartService {
    storage: Arc<dyn Storage>,
}

impl CartService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Assembles the cart view for one identity: each line joined with
    /// its product, the rolled-up total, and the line count.
    ///
    /// `total` is the sum of `product.price * quantity` over all lines,
    /// rounded to 2 decimal places. `count` is the number of lines, not
    /// the number of units.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, identity: &Identity) -> Result<CartView, ServiceError> {
        let lines = self.storage.list_cart_items_with_products(identity).await?;

        let total: Decimal = lines
            .iter()
            .map(|(item, product)| product.price * Decimal::from(item.quantity))
            .sum();

        let items: Vec<CartLine> = lines
            .into_iter()
            .map(|(cart_item, product)| CartLine { cart_item, product })
            .collect();

        Ok(CartView {
            count: items.len(),
            total: total.round_dp(2),
            items,
        })
    }

    /// Adds a product to the cart, or increments the existing line for
    /// the same product. The add-or-increment step is a single atomic
    /// operation in the store; two concurrent adds both land.
    ///
    /// # Returns
    ///
    /// * `Ok(CartItemModel)` - The created or updated line
    /// * `Err(ServiceError::ValidationError)` - Quantity below 1, or the
    ///   product id does not resolve in the catalog
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        identity: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        // The product must resolve before we touch the cart
        if self.storage.get_product(product_id).await?.is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Product {} does not exist",
                product_id
            )));
        }

        let item = self
            .storage
            .upsert_cart_item(identity, product_id, quantity)
            .await?;

        info!(
            "Cart line for {} now at quantity {} ({})",
            product_id, item.quantity, identity
        );
        Ok(item)
    }

    /// Overwrites the quantity of one cart line.
    ///
    /// Quantities below 1 are rejected and the line is left untouched.
    /// Clients that want remove-on-zero semantics call the delete
    /// operation instead; this service never removes a line implicitly.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        self.storage
            .set_cart_item_quantity(item_id, quantity)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))
    }

    /// Removes one cart line.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The line existed and is gone
    /// * `Err(ServiceError::NotFound)` - No such line
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        if self.storage.delete_cart_item(item_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Cart item {} not found",
                item_id
            )))
        }
    }

    /// Empties the identity's cart. Clearing an already empty cart is
    /// not an error.
    #[instrument(skip(self))]
    pub async fn clear(&self, identity: &Identity) -> Result<u64, ServiceError> {
        let removed = self.storage.clear_cart(identity).await?;
        info!("Cleared {} cart line(s) for {}", removed, identity);
        Ok(removed)
    }
}

/// One cart line joined with its product
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub cart_item: CartItemModel,
    pub product: ProductModel,
}

/// Cart contents as served to clients
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    /// Sum of price x quantity over all lines, rounded to 2 decimals
    #[schema(value_type = f64, example = 45.0)]
    pub total: Decimal,
    /// Number of lines, not units
    pub count: usize,
}
