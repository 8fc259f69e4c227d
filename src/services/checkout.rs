use crate::entities::{Identity, OrderItemModel, OrderModel, OrderStatus, PaymentMethod};
use crate::errors::ServiceError;
use crate::storage::Storage;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Checkout orchestrator: converts the current cart for an identity into
/// an order.
///
/// The orchestration reads the cart, prices it, and hands the assembled
/// order plus line items to the storage port's atomic `place_order`.
/// Either the order, all of its lines, and the cart clear become visible
/// together, or none of them do. A storage failure here aborts the whole
/// checkout and is reported to the caller; nothing is retried and no
/// fabricated success is ever returned.
#[derive(Clone)]
pub struct CheckoutService {
    storage: Arc<dyn Storage>,
}

impl CheckoutService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Places an order from the identity's cart.
    ///
    /// Line prices are captured from the product's price at this moment;
    /// later catalog price changes never alter a placed order. The total
    /// is the sum of price x quantity over all lines, rounded to 2
    /// decimal places.
    ///
    /// # Returns
    ///
    /// * `Ok(OrderModel)` - The placed order, status `pending`
    /// * `Err(ServiceError::EmptyCart)` - The cart has no lines; a
    ///   zero-line order is never created
    #[instrument(skip(self, shipping))]
    pub async fn checkout(
        &self,
        identity: &Identity,
        shipping: &ShippingInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderModel, ServiceError> {
        let lines = self.storage.list_cart_items_with_products(identity).await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let total: Decimal = lines
            .iter()
            .map(|(item, product)| product.price * Decimal::from(item.quantity))
            .sum();
        let total = total.round_dp(2);

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let address = shipping.postal_address();

        let order = OrderModel {
            id: order_id,
            user_id: identity.user_id(),
            session_id: identity.session_id().map(str::to_string),
            total_amount: total,
            status: OrderStatus::Pending,
            shipping_address: address.clone(),
            billing_address: address,
            payment_method,
            created_at: now,
        };

        let items: Vec<OrderItemModel> = lines
            .into_iter()
            .map(|(line, product)| OrderItemModel {
                id: Uuid::new_v4(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: product.price,
                created_at: now,
            })
            .collect();

        let order = self.storage.place_order(order, items).await?;

        info!(
            "Placed order {} for {} with total {}",
            order.id, identity, order.total_amount
        );
        Ok(order)
    }

    /// Fetches a placed order.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<OrderModel, ServiceError> {
        self.storage
            .get_order(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    /// Orders placed by one identity, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, identity: &Identity) -> Result<Vec<OrderModel>, ServiceError> {
        Ok(self.storage.list_orders(identity).await?)
    }

    /// Line items of one placed order, oldest first.
    #[instrument(skip(self))]
    pub async fn list_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, ServiceError> {
        if self.storage.get_order(order_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Order {} not found",
                order_id
            )));
        }
        Ok(self.storage.list_order_items(order_id).await?)
    }
}

/// Shipping details collected at checkout
#[derive(Clone, Debug)]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Single-line postal form used for both shipping and billing
    pub fn postal_address(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address, self.city, self.zip_code, self.country
        )
    }
}
