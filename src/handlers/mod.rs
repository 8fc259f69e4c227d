pub mod cart;
pub mod categories;
pub mod checkout;
pub mod common;
pub mod contact;
pub mod products;

use crate::services::{CartService, CatalogService, CheckoutService};
use crate::storage::Storage;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    /// Build the services container on top of one shared storage backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(storage.clone())),
            cart: Arc::new(CartService::new(storage.clone())),
            checkout: Arc::new(CheckoutService::new(storage)),
        }
    }
}
