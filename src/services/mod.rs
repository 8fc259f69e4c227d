pub mod cart;
pub mod catalog;
pub mod checkout;

pub use cart::{CartService, CartView};
pub use catalog::{CatalogService, CreateCategoryInput, CreateProductInput};
pub use checkout::{CheckoutService, ShippingInfo};
