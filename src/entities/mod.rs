pub mod cart_item;
pub mod category;
pub mod order;
pub mod order_item;
pub mod product;

pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus, PaymentMethod};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use product::{Entity as Product, Model as ProductModel};

use uuid::Uuid;

/// The identity a cart or order is scoped to: exactly one of an
/// authenticated user id or an anonymous session id, never both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    User(Uuid),
    Session(String),
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User(id) => Some(*id),
            Identity::Session(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Identity::User(_) => None,
            Identity::Session(id) => Some(id),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::User(id) => write!(f, "user:{}", id),
            Identity::Session(id) => write!(f, "session:{}", id),
        }
    }
}
