use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront API

Backend for an e-commerce storefront: product catalog browsing, category
navigation, search, a session-scoped shopping cart, and a checkout that
turns the cart into an order.

## Features

- **Product Catalog**: Full listing plus featured, new-arrival, category and
  search views
- **Categories**: Category navigation with per-category product listings
- **Shopping Cart**: Session- or user-scoped cart with add, update, remove
  and clear; adding a product already in the cart increments its quantity
- **Checkout**: Validates shipping details, prices the cart at current
  catalog prices, and atomically creates the order, its line items, and
  clears the cart
- **Contact**: Contact form acknowledgement

## Sessions

No authentication is required. An anonymous session cookie is minted on
first contact and scopes the cart and orders. When an upstream layer
injects an authenticated user id, it takes precedence over the session.

## Error Handling

Errors use a consistent JSON shape with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "details": "quantity: must be at least 1",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-08-25T10:30:00Z"
}
```
        "#,
        contact(
            name = "Storefront Support",
            email = "support@storefront.example"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Categories", description = "Category navigation endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Checkout", description = "Checkout endpoint"),
        (name = "Contact", description = "Contact form endpoint")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::list_featured_products,
        crate::handlers::products::list_new_products,
        crate::handlers::products::search_products,
        crate::handlers::products::list_products_by_category,
        crate::handlers::products::get_product,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,

        // Cart
        crate::handlers::cart::get_cart,
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::update_cart_item,
        crate::handlers::cart::remove_cart_item,
        crate::handlers::cart::clear_cart,

        // Checkout
        crate::handlers::checkout::checkout,

        // Contact
        crate::handlers::contact::submit_contact,

        // Health and the service banner intentionally omitted
    ),
    components(
        schemas(
            // Entity types
            crate::entities::ProductModel,
            crate::entities::CategoryModel,
            crate::entities::CartItemModel,
            crate::entities::OrderModel,
            crate::entities::OrderItemModel,
            crate::entities::OrderStatus,
            crate::entities::PaymentMethod,

            // Cart types
            crate::services::CartView,
            crate::services::cart::CartLine,
            crate::handlers::cart::AddToCartRequest,
            crate::handlers::cart::UpdateCartItemRequest,

            // Checkout types
            crate::handlers::checkout::CheckoutRequest,
            crate::handlers::checkout::CheckoutResponse,

            // Contact types
            crate::handlers::contact::ContactRequest,
            crate::handlers::contact::ContactResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_the_api_surface() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Storefront API"));
        assert!(json.contains("/api/products/search"));
        assert!(json.contains("/api/cart"));
        assert!(json.contains("/api/checkout"));
        assert!(json.contains("/api/contact"));
    }
}
