use crate::entities::{CategoryModel, ProductModel};
use crate::errors::ServiceError;
use crate::storage::Storage;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Read-mostly service over the product and category catalog.
///
/// Products are static reference data in this design: nothing decrements
/// stock or rewrites prices through the public API. The write operations
/// here exist for seeding and tests.
#[derive(Clone)]
pub struct CatalogService {
    storage: Arc<dyn Storage>,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Lists every product in the catalog.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(self.storage.list_products().await?)
    }

    /// Fetches a single product.
    ///
    /// # Returns
    ///
    /// * `Ok(ProductModel)` - The product
    /// * `Err(ServiceError::NotFound)` - No product with that id
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductModel, ServiceError> {
        self.storage
            .get_product(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Products flagged for the featured shelf.
    #[instrument(skip(self))]
    pub async fn list_featured(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(self.storage.list_featured_products().await?)
    }

    /// Products flagged as new arrivals.
    #[instrument(skip(self))]
    pub async fn list_new(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(self.storage.list_new_products().await?)
    }

    /// Products in one category, matched on the category slug.
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductModel>, ServiceError> {
        Ok(self.storage.list_products_by_category(category).await?)
    }

    /// Case-insensitive substring search over product names and
    /// descriptions. A blank term is rejected rather than treated as
    /// match-everything.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str) -> Result<Vec<ProductModel>, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::ValidationError(
                "Search term must not be empty".to_string(),
            ));
        }
        Ok(self.storage.search_products(term).await?)
    }

    /// Lists every category.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(self.storage.list_categories().await?)
    }

    /// Fetches a category by its slug.
    ///
    /// # Returns
    ///
    /// * `Ok(CategoryModel)` - The category
    /// * `Err(ServiceError::NotFound)` - No category with that slug
    #[instrument(skip(self))]
    pub async fn get_category(&self, name: &str) -> Result<CategoryModel, ServiceError> {
        self.storage
            .get_category_by_name(name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", name)))
    }

    /// Adds a product to the catalog. Seed/test path only; there is no
    /// public route for this.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = ProductModel {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            compare_price: input.compare_price,
            image_url: input.image_url,
            category: input.category,
            rating: input.rating,
            review_count: input.review_count,
            in_stock: input.in_stock,
            is_new: input.is_new,
            is_featured: input.is_featured,
            created_at: Utc::now(),
        };

        let product = self.storage.insert_product(product).await?;
        info!("Created product: {}", product.id);
        Ok(product)
    }

    /// Adds a category. Seed/test path only.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let category = CategoryModel {
            id: Uuid::new_v4(),
            name: input.name,
            display_name: input.display_name,
            description: input.description,
            image_url: input.image_url,
            icon: input.icon,
        };

        let category = self.storage.insert_category(category).await?;
        info!("Created category: {}", category.name);
        Ok(category)
    }
}

/// Input for creating a product at seed time
#[derive(Clone, Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub image_url: String,
    pub category: String,
    pub rating: f64,
    pub review_count: i32,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_featured: bool,
}

impl Default for CreateProductInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: Decimal::ZERO,
            compare_price: None,
            image_url: String::new(),
            category: String::new(),
            rating: 0.0,
            review_count: 0,
            in_stock: true,
            is_new: false,
            is_featured: false,
        }
    }
}

/// Input for creating a category at seed time
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
}
