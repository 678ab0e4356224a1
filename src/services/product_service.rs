use std::collections::BTreeSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::category_service::CategoryService;
use super::{validate_name, PageParams, ServiceError, ServiceResult};
use crate::database::models::{Category, Country, Product};
use crate::database::Repository;
use crate::filter::{Page, ProductCriteria};

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub country_id: Option<i64>,
}

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn Repository<Product>>,
    categories: Arc<dyn Repository<Category>>,
    countries: Arc<dyn Repository<Country>>,
    hierarchy: CategoryService,
    empty_category_matches_nothing: bool,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn Repository<Product>>,
        categories: Arc<dyn Repository<Category>>,
        countries: Arc<dyn Repository<Country>>,
    ) -> Self {
        let hierarchy = CategoryService::new(categories.clone(), products.clone());
        Self {
            products,
            categories,
            countries,
            hierarchy,
            empty_category_matches_nothing: crate::config::config()
                .filter
                .empty_category_matches_nothing,
        }
    }

    pub fn empty_category_matches_nothing(mut self, enabled: bool) -> Self {
        self.empty_category_matches_nothing = enabled;
        self
    }

    /// Paged product search. A category criterion matches the category and
    /// every category below it.
    pub async fn search(
        &self,
        criteria: &ProductCriteria,
        params: &PageParams,
    ) -> ServiceResult<Page<Product>> {
        criteria.validate()?;

        let category_ids = match criteria.category {
            Some(root) => self.hierarchy.expand(root).await?.ids,
            None => BTreeSet::new(),
        };

        let predicate = criteria.to_predicate(&category_ids, self.empty_category_matches_nothing);
        let filter = params.filter::<Product>(predicate)?;
        let page = self.products.find_page(&filter).await?;
        tracing::debug!(
            "Product search matched {} of {} rows",
            page.content.len(),
            page.total_elements
        );
        Ok(page)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Product> {
        Ok(self.products.select_404(id).await?)
    }

    pub async fn create(&self, input: ProductInput) -> ServiceResult<Product> {
        let product = self.validated(0, input).await?;
        let saved = self.products.save(product).await?;
        tracing::info!("Created product {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    pub async fn update(&self, id: i64, input: ProductInput) -> ServiceResult<Product> {
        self.products.select_404(id).await?;
        let product = self.validated(id, input).await?;
        Ok(self.products.save(product).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.products.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    async fn validated(&self, id: i64, input: ProductInput) -> ServiceResult<Product> {
        let name = validate_name("name", &input.name)?;
        if input.price < Decimal::ZERO {
            return Err(ServiceError::invalid("price", "must not be negative"));
        }
        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(ServiceError::invalid(
                    "category_id",
                    format!("category {} does not exist", category_id),
                ));
            }
        }
        if let Some(country_id) = input.country_id {
            if self.countries.find_by_id(country_id).await?.is_none() {
                return Err(ServiceError::invalid(
                    "country_id",
                    format!("country {} does not exist", country_id),
                ));
            }
        }

        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Product {
            id,
            name,
            description,
            price: input.price,
            category_id: input.category_id,
            country_id: input.country_id,
        })
    }
}
