use std::sync::Arc;

use serde::Deserialize;

use super::{validate_name, PageParams, ServiceError, ServiceResult};
use crate::database::models::{Country, Order, Product};
use crate::database::Repository;
use crate::filter::{Filter, Page, Predicate};

#[derive(Debug, Clone, Deserialize)]
pub struct CountryInput {
    pub name: String,
    pub code: String,
}

#[derive(Clone)]
pub struct CountryService {
    countries: Arc<dyn Repository<Country>>,
    products: Arc<dyn Repository<Product>>,
    orders: Arc<dyn Repository<Order>>,
}

impl CountryService {
    pub fn new(
        countries: Arc<dyn Repository<Country>>,
        products: Arc<dyn Repository<Product>>,
        orders: Arc<dyn Repository<Order>>,
    ) -> Self {
        Self { countries, products, orders }
    }

    pub async fn list(&self, params: &PageParams) -> ServiceResult<Page<Country>> {
        let filter = params.filter::<Country>(Predicate::True)?;
        Ok(self.countries.find_page(&filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Country> {
        Ok(self.countries.select_404(id).await?)
    }

    pub async fn create(&self, input: CountryInput) -> ServiceResult<Country> {
        let country = self.validated(0, input).await?;
        let saved = self.countries.save(country).await?;
        tracing::info!("Created country {} ({})", saved.id, saved.code);
        Ok(saved)
    }

    pub async fn update(&self, id: i64, input: CountryInput) -> ServiceResult<Country> {
        self.countries.select_404(id).await?;
        let country = self.validated(id, input).await?;
        Ok(self.countries.save(country).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.countries.select_404(id).await?;

        let referenced = Predicate::Eq("country_id", id.into());
        if self.products.exists_where(&referenced).await?
            || self.orders.exists_where(&referenced).await?
        {
            return Err(ServiceError::Conflict(format!("Country {} is still referenced", id)));
        }

        self.countries.delete(id).await?;
        tracing::info!("Deleted country {}", id);
        Ok(())
    }

    async fn validated(&self, id: i64, input: CountryInput) -> ServiceResult<Country> {
        let name = validate_name("name", &input.name)?;
        let code = normalize_code(&input.code)?;

        let same_code = Filter::new(Predicate::Eq("code", code.as_str().into()));
        if self
            .countries
            .find_where(&same_code)
            .await?
            .iter()
            .any(|c| c.id != id)
        {
            return Err(ServiceError::Conflict(format!("Country code {} already exists", code)));
        }

        Ok(Country { id, name, code })
    }
}

/// Two ASCII letters, upper-cased.
fn normalize_code(raw: &str) -> ServiceResult<String> {
    let code = raw.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::invalid("code", "must be a two-letter ISO country code"));
    }
    Ok(code.to_ascii_uppercase())
}
