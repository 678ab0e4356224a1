pub mod category_service;
pub mod category_tree;
pub mod country_service;
pub mod order_service;
pub mod payment_method_service;
pub mod product_service;

use serde::Deserialize;
use thiserror::Error;

use crate::database::{DatabaseError, Entity};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{Filter, FilterError, PageRequest, Predicate};

pub use category_service::{CategoryInput, CategoryService};
pub use category_tree::{CategoryExpansion, CategoryNode, CategoryTree};
pub use country_service::{CountryInput, CountryService};
pub use order_service::{OrderDetails, OrderLineInput, OrderService, PlaceOrderInput};
pub use payment_method_service::{PaymentMethodInput, PaymentMethodService};
pub use product_service::{ProductInput, ProductService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Invalid { field, message: message.into() }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ServiceError::NotFound(msg),
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Paging and sorting parameters shared by every listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `column [asc|desc]`, comma separated
    pub sort: Option<String>,
}

impl PageParams {
    pub fn filter<T: Entity>(&self, predicate: Predicate) -> Result<Filter, FilterError> {
        let order = match self.sort.as_deref() {
            Some(spec) => FilterOrder::parse(spec, T::SORTABLE)?,
            None => vec![],
        };
        Ok(Filter::new(predicate)
            .order(order)
            .page(PageRequest::new(self.page, self.size)?))
    }
}

/// Trimmed, non-empty, bounded name.
pub(crate) fn validate_name(field: &'static str, raw: &str) -> ServiceResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid(field, "must not be blank"));
    }
    if name.chars().count() > 255 {
        return Err(ServiceError::invalid(field, "must be at most 255 characters"));
    }
    Ok(name.to_string())
}
