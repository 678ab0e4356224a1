use super::authenticator::{Caller, Identity};
use crate::error::ApiError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

const PUBLIC: &[&str] = &[];
const ADMIN_ONLY: &[&str] = &[ROLE_ADMIN];
const CUSTOMER: &[&str] = &[ROLE_USER, ROLE_ADMIN];

/// Every business operation exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListProducts,
    GetProduct,
    SearchProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,

    ListCategories,
    GetCategory,
    GetCategorySubtree,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,

    ListCountries,
    GetCountry,
    CreateCountry,
    UpdateCountry,
    DeleteCountry,

    ListPaymentMethods,
    GetPaymentMethod,
    CreatePaymentMethod,
    UpdatePaymentMethod,
    DeletePaymentMethod,

    PlaceOrder,
    ListOwnOrders,
    GetOrder,
    SearchOrders,
    CompleteOrder,
}

impl Operation {
    /// Roles of which the caller must hold at least one. Empty means public.
    pub fn required_roles(self) -> &'static [&'static str] {
        use Operation::*;
        match self {
            ListProducts | GetProduct | SearchProducts => PUBLIC,
            ListCategories | GetCategory | GetCategorySubtree => PUBLIC,
            ListCountries | GetCountry => PUBLIC,
            ListPaymentMethods | GetPaymentMethod => PUBLIC,

            CreateProduct | UpdateProduct | DeleteProduct => ADMIN_ONLY,
            CreateCategory | UpdateCategory | DeleteCategory => ADMIN_ONLY,
            CreateCountry | UpdateCountry | DeleteCountry => ADMIN_ONLY,
            CreatePaymentMethod | UpdatePaymentMethod | DeletePaymentMethod => ADMIN_ONLY,

            PlaceOrder | ListOwnOrders | GetOrder => CUSTOMER,
            SearchOrders | CompleteOrder => ADMIN_ONLY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Unauthenticated,
    Forbidden,
}

/// Pure access check with "any of the required roles" semantics.
pub fn authorize(caller: &Caller, required: &[&str]) -> AccessDecision {
    if required.is_empty() {
        return AccessDecision::Granted;
    }
    match caller.identity() {
        None => AccessDecision::Unauthenticated,
        Some(identity) if identity.has_any_role(required) => AccessDecision::Granted,
        Some(_) => AccessDecision::Forbidden,
    }
}

/// Gate for the top of a handler. Yields the identity when there is one.
pub fn require(caller: &Caller, operation: Operation) -> Result<Option<&Identity>, ApiError> {
    match authorize(caller, operation.required_roles()) {
        AccessDecision::Granted => Ok(caller.identity()),
        AccessDecision::Unauthenticated => {
            tracing::debug!("{:?} denied: no identity", operation);
            Err(ApiError::unauthorized("Authentication required"))
        }
        AccessDecision::Forbidden => {
            tracing::debug!(
                "{:?} denied: '{}' lacks any of {:?}",
                operation,
                caller.identity().map(Identity::subject).unwrap_or_default(),
                operation.required_roles()
            );
            Err(ApiError::forbidden("Insufficient role"))
        }
    }
}

/// Like [`require`] for operations that need to know who the caller is.
pub fn require_identity(caller: &Caller, operation: Operation) -> Result<&Identity, ApiError> {
    require(caller, operation)?.ok_or_else(|| ApiError::unauthorized("Authentication required"))
}
