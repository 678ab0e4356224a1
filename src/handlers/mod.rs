// handlers/mod.rs - HTTP handlers, one module per resource
//
// Every handler checks the caller's roles before touching its input, so an
// anonymous request with a malformed body, query or path still gets 401.
// Extractors are taken as `Result`s for that reason.

pub mod categories;
pub mod countries;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod system;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::error::ApiError;

/// Unwraps a JSON body, turning extractor rejections into 400s.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::bad_request(rejection.body_text()))
        }
    }
}

/// Unwraps query parameters, turning extractor rejections into 400s.
pub(crate) fn query_param<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected query string: {}", rejection.body_text());
            Err(ApiError::bad_request(rejection.body_text()))
        }
    }
}

pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    match path {
        Ok(Path(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected path: {}", rejection.body_text());
            Err(ApiError::bad_request(rejection.body_text()))
        }
    }
}
