// handlers/products.rs - /products

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::{json_body, path_param, query_param};
use crate::auth::{require, Caller, Operation};
use crate::database::models::Product;
use crate::filter::{Page, ProductCriteria};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{PageParams, ProductInput};
use crate::state::AppState;

/// GET /products?name=&min_price=&max_price=&category=&page=&size=&sort=
pub async fn product_search(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    criteria: Result<Query<ProductCriteria>, QueryRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<Product>> {
    require(&caller, Operation::SearchProducts)?;
    let criteria = query_param(criteria)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.products.search(&criteria, &params).await?))
}

/// GET /products/:id
pub async fn product_get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Product> {
    require(&caller, Operation::GetProduct)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.products.get(id).await?))
}

/// POST /products
pub async fn product_create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Product> {
    require(&caller, Operation::CreateProduct)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::created(state.products.create(input).await?))
}

/// PUT /products/:id
pub async fn product_update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Product> {
    require(&caller, Operation::UpdateProduct)?;
    let id = path_param(id)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::success(state.products.update(id, input).await?))
}

/// DELETE /products/:id
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    require(&caller, Operation::DeleteProduct)?;
    let id = path_param(id)?;
    state.products.delete(id).await?;
    Ok(ApiResponse::no_content())
}
