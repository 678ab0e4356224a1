// handlers/categories.rs - /categories

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::{json_body, path_param, query_param};
use crate::auth::{require, Caller, Operation};
use crate::database::models::Category;
use crate::filter::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CategoryInput, CategoryNode, PageParams};
use crate::state::AppState;

pub async fn category_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<Category>> {
    require(&caller, Operation::ListCategories)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.categories.list(&params).await?))
}

pub async fn category_get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Category> {
    require(&caller, Operation::GetCategory)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.categories.get(id).await?))
}

/// GET /categories/:id/subtree - the category with its descendants nested
pub async fn category_subtree(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<CategoryNode> {
    require(&caller, Operation::GetCategorySubtree)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.categories.subtree(id).await?))
}

pub async fn category_create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<Category> {
    require(&caller, Operation::CreateCategory)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::created(state.categories.create(input).await?))
}

pub async fn category_update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> ApiResult<Category> {
    require(&caller, Operation::UpdateCategory)?;
    let id = path_param(id)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::success(state.categories.update(id, input).await?))
}

pub async fn category_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    require(&caller, Operation::DeleteCategory)?;
    let id = path_param(id)?;
    state.categories.delete(id).await?;
    Ok(ApiResponse::no_content())
}
