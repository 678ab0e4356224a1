// handlers/countries.rs - /countries

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::{json_body, path_param, query_param};
use crate::auth::{require, Caller, Operation};
use crate::database::models::Country;
use crate::filter::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{CountryInput, PageParams};
use crate::state::AppState;

pub async fn country_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<Country>> {
    require(&caller, Operation::ListCountries)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.countries.list(&params).await?))
}

pub async fn country_get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Country> {
    require(&caller, Operation::GetCountry)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.countries.get(id).await?))
}

pub async fn country_create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<CountryInput>, JsonRejection>,
) -> ApiResult<Country> {
    require(&caller, Operation::CreateCountry)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::created(state.countries.create(input).await?))
}

pub async fn country_update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CountryInput>, JsonRejection>,
) -> ApiResult<Country> {
    require(&caller, Operation::UpdateCountry)?;
    let id = path_param(id)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::success(state.countries.update(id, input).await?))
}

pub async fn country_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    require(&caller, Operation::DeleteCountry)?;
    let id = path_param(id)?;
    state.countries.delete(id).await?;
    Ok(ApiResponse::no_content())
}
