// handlers/payment_methods.rs - /payment-methods

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::{json_body, path_param, query_param};
use crate::auth::{require, Caller, Operation};
use crate::database::models::PaymentMethod;
use crate::filter::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{PageParams, PaymentMethodInput};
use crate::state::AppState;

pub async fn payment_method_list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<PaymentMethod>> {
    require(&caller, Operation::ListPaymentMethods)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.payment_methods.list(&params).await?))
}

pub async fn payment_method_get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<PaymentMethod> {
    require(&caller, Operation::GetPaymentMethod)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.payment_methods.get(id).await?))
}

pub async fn payment_method_create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<PaymentMethodInput>, JsonRejection>,
) -> ApiResult<PaymentMethod> {
    require(&caller, Operation::CreatePaymentMethod)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::created(state.payment_methods.create(input).await?))
}

pub async fn payment_method_update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PaymentMethodInput>, JsonRejection>,
) -> ApiResult<PaymentMethod> {
    require(&caller, Operation::UpdatePaymentMethod)?;
    let id = path_param(id)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::success(state.payment_methods.update(id, input).await?))
}

pub async fn payment_method_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    require(&caller, Operation::DeletePaymentMethod)?;
    let id = path_param(id)?;
    state.payment_methods.delete(id).await?;
    Ok(ApiResponse::no_content())
}
