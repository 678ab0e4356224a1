// handlers/orders.rs - /orders

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::{json_body, path_param, query_param};
use crate::auth::{require, require_identity, Caller, Operation};
use crate::database::models::Order;
use crate::filter::{OrderCriteria, Page};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{OrderDetails, PageParams, PlaceOrderInput};
use crate::state::AppState;

/// POST /orders - the order is owned by the token's subject
pub async fn order_place(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<PlaceOrderInput>, JsonRejection>,
) -> ApiResult<OrderDetails> {
    let identity = require_identity(&caller, Operation::PlaceOrder)?;
    let input = json_body(payload)?;
    Ok(ApiResponse::created(state.orders.place(identity, input).await?))
}

/// GET /orders/mine
pub async fn order_list_own(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<Order>> {
    let identity = require_identity(&caller, Operation::ListOwnOrders)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.orders.list_own(identity, &params).await?))
}

/// GET /orders?completed=&username=&page=&size=&sort=
pub async fn order_search(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    criteria: Result<Query<OrderCriteria>, QueryRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Page<Order>> {
    require(&caller, Operation::SearchOrders)?;
    let criteria = query_param(criteria)?;
    let params = query_param(params)?;
    Ok(ApiResponse::success(state.orders.search(&criteria, &params).await?))
}

/// GET /orders/:id
pub async fn order_get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<OrderDetails> {
    let identity = require_identity(&caller, Operation::GetOrder)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.orders.get(identity, id).await?))
}

/// POST /orders/:id/complete
pub async fn order_complete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<OrderDetails> {
    require(&caller, Operation::CompleteOrder)?;
    let id = path_param(id)?;
    Ok(ApiResponse::success(state.orders.complete(id).await?))
}
