use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{AdvanceOrderRequest, CreateOrderRequest, CreateOrderResponse};
use crate::middleware::ActingUser;
use crate::models::{LogisticRoute, Order};
use crate::services::RoutedOrder;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/route", get(get_order_route))
        .route("/:id/route/retry", post(retry_routing))
        .route("/:id/advance", post(advance_order))
        .route("/:id/cancel", post(cancel_order))
}

/// Alta de pedido: 201 aunque la ruta no se haya podido generar
async fn create_order(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    request.validate()?;
    let creation = state.workflow.create(request.into(), &acting).await?;
    Ok((StatusCode::CREATED, Json(creation.into())))
}

async fn list_orders(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.workflow.list_orders_for(&acting).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state.workflow.get_order(id, &acting).await?;
    Ok(Json(order))
}

async fn get_order_route(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LogisticRoute>, AppError> {
    let route = state.workflow.get_route_for_order(id, &acting).await?;
    Ok(Json(route))
}

async fn retry_routing(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RoutedOrder>, AppError> {
    let routed = state.workflow.retry_routing(id, &acting).await?;
    Ok(Json(routed))
}

async fn advance_order(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.workflow.advance(id, request.status, &acting).await?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state.workflow.cancel(id, &acting).await?;
    Ok(Json(order))
}
