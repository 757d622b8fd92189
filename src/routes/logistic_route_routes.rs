use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::SelectRouteRequest;
use crate::middleware::ActingUser;
use crate::models::RouteSelection;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_logistic_route_router() -> Router<AppState> {
    Router::new().route("/:id/select", post(select_route))
}

async fn select_route(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRouteRequest>,
) -> Result<Json<RouteSelection>, AppError> {
    let selection = state.workflow.select_route(id, request.option_id, &acting).await?;
    Ok(Json(selection))
}
