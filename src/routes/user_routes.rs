use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{ApiResponse, ChangeRoleRequest, RegisterUserRequest, UserResponse};
use crate::middleware::ActingUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_user))
        .route("/:id", get(get_user))
        .route("/:id/role", put(change_role))
}

async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    request.validate()?;
    let user = state.users.register_user(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            user.into(),
            "Usuario registrado exitosamente".to_string(),
        )),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    ActingUser(_acting): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user.into()))
}

async fn change_role(
    State(state): State<AppState>,
    ActingUser(acting): ActingUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = state.users.change_role(&acting, id, request.role).await?;
    Ok(Json(ApiResponse::success_with_message(
        user.into(),
        "Rol actualizado exitosamente".to_string(),
    )))
}
