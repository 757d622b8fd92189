//! Extractor del usuario que actúa
//!
//! El usuario se identifica con la cabecera `X-User-Id` y se resuelve contra
//! el store. Cabecera ausente, malformada o desconocida: `Unauthorized`.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::models::User;
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_uuid;

pub const ACTING_USER_HEADER: &str = "x-user-id";

/// Usuario autenticado que se inyecta en los handlers
#[derive(Debug, Clone)]
pub struct ActingUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTING_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("X-User-Id header is required".to_string()))?;

        let user_id = validate_uuid(raw)
            .map_err(|_| AppError::Unauthorized("X-User-Id is not a valid user id".to_string()))?;

        let user = state
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("unknown user '{}'", user_id)))?;

        Ok(ActingUser(user))
    }
}
