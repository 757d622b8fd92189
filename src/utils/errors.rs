//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Order {order_id} already has a logistic route")]
    DuplicateRoute { order_id: Uuid },

    #[error("Route {route_id} already has a selected option")]
    AlreadySelected { route_id: Uuid },

    #[error("Option {option_id} does not belong to route {route_id}")]
    InvalidOption { route_id: Uuid, option_id: Uuid },

    #[error("Invalid transition for order {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Route creation failed for order {order_id}: {reason}")]
    RouteCreationFailed { order_id: Uuid, reason: String },

    #[error("Geo service unavailable: {0}")]
    GeoUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código estable que viaja en el cuerpo de la respuesta
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DuplicateRoute { .. } => "DUPLICATE_ROUTE",
            AppError::AlreadySelected { .. } => "ALREADY_SELECTED",
            AppError::InvalidOption { .. } => "INVALID_OPTION",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::RouteCreationFailed { .. } => "ROUTE_CREATION_FAILED",
            AppError::GeoUnavailable(_) => "GEO_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::DuplicateRoute { .. }
            | AppError::AlreadySelected { .. }
            | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::InvalidOption { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RouteCreationFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::GeoUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Contexto estructurado para reproducir violaciones de invariantes
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Database(e) => Some(json!({ "sql_error": e.to_string() })),
            AppError::Validation(e) => Some(json!(e)),
            AppError::DuplicateRoute { order_id } => Some(json!({ "order_id": order_id })),
            AppError::AlreadySelected { route_id } => Some(json!({ "route_id": route_id })),
            AppError::InvalidOption { route_id, option_id } => Some(json!({
                "route_id": route_id,
                "option_id": option_id,
            })),
            AppError::InvalidTransition { order_id, from, to } => Some(json!({
                "order_id": order_id,
                "current_status": from,
                "attempted_status": to,
            })),
            AppError::RouteCreationFailed { order_id, .. } => Some(json!({ "order_id": order_id })),
            AppError::Internal(msg) => Some(json!({ "internal_error": msg })),
            _ => None,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database Error",
            AppError::Validation(_) => "Validation Error",
            AppError::InvalidInput(_) => "Invalid Input",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotFound(_) => "Not Found",
            AppError::Conflict(_) => "Conflict",
            AppError::DuplicateRoute { .. } => "Duplicate Route",
            AppError::AlreadySelected { .. } => "Already Selected",
            AppError::InvalidOption { .. } => "Invalid Option",
            AppError::InvalidTransition { .. } => "Invalid Transition",
            AppError::RouteCreationFailed { .. } => "Route Creation Failed",
            AppError::GeoUnavailable(_) => "Geo Unavailable",
            AppError::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "❌ {}", self);
        } else {
            tracing::warn!(code = self.code(), "⚠️ {}", self);
        }

        // No exponer detalles de errores internos en el mensaje principal
        let message = match &self {
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            AppError::Validation(_) => "The provided data is invalid".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        };

        let error_response = ErrorResponse {
            error: self.title().to_string(),
            message,
            details: self.details(),
            code: Some(self.code().to_string()),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de acceso prohibido
pub fn unauthorized_error(operation: &str, reason: &str) -> AppError {
    AppError::Unauthorized(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de entrada inválida
pub fn invalid_input_error(message: &str) -> AppError {
    AppError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::AlreadySelected { route_id: id }.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidOption { route_id: id, option_id: id }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(invalid_input_error("volume").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(unauthorized_error("select route", "client").status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_transition_carries_context() {
        let order_id = Uuid::new_v4();
        let err = AppError::InvalidTransition {
            order_id,
            from: OrderStatus::Completed,
            to: OrderStatus::Cancelled,
        };

        assert_eq!(err.code(), "INVALID_TRANSITION");
        let details = err.details().unwrap();
        assert_eq!(details["current_status"], "completed");
        assert_eq!(details["attempted_status"], "cancelled");
        assert!(err.to_string().contains(&order_id.to_string()));
    }
}
