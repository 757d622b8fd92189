use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Role, RoleSource, User};
use crate::services::RegisterUser;

// Request para registrar un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(max = 200))]
    pub company_name: Option<String>,

    /// Rol explícito; si no es válido se deriva del dominio
    pub role: Option<String>,
}

impl From<RegisterUserRequest> for RegisterUser {
    fn from(request: RegisterUserRequest) -> Self {
        Self {
            email: request.email,
            company_name: request.company_name,
            role: request.role,
        }
    }
}

// Request para cambiar el rol de un usuario (solo admin)
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// Response de usuario
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub role_source: RoleSource,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            role_source: user.role_source,
            company_name: user.company_name,
            created_at: user.created_at,
        }
    }
}
