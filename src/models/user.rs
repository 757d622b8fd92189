//! Modelo de User
//!
//! Usuarios de EcoTrack con su rol ya resuelto y almacenado.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Manager,
    Logistic,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Manager => "manager",
            Role::Logistic => "logistic",
            Role::Admin => "admin",
        }
    }

    /// Roles con acceso a las operaciones de logística y gestión de pedidos
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Manager | Role::Logistic | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "manager" => Ok(Role::Manager),
            "logistic" => Ok(Role::Logistic),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Origen del rol almacenado - mapea al ENUM role_source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "role_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// Derivado del dominio del email al crear el usuario
    Domain,
    /// Indicado explícitamente al crear el usuario
    Explicit,
    /// Asignado por un administrador; nunca se vuelve a derivar
    Admin,
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub role_source: RoleSource,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, role: Role, role_source: RoleSource, company_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            role,
            role_source,
            company_name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("Logistic".parse::<Role>(), Ok(Role::Logistic));
        assert_eq!(" admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("driver".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn test_staff_roles() {
        assert!(!Role::Client.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(Role::Logistic.is_staff());
        assert!(Role::Admin.is_staff());
    }
}
