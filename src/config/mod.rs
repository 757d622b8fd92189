//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y los parámetros de negocio (tarifas, rutas, roles) del sistema.

pub mod database;
pub mod environment;
pub mod pricing;
pub mod roles;
pub mod routing;

use std::str::FromStr;

use thiserror::Error;

pub use environment::*;
pub use pricing::{MaterialRate, PricingConfig};
pub use roles::RoleDomainMap;
pub use routing::{RouteOptionTemplate, RoutingConfig};

/// Errores al leer la configuración en el arranque
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Leer una variable de entorno y parsearla, con valor por defecto si no existe
pub(crate) fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(key, e.to_string())),
        _ => Ok(default),
    }
}

/// Leer una variable de entorno opcional (vacía cuenta como ausente)
pub(crate) fn env_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
