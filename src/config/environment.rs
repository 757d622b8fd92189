//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::time::Duration;

use super::{env_optional, env_parse, ConfigError, PricingConfig, RoleDomainMap, RoutingConfig};

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: tracing::Level,
    /// Sin `DATABASE_URL` el servidor arranca con el store en memoria
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub mapbox_token: Option<String>,
    pub notification_webhook_url: Option<String>,
    pub notification_timeout: Duration,
    pub pricing: PricingConfig,
    pub routing: RoutingConfig,
    pub role_domains: RoleDomainMap,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            log_level: tracing::Level::INFO,
            database_url: None,
            cors_origins: Vec::new(),
            mapbox_token: None,
            notification_webhook_url: None,
            notification_timeout: Duration::from_millis(5000),
            pricing: PricingConfig::default(),
            routing: RoutingConfig::default(),
            role_domains: RoleDomainMap::default(),
        }
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            environment: env_optional("ENVIRONMENT").unwrap_or(defaults.environment),
            port: env_parse("PORT", defaults.port)?,
            host: env_optional("HOST").unwrap_or(defaults.host),
            log_level: env_parse("LOG_LEVEL", defaults.log_level)?,
            database_url: env_optional("DATABASE_URL"),
            cors_origins: env_optional("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            mapbox_token: env_optional("MAPBOX_TOKEN"),
            notification_webhook_url: env_optional("NOTIFICATION_WEBHOOK_URL"),
            notification_timeout: Duration::from_millis(env_parse(
                "ECOTRACK_NOTIFY_TIMEOUT_MS",
                defaults.notification_timeout.as_millis() as u64,
            )?),
            pricing: PricingConfig::from_env()?,
            routing: RoutingConfig::from_env()?,
            role_domains: RoleDomainMap::from_env()?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
    }
}
