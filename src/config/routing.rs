//! Configuración del generador de rutas
//!
//! Dirección de la planta (origen de todas las rutas), distancia de respaldo
//! cuando el geocoding no responde y plantillas de opciones
//! (`ECOTRACK_ROUTE_OPTIONS=economy:1.0:1.0,standard:1.2:0.8,express:1.5:0.5`).

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use super::{env_optional, env_parse, ConfigError};

/// Cada ruta ofrece exactamente tres opciones; solo sus nombres y
/// multiplicadores son configurables.
pub const ROUTE_OPTION_COUNT: usize = 3;

/// Plantilla de una opción: nombre y multiplicadores sobre la línea base
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptionTemplate {
    pub name: String,
    pub cost_multiplier: Decimal,
    pub duration_multiplier: f64,
}

impl RouteOptionTemplate {
    pub fn new(name: &str, cost_multiplier: Decimal, duration_multiplier: f64) -> Self {
        Self {
            name: name.to_string(),
            cost_multiplier,
            duration_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    pub facility_address: String,
    pub fallback_distance_km: f64,
    pub geo_timeout: Duration,
    /// Coste base por km de la opción de referencia
    pub cost_per_km: Decimal,
    pub average_speed_kmh: f64,
    /// Horas fijas de carga/descarga añadidas a cada ruta
    pub handling_hours: f64,
    /// Factor de carretera sobre la distancia en línea recta
    pub road_factor: f64,
    pub options: Vec<RouteOptionTemplate>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            facility_address: "EcoTrack Recycling Facility".to_string(),
            fallback_distance_km: 25.0,
            geo_timeout: Duration::from_millis(3000),
            cost_per_km: Decimal::from(70),
            average_speed_kmh: 40.0,
            handling_hours: 1.0,
            road_factor: 1.3,
            options: default_route_options(),
        }
    }
}

pub fn default_route_options() -> Vec<RouteOptionTemplate> {
    vec![
        RouteOptionTemplate::new("economy", Decimal::ONE, 1.0),
        RouteOptionTemplate::new("standard", Decimal::new(12, 1), 0.8),
        RouteOptionTemplate::new("express", Decimal::new(15, 1), 0.5),
    ]
}

impl RoutingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            facility_address: env_optional("ECOTRACK_FACILITY_ADDRESS").unwrap_or(defaults.facility_address),
            fallback_distance_km: env_parse("ECOTRACK_FALLBACK_DISTANCE_KM", defaults.fallback_distance_km)?,
            geo_timeout: Duration::from_millis(env_parse(
                "ECOTRACK_GEO_TIMEOUT_MS",
                defaults.geo_timeout.as_millis() as u64,
            )?),
            cost_per_km: env_parse("ECOTRACK_COST_PER_KM", defaults.cost_per_km)?,
            average_speed_kmh: env_parse("ECOTRACK_AVERAGE_SPEED_KMH", defaults.average_speed_kmh)?,
            handling_hours: env_parse("ECOTRACK_HANDLING_HOURS", defaults.handling_hours)?,
            road_factor: env_parse("ECOTRACK_ROAD_FACTOR", defaults.road_factor)?,
            options: match env_optional("ECOTRACK_ROUTE_OPTIONS") {
                Some(raw) => parse_route_options(&raw)?,
                None => defaults.options,
            },
        };

        config.check()?;
        Ok(config)
    }

    /// Comprobar que los parámetros numéricos tienen sentido
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.fallback_distance_km.is_finite() && self.fallback_distance_km >= 0.0) {
            return Err(ConfigError::invalid("ECOTRACK_FALLBACK_DISTANCE_KM", "must be a non-negative number"));
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(ConfigError::invalid("ECOTRACK_AVERAGE_SPEED_KMH", "must be positive"));
        }
        if !(self.handling_hours.is_finite() && self.handling_hours >= 0.0) {
            return Err(ConfigError::invalid("ECOTRACK_HANDLING_HOURS", "must not be negative"));
        }
        if !(self.road_factor.is_finite() && self.road_factor >= 1.0) {
            return Err(ConfigError::invalid("ECOTRACK_ROAD_FACTOR", "must be at least 1.0"));
        }
        if self.cost_per_km < Decimal::ZERO {
            return Err(ConfigError::invalid("ECOTRACK_COST_PER_KM", "must not be negative"));
        }
        if self.options.len() != ROUTE_OPTION_COUNT {
            return Err(ConfigError::invalid(
                "ECOTRACK_ROUTE_OPTIONS",
                format!("exactly {} options are required", ROUTE_OPTION_COUNT),
            ));
        }
        Ok(())
    }
}

/// Parsear `nombre:multiplicador_coste:multiplicador_duración` separados por comas
pub fn parse_route_options(raw: &str) -> Result<Vec<RouteOptionTemplate>, ConfigError> {
    const KEY: &str = "ECOTRACK_ROUTE_OPTIONS";

    let options = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [name, cost, duration] = parts.as_slice() else {
                return Err(ConfigError::invalid(KEY, format!("expected name:cost:duration, got '{}'", entry)));
            };

            if name.is_empty() {
                return Err(ConfigError::invalid(KEY, "option name must not be empty"));
            }
            let cost_multiplier = Decimal::from_str(cost)
                .map_err(|e| ConfigError::invalid(KEY, format!("cost multiplier '{}': {}", cost, e)))?;
            let duration_multiplier = duration
                .parse::<f64>()
                .map_err(|e| ConfigError::invalid(KEY, format!("duration multiplier '{}': {}", duration, e)))?;

            if cost_multiplier <= Decimal::ZERO || !(duration_multiplier.is_finite() && duration_multiplier > 0.0) {
                return Err(ConfigError::invalid(KEY, format!("multipliers must be positive in '{}'", entry)));
            }

            Ok(RouteOptionTemplate::new(name, cost_multiplier, duration_multiplier))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if options.len() != ROUTE_OPTION_COUNT {
        return Err(ConfigError::invalid(
            KEY,
            format!("exactly {} options are required, got {}", ROUTE_OPTION_COUNT, options.len()),
        ));
    }

    let mut names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != options.len() {
        return Err(ConfigError::invalid(KEY, "option names must be unique"));
    }

    Ok(options)
}
