//! Motor de precios
//!
//! `price = volumen * tarifa_material + distancia * tarifa_distancia`,
//! redondeado a 2 decimales. El impacto ambiental es `volumen * factor_co2`,
//! redondeado a 3 decimales. Ambos se calculan una sola vez por pedido.

use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::PricingConfig;
use crate::models::MaterialType;
use crate::utils::errors::{invalid_input_error, AppResult};
use crate::utils::validation::{validate_finite, validate_non_negative, validate_positive};

/// Volumen máximo aceptado por pedido (1000 t)
pub const MAX_VOLUME_KG: f64 = 1_000_000.0;

/// Distancia máxima aceptada; por encima el geocoding se considera erróneo
pub const MAX_DISTANCE_KM: f64 = 20_000.0;

/// Mayor importe que cabe en `NUMERIC(14, 2)`
pub fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceQuote {
    pub price: Decimal,
    pub environmental_impact: f64,
}

#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: Arc<PricingConfig>,
}

impl PricingEngine {
    pub fn new(config: Arc<PricingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn compute_price(&self, material: MaterialType, volume_kg: f64, distance_km: f64) -> AppResult<PriceQuote> {
        validate_finite(volume_kg)
            .and_then(|_| validate_positive(volume_kg))
            .map_err(|_| invalid_input_error("volume_kg must be a positive number"))?;
        if volume_kg > MAX_VOLUME_KG {
            return Err(invalid_input_error(&format!("volume_kg must not exceed {}", MAX_VOLUME_KG)));
        }
        validate_finite(distance_km)
            .and_then(|_| validate_non_negative(distance_km))
            .map_err(|_| invalid_input_error("distance_km must be a non-negative number"))?;
        if distance_km > MAX_DISTANCE_KM {
            return Err(invalid_input_error(&format!("distance_km must not exceed {}", MAX_DISTANCE_KM)));
        }

        let rate = self.config.rate_for(material);
        let volume = to_decimal(volume_kg, "volume_kg")?;
        let distance = to_decimal(distance_km, "distance_km")?;

        let price = volume
            .checked_mul(rate.rate_per_kg)
            .zip(distance.checked_mul(self.config.distance_rate))
            .and_then(|(material_part, distance_part)| material_part.checked_add(distance_part))
            .map(|price| price.round_dp(2))
            .filter(|price| *price <= max_price())
            .ok_or_else(|| invalid_input_error("price exceeds the maximum storable amount"))?;
        let environmental_impact = round_to(volume_kg * rate.co2_per_kg, 3);

        debug!(
            material = %material,
            volume_kg,
            distance_km,
            %price,
            environmental_impact,
            "💰 Precio calculado"
        );

        Ok(PriceQuote {
            price,
            environmental_impact,
        })
    }
}

fn to_decimal(value: f64, field: &str) -> AppResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| invalid_input_error(&format!("{} is out of range", field)))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaterialRate;
    use crate::utils::errors::AppError;

    fn engine() -> PricingEngine {
        PricingEngine::new(Arc::new(PricingConfig::default()))
    }

    #[test]
    fn test_pet_100kg_20km() {
        let quote = engine().compute_price(MaterialType::Pet, 100.0, 20.0).unwrap();
        assert_eq!(quote.price, Decimal::from(3900));
        assert_eq!(quote.environmental_impact, 150.0);
    }

    #[test]
    fn test_rounding() {
        // 0.333 kg de PP: 0.333 * 18 = 5.994; impacto 0.333 * 1.3 = 0.4329
        let quote = engine().compute_price(MaterialType::Pp, 0.333, 0.0).unwrap();
        assert_eq!(quote.price, Decimal::new(599, 2));
        assert_eq!(quote.environmental_impact, 0.433);
    }

    #[test]
    fn test_material_missing_from_table_uses_default() {
        let mut config = PricingConfig::default();
        config.materials.remove(&MaterialType::Ps);
        let engine = PricingEngine::new(Arc::new(config));

        let quote = engine.compute_price(MaterialType::Ps, 10.0, 0.0).unwrap();
        assert_eq!(quote.price, Decimal::from(80));
        assert_eq!(quote.environmental_impact, 8.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let engine = engine();
        assert!(matches!(engine.compute_price(MaterialType::Pet, 0.0, 1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(engine.compute_price(MaterialType::Pet, -5.0, 1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(engine.compute_price(MaterialType::Pet, f64::NAN, 1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(engine.compute_price(MaterialType::Pet, 1.0, -0.5), Err(AppError::InvalidInput(_))));
        assert!(matches!(engine.compute_price(MaterialType::Pet, 1.0, f64::INFINITY), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_oversized_inputs_are_rejected() {
        let engine = engine();
        assert!(matches!(engine.compute_price(MaterialType::Pet, 1e28, 0.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(
            engine.compute_price(MaterialType::Pet, MAX_VOLUME_KG * 2.0, 0.0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.compute_price(MaterialType::Pet, 1.0, MAX_DISTANCE_KM + 1.0),
            Err(AppError::InvalidInput(_))
        ));

        let largest = engine.compute_price(MaterialType::Pet, MAX_VOLUME_KG, MAX_DISTANCE_KM).unwrap();
        assert!(largest.price <= max_price());
    }

    #[test]
    fn test_rate_overflow_is_invalid_input() {
        let mut config = PricingConfig::default();
        config.materials.insert(MaterialType::Pet, MaterialRate::new(Decimal::MAX, 1.5));
        let engine = PricingEngine::new(Arc::new(config));

        let result = engine.compute_price(MaterialType::Pet, 1000.0, 0.0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let expensive_distance = PricingConfig {
            distance_rate: Decimal::new(1_000_000_000, 0),
            ..PricingConfig::default()
        };
        let engine = PricingEngine::new(Arc::new(expensive_distance));
        let result = engine.compute_price(MaterialType::Pet, 1.0, 10_000.0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_pure() {
        let engine = engine();
        let first = engine.compute_price(MaterialType::Hdpe, 42.5, 13.7).unwrap();
        let second = engine.compute_price(MaterialType::Hdpe, 42.5, 13.7).unwrap();
        assert_eq!(first, second);
    }
}
