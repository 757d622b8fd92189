//! Configuración de tarifas
//!
//! Tabla de precios por kg y factores de CO2 por material, más el recargo
//! logístico por km. Los valores por defecto pueden sobrescribirse con
//! `ECOTRACK_DISTANCE_RATE` y `ECOTRACK_MATERIAL_RATES`
//! (formato `PET:25:1.5,HDPE:20:1.2`).

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::{env_optional, env_parse, ConfigError};
use crate::models::MaterialType;

/// Tarifa de un material: precio por kg y kg de CO2e por kg reciclado
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialRate {
    pub rate_per_kg: Decimal,
    pub co2_per_kg: f64,
}

impl MaterialRate {
    pub fn new(rate_per_kg: Decimal, co2_per_kg: f64) -> Self {
        Self { rate_per_kg, co2_per_kg }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Recargo logístico por km recorrido
    pub distance_rate: Decimal,
    /// Tarifa para materiales ausentes de la tabla
    pub default_rate: MaterialRate,
    pub materials: HashMap<MaterialType, MaterialRate>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let materials = [
            (MaterialType::Pet, 25, 1.5),
            (MaterialType::Hdpe, 20, 1.2),
            (MaterialType::Pvc, 10, 0.9),
            (MaterialType::Ldpe, 15, 1.1),
            (MaterialType::Pp, 18, 1.3),
            (MaterialType::Ps, 12, 1.0),
            (MaterialType::Other, 8, 0.8),
        ]
        .into_iter()
        .map(|(material, rate, co2)| (material, MaterialRate::new(Decimal::from(rate), co2)))
        .collect();

        Self {
            distance_rate: Decimal::from(70),
            default_rate: MaterialRate::new(Decimal::from(8), 0.8),
            materials,
        }
    }
}

impl PricingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.distance_rate = env_parse("ECOTRACK_DISTANCE_RATE", config.distance_rate)?;
        if config.distance_rate < Decimal::ZERO {
            return Err(ConfigError::invalid("ECOTRACK_DISTANCE_RATE", "must not be negative"));
        }

        if let Some(raw) = env_optional("ECOTRACK_MATERIAL_RATES") {
            for (material, rate) in parse_material_rates(&raw)? {
                config.materials.insert(material, rate);
            }
        }

        Ok(config)
    }

    /// Tarifa efectiva para un material, con la tarifa por defecto como respaldo
    pub fn rate_for(&self, material: MaterialType) -> MaterialRate {
        self.materials.get(&material).copied().unwrap_or(self.default_rate)
    }
}

/// Parsear `MATERIAL:precio:co2` separados por comas
pub fn parse_material_rates(raw: &str) -> Result<Vec<(MaterialType, MaterialRate)>, ConfigError> {
    const KEY: &str = "ECOTRACK_MATERIAL_RATES";

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [material, rate, co2] = parts.as_slice() else {
                return Err(ConfigError::invalid(KEY, format!("expected MATERIAL:rate:co2, got '{}'", entry)));
            };

            let material = material
                .parse::<MaterialType>()
                .map_err(|e| ConfigError::invalid(KEY, e))?;
            let rate = Decimal::from_str(rate)
                .map_err(|e| ConfigError::invalid(KEY, format!("rate '{}': {}", rate, e)))?;
            let co2 = co2
                .parse::<f64>()
                .map_err(|e| ConfigError::invalid(KEY, format!("co2 '{}': {}", co2, e)))?;

            if rate < Decimal::ZERO || co2 < 0.0 || !co2.is_finite() {
                return Err(ConfigError::invalid(KEY, format!("negative values in '{}'", entry)));
            }

            Ok((material, MaterialRate::new(rate, co2)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_catalog() {
        let config = PricingConfig::default();
        for material in MaterialType::ALL {
            assert!(config.materials.contains_key(&material), "missing {}", material);
        }
        assert_eq!(config.distance_rate, Decimal::from(70));
    }

    #[test]
    fn test_rate_for_falls_back_to_default() {
        let mut config = PricingConfig::default();
        config.materials.remove(&MaterialType::Ps);
        assert_eq!(config.rate_for(MaterialType::Ps), config.default_rate);
        assert_eq!(config.rate_for(MaterialType::Pet).rate_per_kg, Decimal::from(25));
    }

    #[test]
    fn test_parse_material_rates() {
        let parsed = parse_material_rates("PET:30:1.6, pp:19.5:1.25").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, MaterialType::Pet);
        assert_eq!(parsed[0].1.rate_per_kg, Decimal::from(30));
        assert_eq!(parsed[1].0, MaterialType::Pp);
        assert_eq!(parsed[1].1.rate_per_kg, Decimal::new(195, 1));
    }

    #[test]
    fn test_parse_material_rates_rejects_garbage() {
        assert!(parse_material_rates("PET:30").is_err());
        assert!(parse_material_rates("ABS:10:1").is_err());
        assert!(parse_material_rates("PET:-1:1").is_err());
        assert!(parse_material_rates("PET:abc:1").is_err());
    }
}
