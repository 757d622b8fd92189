//! Servicio de geocoding y distancias
//!
//! `GeoDistance` es la interfaz que consume el generador de rutas.
//! `MapboxGeoClient` resuelve direcciones con la API de geocoding v6 de
//! Mapbox y calcula la distancia por carretera aproximada (haversine por
//! un factor de carretera).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::errors::AppError;

/// Coordenadas GPS
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("geocoding service is not configured")]
    NotConfigured,

    #[error("no coordinates found for address '{0}'")]
    AddressNotFound(String),

    #[error("geocoding failed with status {0}")]
    Status(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl From<GeoError> for AppError {
    fn from(error: GeoError) -> Self {
        AppError::GeoUnavailable(error.to_string())
    }
}

#[async_trait]
pub trait GeoDistance: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeoError>;

    /// Distancia en km entre dos direcciones
    async fn distance_km(&self, origin: &str, destination: &str) -> Result<f64, GeoError> {
        let (from, to) = futures::future::try_join(self.geocode(origin), self.geocode(destination)).await?;
        Ok(haversine_km(from, to))
    }
}

/// Distancia en línea recta sobre la esfera terrestre
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingResponse {
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
    properties: MapboxProperties,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<f64>, // [longitude, latitude]
}

#[derive(Debug, Deserialize)]
struct MapboxProperties {
    full_address: Option<String>,
    name: Option<String>,
}

pub struct MapboxGeoClient {
    mapbox_token: String,
    road_factor: f64,
    client: reqwest::Client,
}

impl MapboxGeoClient {
    pub fn new(mapbox_token: String, road_factor: f64, timeout: Duration) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            mapbox_token,
            road_factor,
            client,
        })
    }
}

#[async_trait]
impl GeoDistance for MapboxGeoClient {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeoError> {
        log::info!("🗺️ Geocoding address: {}", address);

        let url = format!(
            "https://api.mapbox.com/search/geocode/v6/forward?q={}&access_token={}&limit=1",
            urlencoding::encode(address),
            self.mapbox_token
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "EcoTrack/1.0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("❌ Geocoding failed with status {} for: {}", status, address);
            return Err(GeoError::Status(status.as_u16()));
        }

        let body: MapboxGeocodingResponse = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        // Extraer la primera feature (resultado más relevante)
        let feature = body
            .features
            .first()
            .ok_or_else(|| GeoError::AddressNotFound(address.to_string()))?;

        match feature.geometry.coordinates.as_slice() {
            [lng, lat, ..] => {
                let label = feature
                    .properties
                    .full_address
                    .as_deref()
                    .or(feature.properties.name.as_deref())
                    .unwrap_or(address);
                log::info!("✅ Geocoding successful: {} -> ({}, {})", label, lat, lng);
                Ok(Coordinates { lat: *lat, lng: *lng })
            }
            _ => {
                log::warn!("⚠️ No coordinates found for address: {}", address);
                Err(GeoError::AddressNotFound(address.to_string()))
            }
        }
    }

    async fn distance_km(&self, origin: &str, destination: &str) -> Result<f64, GeoError> {
        let (from, to) = futures::future::try_join(self.geocode(origin), self.geocode(destination)).await?;
        Ok(haversine_km(from, to) * self.road_factor)
    }
}

/// Cliente para despliegues sin token: siempre falla, y el generador de
/// rutas recurre a la distancia por defecto.
pub struct UnconfiguredGeo;

#[async_trait]
impl GeoDistance for UnconfiguredGeo {
    async fn geocode(&self, _address: &str) -> Result<Coordinates, GeoError> {
        Err(GeoError::NotConfigured)
    }
}
