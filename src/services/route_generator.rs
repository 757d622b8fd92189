//! Generador de rutas logísticas
//!
//! Para cada pedido en `pending` crea una ruta con las opciones configuradas
//! (economy, standard, express por defecto). La distancia se pide al servicio
//! de geocoding con timeout; si falla se usa la distancia de respaldo y la
//! ruta queda marcada como estimada.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::geocoding_service::GeoDistance;
use super::pricing_service::{round_to, MAX_DISTANCE_KM};
use crate::config::RoutingConfig;
use crate::models::{LogisticRoute, Order, OrderStatus, RouteOption};
use crate::repositories::{RouteRepository, Store};
use crate::utils::errors::{AppError, AppResult};

/// Distancia resuelta para un pedido
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimate {
    pub distance_km: f64,
    /// `true` si se usó la distancia de respaldo
    pub estimated: bool,
}

/// Distancia utilizable: finita, no negativa y dentro del máximo tarificable
fn is_plausible(distance_km: f64) -> bool {
    distance_km.is_finite() && (0.0..=MAX_DISTANCE_KM).contains(&distance_km)
}

#[derive(Clone)]
pub struct RouteGenerator {
    store: Arc<dyn Store>,
    geo: Arc<dyn GeoDistance>,
    config: Arc<RoutingConfig>,
}

impl RouteGenerator {
    pub fn new(store: Arc<dyn Store>, geo: Arc<dyn GeoDistance>, config: Arc<RoutingConfig>) -> Self {
        Self { store, geo, config }
    }

    /// Distancia planta -> dirección de recogida; nunca falla
    pub async fn resolve_distance(&self, pickup_address: &str) -> DistanceEstimate {
        let lookup = self.geo.distance_km(&self.config.facility_address, pickup_address);

        match tokio::time::timeout(self.config.geo_timeout, lookup).await {
            Ok(Ok(distance_km)) if is_plausible(distance_km) => DistanceEstimate {
                distance_km: round_to(distance_km, 2),
                estimated: false,
            },
            Ok(Ok(distance_km)) => {
                warn!(
                    address = %pickup_address,
                    distance_km,
                    fallback_km = self.config.fallback_distance_km,
                    "⚠️ Distancia inválida del geocoding, usando distancia de respaldo"
                );
                self.fallback()
            }
            Ok(Err(e)) => {
                warn!(
                    address = %pickup_address,
                    fallback_km = self.config.fallback_distance_km,
                    "⚠️ Geocoding falló ({}), usando distancia de respaldo",
                    e
                );
                self.fallback()
            }
            Err(_) => {
                warn!(
                    address = %pickup_address,
                    timeout_ms = self.config.geo_timeout.as_millis() as u64,
                    fallback_km = self.config.fallback_distance_km,
                    "⏱️ Geocoding sin respuesta, usando distancia de respaldo"
                );
                self.fallback()
            }
        }
    }

    /// Distancia sin respaldo, para presupuestos: falla con `GeoUnavailable`
    pub async fn live_distance(&self, pickup_address: &str) -> AppResult<f64> {
        let lookup = self.geo.distance_km(&self.config.facility_address, pickup_address);

        let distance_km = tokio::time::timeout(self.config.geo_timeout, lookup)
            .await
            .map_err(|_| AppError::GeoUnavailable("geocoding timed out".to_string()))??;

        if !is_plausible(distance_km) {
            return Err(AppError::GeoUnavailable(format!("invalid distance {}", distance_km)));
        }
        Ok(round_to(distance_km, 2))
    }

    fn fallback(&self) -> DistanceEstimate {
        DistanceEstimate {
            distance_km: self.config.fallback_distance_km,
            estimated: true,
        }
    }

    /// Opciones candidatas para una ruta, en el orden configurado
    pub fn build_options(&self, route_id: Uuid, distance_km: f64) -> AppResult<Vec<RouteOption>> {
        let distance = Decimal::from_f64(distance_km)
            .ok_or_else(|| AppError::Internal(format!("distance {} is not representable", distance_km)))?;
        let base_cost = distance
            .checked_mul(self.config.cost_per_km)
            .ok_or_else(|| AppError::Internal(format!("route cost overflow for {} km", distance_km)))?;
        let base_hours = distance_km / self.config.average_speed_kmh + self.config.handling_hours;

        self.config
            .options
            .iter()
            .enumerate()
            .map(|(position, template)| {
                let estimated_cost = base_cost
                    .checked_mul(template.cost_multiplier)
                    .ok_or_else(|| AppError::Internal(format!("route cost overflow for option {}", template.name)))?
                    .round_dp(2);

                Ok(RouteOption {
                    id: Uuid::new_v4(),
                    route_id,
                    position: position as i32,
                    name: template.name.clone(),
                    estimated_cost,
                    estimated_duration_hours: round_to(base_hours * template.duration_multiplier, 2),
                })
            })
            .collect()
    }

    /// Generar y persistir la ruta de un pedido pendiente
    pub async fn generate_routes(&self, order: &Order) -> AppResult<LogisticRoute> {
        self.check_preconditions(order).await?;
        let distance = self.resolve_distance(&order.pickup_address).await;
        self.persist(order, distance).await
    }

    /// Igual que `generate_routes`, con una distancia ya resuelta
    pub async fn generate_routes_with_distance(
        &self,
        order: &Order,
        distance: DistanceEstimate,
    ) -> AppResult<LogisticRoute> {
        self.check_preconditions(order).await?;
        self.persist(order, distance).await
    }

    async fn check_preconditions(&self, order: &Order) -> AppResult<()> {
        if order.status != OrderStatus::Pending {
            return Err(AppError::InvalidTransition {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::Routed,
            });
        }

        if self.store.find_route_by_order(order.id).await?.is_some() {
            return Err(AppError::DuplicateRoute { order_id: order.id });
        }

        Ok(())
    }

    async fn persist(&self, order: &Order, distance: DistanceEstimate) -> AppResult<LogisticRoute> {
        let route_id = Uuid::new_v4();
        let options = self.build_options(route_id, distance.distance_km)?;

        let route = LogisticRoute {
            id: route_id,
            order_id: order.id,
            options,
            selected_option_id: None,
            distance_km: distance.distance_km,
            distance_estimated: distance.estimated,
            created_at: Utc::now(),
            selected_at: None,
        };

        let route = self.store.insert_route(route).await.map_err(|e| match e {
            AppError::DuplicateRoute { .. } => e,
            other => AppError::RouteCreationFailed {
                order_id: order.id,
                reason: other.to_string(),
            },
        })?;

        info!(
            order_id = %order.id,
            route_id = %route.id,
            options = route.options.len(),
            distance_km = route.distance_km,
            distance_estimated = route.distance_estimated,
            "🗺️ Ruta generada"
        );

        Ok(route)
    }
}
