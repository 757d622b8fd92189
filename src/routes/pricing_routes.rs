use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::dto::{PriceQuoteQuery, PriceQuoteResponse};
use crate::state::AppState;
use crate::utils::errors::{invalid_input_error, AppError};

pub fn create_pricing_router() -> Router<AppState> {
    Router::new().route("/quote", get(quote))
}

/// Presupuesto sin crear pedido. Con dirección, la distancia se pide al
/// geocoding sin distancia de respaldo.
async fn quote(
    State(state): State<AppState>,
    Query(query): Query<PriceQuoteQuery>,
) -> Result<Json<PriceQuoteResponse>, AppError> {
    query.validate()?;

    let distance_km = match (query.distance_km, query.pickup_address.as_deref().map(str::trim)) {
        (Some(distance_km), _) => distance_km,
        (None, Some(address)) if !address.is_empty() => state.routes.live_distance(address).await?,
        _ => return Err(invalid_input_error("distance_km or pickup_address is required")),
    };

    let quote = state
        .pricing
        .compute_price(query.material_type, query.volume_kg, distance_km)?;

    Ok(Json(PriceQuoteResponse {
        material_type: query.material_type,
        volume_kg: query.volume_kg,
        distance_km,
        quote,
    }))
}
