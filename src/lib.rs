//! EcoTrack
//!
//! Núcleo logístico de reciclaje: alta de pedidos con precio fijado,
//! generación automática de rutas, selección de opción por logística y
//! propagación de estados con notificaciones.

pub mod clients;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
