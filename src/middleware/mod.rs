//! Middleware del sistema
//!
//! Este módulo contiene el extractor del usuario que actúa y la
//! configuración de CORS.

pub mod acting_user;
pub mod cors;

pub use acting_user::*;
pub use cors::*;
