//! DTOs de la API HTTP

pub mod api_response;
pub mod order_dto;
pub mod user_dto;

pub use api_response::ApiResponse;
pub use order_dto::*;
pub use user_dto::*;
