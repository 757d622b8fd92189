//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL de `migrations/`.

pub mod notification;
pub mod order;
pub mod route;
pub mod user;

pub use notification::NotificationTemplate;
pub use order::{MaterialType, NewOrder, Order, OrderStatus};
pub use route::{LogisticRoute, LogisticRouteRow, RouteOption, RouteSelection};
pub use user::{Role, RoleSource, User};
