//! Services module
//!
//! Este módulo contiene la lógica de negocio: precios, generación de rutas,
//! flujo de pedidos, roles y notificaciones. Los colaboradores externos
//! (store, geocoding, envío de notificaciones) entran como traits.

pub mod authorization_service;
pub mod geocoding_service;
pub mod notification_service;
pub mod order_workflow;
pub mod pricing_service;
pub mod role_resolver;
pub mod route_generator;
pub mod user_service;

pub use authorization_service::AuthorizationService;
pub use geocoding_service::{Coordinates, GeoDistance, GeoError, MapboxGeoClient, UnconfiguredGeo};
pub use notification_service::{DispatchReport, NotificationDispatcher, NotificationError, NotificationService};
pub use order_workflow::{CreateOrderInput, OrderCreation, OrderWorkflow, RoutedOrder};
pub use pricing_service::{PriceQuote, PricingEngine};
pub use role_resolver::RoleResolver;
pub use route_generator::{DistanceEstimate, RouteGenerator};
pub use user_service::{RegisterUser, UserService};
