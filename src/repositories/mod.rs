//! Repositorios
//!
//! Interfaz de persistencia del núcleo. Cada operación de escritura que
//! depende de un estado previo (transición de pedido, selección de ruta) se
//! ejecuta como una unidad atómica dentro del store: escritura condicional
//! o transacción.

pub mod memory;
pub mod order_repository;
pub mod postgres;
pub mod route_repository;
pub mod user_repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{LogisticRoute, Order, OrderStatus, Role, RoleSource, RouteSelection, User};
use crate::utils::errors::AppResult;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Resultado de una transición condicional de estado
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Applied(Order),
    /// El pedido existe pero no estaba en el estado esperado
    Rejected { current: OrderStatus },
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Falla con `Conflict` si el email ya existe
    async fn insert_user(&self, user: User) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users_by_role(&self, role: Role) -> AppResult<Vec<User>>;
    async fn update_user_role(&self, id: Uuid, role: Role, source: RoleSource) -> AppResult<User>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_order(&self, order: Order) -> AppResult<Order>;
    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>>;
    /// Pedidos de un dueño, o todos si `owner` es `None`
    async fn list_orders(&self, owner: Option<Uuid>) -> AppResult<Vec<Order>>;
    /// Cambia el estado solo si el actual es `expected`
    async fn transition_order(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> AppResult<TransitionOutcome>;
}

#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Inserta ruta y opciones; `DuplicateRoute` si el pedido ya tiene ruta
    async fn insert_route(&self, route: LogisticRoute) -> AppResult<LogisticRoute>;
    async fn find_route(&self, id: Uuid) -> AppResult<Option<LogisticRoute>>;
    async fn find_route_by_order(&self, order_id: Uuid) -> AppResult<Option<LogisticRoute>>;
    /// Fija la opción elegida y pasa el pedido de `routed` a `accepted`
    /// en una sola unidad atómica.
    ///
    /// Errores: `NotFound`, `InvalidOption`, `AlreadySelected`,
    /// `InvalidTransition` (pedido fuera de `routed`).
    async fn select_route_option(&self, route_id: Uuid, option_id: Uuid) -> AppResult<RouteSelection>;
}

/// Store completo que consume el flujo de pedidos
pub trait Store: UserRepository + OrderRepository + RouteRepository {}

impl<T> Store for T where T: UserRepository + OrderRepository + RouteRepository {}
