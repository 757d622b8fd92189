//! Store PostgreSQL
//!
//! Las implementaciones de cada repositorio viven en `user_repository.rs`,
//! `order_repository.rs` y `route_repository.rs`.

use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pub(super) pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Detectar violaciones de restricciones UNIQUE
pub(super) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}
