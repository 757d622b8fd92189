use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::postgres::PgStore;
use super::{OrderRepository, TransitionOutcome};
use crate::models::{Order, OrderStatus};
use crate::utils::errors::{not_found_error, AppResult};

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert_order(&self, order: Order) -> AppResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, user_id, material_type, volume_kg, pickup_address, distance_km,
                price, environmental_impact, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.material_type)
        .bind(order.volume_kg)
        .bind(&order.pickup_address)
        .bind(order.distance_km)
        .bind(order.price)
        .bind(order.environmental_impact)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn list_orders(&self, owner: Option<Uuid>) -> AppResult<Vec<Order>> {
        let orders = match owner {
            Some(user_id) => {
                sqlx::query_as::<_, Order>(
                    "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(orders)
    }

    async fn transition_order(
        &self,
        id: Uuid,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> AppResult<TransitionOutcome> {
        // Escritura condicional: solo gana quien aún ve el estado esperado
        let updated = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(order) = updated {
            return Ok(TransitionOutcome::Applied(order));
        }

        let current = sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Order", &id.to_string()))?;

        Ok(TransitionOutcome::Rejected { current })
    }
}
