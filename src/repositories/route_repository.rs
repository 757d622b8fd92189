use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use super::postgres::{is_unique_violation, PgStore};
use super::RouteRepository;
use crate::models::{LogisticRoute, LogisticRouteRow, Order, OrderStatus, RouteOption, RouteSelection};
use crate::utils::errors::{not_found_error, AppError, AppResult};

async fn load_options(conn: &mut PgConnection, route_id: Uuid) -> Result<Vec<RouteOption>, sqlx::Error> {
    sqlx::query_as::<_, RouteOption>(
        "SELECT * FROM route_options WHERE route_id = $1 ORDER BY position ASC",
    )
    .bind(route_id)
    .fetch_all(conn)
    .await
}

impl PgStore {
    async fn find_route_where(&self, column: &str, id: Uuid) -> AppResult<Option<LogisticRoute>> {
        let mut conn = self.pool.acquire().await?;

        let query = format!("SELECT * FROM logistic_routes WHERE {} = $1", column);
        let row = sqlx::query_as::<_, LogisticRouteRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let options = load_options(&mut *conn, row.id).await?;
                Ok(Some(LogisticRoute::from_parts(row, options)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RouteRepository for PgStore {
    async fn insert_route(&self, route: LogisticRoute) -> AppResult<LogisticRoute> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO logistic_routes (id, order_id, selected_option_id, distance_km, distance_estimated, created_at, selected_at)
            VALUES ($1, $2, NULL, $3, $4, $5, NULL)
            "#,
        )
        .bind(route.id)
        .bind(route.order_id)
        .bind(route.distance_km)
        .bind(route.distance_estimated)
        .bind(route.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateRoute { order_id: route.order_id }
            } else {
                AppError::Database(e)
            }
        })?;

        for option in &route.options {
            sqlx::query(
                r#"
                INSERT INTO route_options (id, route_id, position, name, estimated_cost, estimated_duration_hours)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(option.id)
            .bind(route.id)
            .bind(option.position)
            .bind(&option.name)
            .bind(option.estimated_cost)
            .bind(option.estimated_duration_hours)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(LogisticRoute {
            selected_option_id: None,
            selected_at: None,
            ..route
        })
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<LogisticRoute>> {
        self.find_route_where("id", id).await
    }

    async fn find_route_by_order(&self, order_id: Uuid) -> AppResult<Option<LogisticRoute>> {
        self.find_route_where("order_id", order_id).await
    }

    async fn select_route_option(&self, route_id: Uuid, option_id: Uuid) -> AppResult<RouteSelection> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE serializa selecciones concurrentes sobre la misma ruta
        let row = sqlx::query_as::<_, LogisticRouteRow>(
            "SELECT * FROM logistic_routes WHERE id = $1 FOR UPDATE",
        )
        .bind(route_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("LogisticRoute", &route_id.to_string()))?;

        if row.selected_option_id.is_some() {
            return Err(AppError::AlreadySelected { route_id });
        }

        let options = load_options(&mut *tx, route_id).await?;
        if !options.iter().any(|option| option.id == option_id) {
            return Err(AppError::InvalidOption { route_id, option_id });
        }

        let now = Utc::now();

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(row.order_id)
        .bind(OrderStatus::Routed)
        .bind(OrderStatus::Accepted)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let order = match order {
            Some(order) => order,
            None => {
                let current = sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = $1")
                    .bind(row.order_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| not_found_error("Order", &row.order_id.to_string()))?;
                return Err(AppError::InvalidTransition {
                    order_id: row.order_id,
                    from: current,
                    to: OrderStatus::Accepted,
                });
            }
        };

        let updated = sqlx::query_as::<_, LogisticRouteRow>(
            r#"
            UPDATE logistic_routes
            SET selected_option_id = $2, selected_at = $3
            WHERE id = $1 AND selected_option_id IS NULL
            RETURNING *
            "#,
        )
        .bind(route_id)
        .bind(option_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::AlreadySelected { route_id })?;

        tx.commit().await?;

        Ok(RouteSelection {
            route: LogisticRoute::from_parts(updated, options),
            order,
        })
    }
}
