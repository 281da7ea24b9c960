use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::errors::AppError;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;

use super::{WeatherRecord, WeatherStore};

#[derive(sqlx::FromRow)]
struct WeatherRow {
    id: i32,
    city: String,
    data: Value,
    fetched_at: DateTime<Utc>,
}

impl From<WeatherRow> for WeatherRecord {
    fn from(row: WeatherRow) -> Self {
        Self {
            id: row.id,
            city: row.city,
            payload: row.data,
            fetched_at: row.fetched_at,
        }
    }
}

/// PostgreSQL-backed store; one row per city in the `weather` table.
#[derive(Clone)]
pub struct PgWeatherStore {
    pool: PgPool,
}

impl PgWeatherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather (
                id SERIAL PRIMARY KEY,
                city VARCHAR(100) UNIQUE NOT NULL,
                data JSONB NOT NULL,
                fetched_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for PgWeatherStore {
    async fn get(&self, city: &str) -> Result<Option<WeatherRecord>, AppError> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            SELECT id, city, data, fetched_at
            FROM weather
            WHERE city = $1
            "#,
        )
        .bind(city)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WeatherRecord::from))
    }

    async fn upsert(&self, city: &str, payload: &Value) -> Result<WeatherRecord, AppError> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            INSERT INTO weather (city, data, fetched_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (city) DO UPDATE
            SET data = EXCLUDED.data,
                fetched_at = GREATEST(weather.fetched_at, EXCLUDED.fetched_at)
            RETURNING id, city, data, fetched_at
            "#,
        )
        .bind(city)
        .bind(Json(payload))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_one(&self, city: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM weather WHERE city = $1
            "#,
        )
        .bind(city)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        // Rolled back on drop if either statement fails.
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM weather")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("ALTER SEQUENCE weather_id_seq RESTART WITH 1")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted)
    }

    async fn records(&self) -> Result<Vec<WeatherRecord>, AppError> {
        let rows = sqlx::query_as::<_, WeatherRow>(
            r#"
            SELECT id, city, data, fetched_at
            FROM weather
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WeatherRecord::from).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
