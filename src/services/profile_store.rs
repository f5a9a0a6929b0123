use crate::models::FilterProfile;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur when reading or writing profiles
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Persisted key-value home of [`FilterProfile`] records
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<FilterProfile>, ProfileStoreError>;

    async fn save(&self, key: &str, profile: &FilterProfile) -> Result<(), ProfileStoreError>;
}

/// Process-local profile store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    records: RwLock<HashMap<String, FilterProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one record
    pub fn with_profile(key: &str, profile: FilterProfile) -> Self {
        let mut records = HashMap::new();
        records.insert(key.to_string(), profile);
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, key: &str) -> Result<Option<FilterProfile>, ProfileStoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, profile: &FilterProfile) -> Result<(), ProfileStoreError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), profile.clone());
        Ok(())
    }
}

/// PostgreSQL-backed profile store
///
/// Each profile is one JSONB document keyed by its profile key, so fields
/// this service does not know about round-trip untouched.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Create a new PostgreSQL store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, ProfileStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, ProfileStoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn load(&self, key: &str) -> Result<Option<FilterProfile>, ProfileStoreError> {
        let query = r#"
            SELECT data
            FROM user_profiles
            WHERE profile_key = $1
        "#;

        let row = sqlx::query(query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(value): Json<serde_json::Value> = row.try_get("data")?;
                Ok(Some(serde_json::from_value(value)?))
            }
            None => Ok(None),
        }
    }

    /// Upsert the whole record
    async fn save(&self, key: &str, profile: &FilterProfile) -> Result<(), ProfileStoreError> {
        let query = r#"
            INSERT INTO user_profiles (profile_key, data, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (profile_key)
            DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = EXCLUDED.updated_at
        "#;

        let data = serde_json::to_value(profile)?;

        sqlx::query(query)
            .bind(key)
            .bind(Json(data))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Saved profile {}", key);

        Ok(())
    }
}
