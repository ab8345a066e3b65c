//! Database service for polystep-service.

use crate::models::{NewUser, NewVocabularyEntry, User, VocabularyEntry};
use crate::services::metrics::record_db_query;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool, creating the database file if it is missing.
    ///
    /// `sqlite::memory:` gives every connection its own database, so callers
    /// using it must pass `max_connections = 1`.
    #[instrument(skip(database_url), fields(service = "polystep-service"))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        info!(max_connections = max_connections, "Connecting to SQLite");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Invalid database URL: {}", e))
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    /// Create a user. The `UNIQUE` constraint on `username` decides conflicts,
    /// so two concurrent requests for the same name cannot both succeed.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: &NewUser) -> Result<User, AppError> {
        let started = Instant::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES (?)
            RETURNING id, username
            "#,
        )
        .bind(&input.username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Username already exists"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        record_db_query("create_user", started.elapsed());

        info!(user_id = user.id, "User created");

        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Vocabulary Operations
    // -------------------------------------------------------------------------

    /// List every vocabulary entry in insertion order.
    #[instrument(skip(self))]
    pub async fn list_vocabulary(&self) -> Result<Vec<VocabularyEntry>, AppError> {
        let started = Instant::now();

        let entries = sqlx::query_as::<_, VocabularyEntry>(
            r#"
            SELECT id, word, translation, example, source
            FROM vocabulary
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list vocabulary: {}", e))
        })?;

        record_db_query("list_vocabulary", started.elapsed());

        Ok(entries)
    }

    #[instrument(skip(self, input), fields(word = %input.word, source = %input.source))]
    pub async fn add_vocabulary(
        &self,
        input: &NewVocabularyEntry,
    ) -> Result<VocabularyEntry, AppError> {
        let started = Instant::now();

        let entry = sqlx::query_as::<_, VocabularyEntry>(
            r#"
            INSERT INTO vocabulary (word, translation, example, source)
            VALUES (?, ?, ?, ?)
            RETURNING id, word, translation, example, source
            "#,
        )
        .bind(&input.word)
        .bind(&input.translation)
        .bind(&input.example)
        .bind(&input.source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to add vocabulary entry: {}", e))
        })?;

        record_db_query("add_vocabulary", started.elapsed());

        info!(entry_id = entry.id, "Vocabulary entry added");

        Ok(entry)
    }
}
