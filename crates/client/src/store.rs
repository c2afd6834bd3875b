//! Persistent session store: a single durable slot holding the signed-in role.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tokio::sync::Mutex;
use trafficdesk_auth::Role;

/// Key under which the role is remembered.
pub const ROLE_KEY: &str = "userRole";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unavailable(format!("{err:#}"))
    }
}

/// Durable key-value slot for the current role.
///
/// Written only by login; cleared by logout and by session expiry.
#[async_trait]
pub trait SessionStore: Send + Sync + core::fmt::Debug {
    async fn load_role(&self) -> Result<Option<Role>, StoreError>;

    async fn save_role(&self, role: &Role) -> Result<(), StoreError>;

    /// Remove the slot. Clearing an empty store is a no-op.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// SQLite-backed store (lazy initialization).
///
/// The database file and table are created on first use, so constructing the
/// store never touches the disk.
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    path: PathBuf,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the pool, initializing if necessary.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create session directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open session store at {:?}", self.path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_slots (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create session_slots table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load_role(&self) -> Result<Option<Role>, StoreError> {
        let pool = self.pool().await?;
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM session_slots WHERE key = ?1")
                .bind(ROLE_KEY)
                .fetch_optional(&pool)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(value.filter(|v| !v.is_empty()).map(Role::new))
    }

    async fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO session_slots (key, value)
            VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(ROLE_KEY)
        .bind(role.as_str())
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::debug!(%role, "role persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        sqlx::query("DELETE FROM session_slots WHERE key = ?1")
            .bind(ROLE_KEY)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        tracing::debug!("persisted role cleared");
        Ok(())
    }
}

/// Process-local store for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    role: std::sync::Mutex<Option<Role>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(role: Role) -> Self {
        Self {
            role: std::sync::Mutex::new(Some(role)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Role>>, StoreError> {
        self.role
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_role(&self) -> Result<Option<Role>, StoreError> {
        Ok(self.slot()?.clone())
    }

    async fn save_role(&self, role: &Role) -> Result<(), StoreError> {
        *self.slot()? = Some(role.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot()? = None;
        Ok(())
    }
}
