//! Persistence for the `todos` table.
//!
//! # Design
//! Handlers only see the `TodoStore` trait, shared as `Arc<dyn TodoStore>`,
//! so tests can swap in an in-memory or failing store. `SqliteStore` is the
//! production implementation over an sqlx pool; the pool serializes access,
//! so the store is safe to share between concurrently running handlers.
//!
//! Every read filters on `deleted_at IS NULL`; deletes only stamp that column.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::model::{CreateTodo, Todo};

pub type SharedStore = Arc<dyn TodoStore>;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All live rows, ordered by id.
    async fn list(&self) -> Result<Vec<Todo>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Todo>, AppError>;

    /// Inserts a new row and returns it with its assigned id.
    async fn create(&self, input: &CreateTodo) -> Result<Todo, AppError>;

    /// Overwrites every mutable field of `todo`. Returns `None` if the row is
    /// no longer live.
    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, AppError>;

    /// Soft-deletes a live row. Returns whether a row was affected.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

const TODO_COLUMNS: &str = "id, action, completed, created_at, updated_at, deleted_at";

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT NOT NULL DEFAULT '',
    completed BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    deleted_at TEXT NULL
)
"#;

const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_deleted_at ON todos (deleted_at)";

/// Columns an older `todos` table may lack, with the DDL to add them.
/// `ALTER TABLE ADD COLUMN` cannot use non-constant defaults, hence the
/// epoch fallback for timestamps.
const RECONCILED_COLUMNS: &[(&str, &str)] = &[
    ("action", "action TEXT NOT NULL DEFAULT ''"),
    ("completed", "completed BOOLEAN NOT NULL DEFAULT 0"),
    (
        "created_at",
        "created_at TEXT NOT NULL DEFAULT '1970-01-01T00:00:00Z'",
    ),
    (
        "updated_at",
        "updated_at TEXT NOT NULL DEFAULT '1970-01-01T00:00:00Z'",
    ),
    ("deleted_at", "deleted_at TEXT NULL"),
];

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the pool described by `config` and reconciles the schema.
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!("Connecting to SQLite");

        let url = config.url.expose_secret();
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if is_memory_url(url) {
            // Each SQLite memory connection is its own database: keep exactly
            // one, and never let the pool recycle it.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        }
        .connect_with(options)
        .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!("SQLite store ready");
        Ok(store)
    }

    /// A private, empty in-memory database.
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect(&DatabaseConfig {
            url: Secret::new("sqlite::memory:".to_string()),
            max_connections: 1,
        })
        .await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the table and index if absent and adds any missing columns.
    /// Safe to run on every startup.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;

        let existing: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('todos')")
            .fetch_all(&self.pool)
            .await?;

        for (name, ddl) in RECONCILED_COLUMNS {
            if !existing.iter().any(|column| column == name) {
                info!(column = *name, "Adding missing column to todos");
                sqlx::query(&format!("ALTER TABLE todos ADD COLUMN {ddl}"))
                    .execute(&self.pool)
                    .await?;
            }
        }

        sqlx::query(CREATE_INDEX_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl TodoStore for SqliteStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND deleted_at IS NULL LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    #[instrument(skip(self, input))]
    async fn create(&self, input: &CreateTodo) -> Result<Todo, AppError> {
        let now = Utc::now();
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (action, completed, created_at, updated_at) \
             VALUES (?, ?, ?, ?) RETURNING {TODO_COLUMNS}"
        ))
        .bind(&input.action)
        .bind(input.completed)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(todo)
    }

    #[instrument(skip(self, todo), fields(id = todo.id))]
    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, AppError> {
        let saved = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET action = ?, completed = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL RETURNING {TODO_COLUMNS}"
        ))
        .bind(&todo.action)
        .bind(todo.completed)
        .bind(Utc::now())
        .bind(todo.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE todos SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
