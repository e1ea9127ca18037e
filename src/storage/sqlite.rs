//! SQLite storage engine.
//!
//! One table, created on open if missing:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS students (
//!     id    INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name  TEXT NOT NULL,
//!     email TEXT NOT NULL,
//!     age   INTEGER NOT NULL
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use super::{Storage, StorageError};
use crate::student::Student;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id    INTEGER PRIMARY KEY AUTOINCREMENT,
        name  TEXT NOT NULL,
        email TEXT NOT NULL,
        age   INTEGER NOT NULL
    )
"#;

/// [`Storage`] backed by a SQLite connection pool.
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database file at `path`, along with any
    /// missing parent directories, and ensures the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::internal(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            StorageError::internal(format!(
                "failed to open database at {}: {e}",
                path.display()
            ))
        })?;

        let storage = Self { pool };
        storage.initialize_schema().await?;
        debug!(path = %path.display(), "sqlite storage opened");
        Ok(storage)
    }

    /// A private in-memory database, for tests.
    ///
    /// Each SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that never expires.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::internal(format!("failed to open in-memory database: {e}")))?;

        let storage = Self { pool };
        storage.initialize_schema().await?;
        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to create schema: {e}")))?;
        Ok(())
    }
}

fn student_from_row(row: &SqliteRow) -> Result<Student, StorageError> {
    let decode = |e: sqlx::Error| StorageError::internal(format!("failed to decode student row: {e}"));
    Ok(Student {
        id: row.try_get("id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        age: row.try_get("age").map_err(decode)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_student(&self, name: &str, email: &str, age: i64) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(age)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to insert student: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Student, StorageError> {
        let row = sqlx::query("SELECT id, name, email, age FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to fetch student: {e}")))?;

        match row {
            Some(row) => student_from_row(&row),
            None => Err(StorageError::NotFound { id }),
        }
    }

    async fn get_students(&self) -> Result<Vec<Student>, StorageError> {
        let rows = sqlx::query("SELECT id, name, email, age FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to list students: {e}")))?;

        rows.iter().map(student_from_row).collect()
    }

    async fn update_student(
        &self,
        id: i64,
        name: &str,
        email: &str,
        age: i64,
    ) -> Result<Student, StorageError> {
        let row = sqlx::query(
            "UPDATE students SET name = ?, email = ?, age = ? WHERE id = ?
             RETURNING id, name, email, age",
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to update student: {e}")))?;

        match row {
            Some(row) => student_from_row(&row),
            None => Err(StorageError::NotFound { id }),
        }
    }

    async fn delete_student(&self, id: i64) -> Result<i64, StorageError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("failed to delete student: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { id });
        }
        Ok(id)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::internal(format!("database unreachable: {e}")))?;
        Ok(())
    }
}
