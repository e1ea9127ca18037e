//! Persistence for student records.
//!
//! Handlers only see the [`Storage`] trait. [`SqliteStorage`] is the engine
//! the binary runs on.

mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::student::Student;

pub use sqlite::SqliteStorage;

/// Errors a storage operation can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No student has this id.
    #[error("no student found with id {id}")]
    NotFound { id: i64 },

    /// Anything else: connection, SQL, schema, decoding.
    #[error("{0}")]
    Internal(String),
}

impl StorageError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// The operations the student handlers depend on.
///
/// Implementations serialize concurrent writes themselves; callers hold no
/// locks and never retry.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a new row and returns its storage-assigned id.
    async fn create_student(&self, name: &str, email: &str, age: i64) -> Result<i64, StorageError>;

    async fn get_student_by_id(&self, id: i64) -> Result<Student, StorageError>;

    /// Every student, ordered by id.
    async fn get_students(&self) -> Result<Vec<Student>, StorageError>;

    /// Replaces the mutable fields of row `id` and returns the stored record.
    async fn update_student(
        &self,
        id: i64,
        name: &str,
        email: &str,
        age: i64,
    ) -> Result<Student, StorageError>;

    /// Removes row `id` and returns the id that was removed.
    async fn delete_student(&self, id: i64) -> Result<i64, StorageError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), StorageError>;
}
