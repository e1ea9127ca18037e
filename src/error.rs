//! Unified error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// The error type returned by the service's fallible startup and serving
/// operations.
///
/// Request-level failures (400, 404, 500 …) are expressed as HTTP
/// [`Response`](crate::Response) values carrying an error envelope, never as
/// an `Error`. This type surfaces infrastructure failures: loading config,
/// opening storage, binding a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}
