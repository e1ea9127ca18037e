//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Does the database answer? |

use tracing::warn;

use crate::handler::Handler;
use crate::handlers::AppState;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Always `200 OK` with body `"ok"`. No dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` / `"ready"` while storage answers a ping, otherwise
/// `503 Service Unavailable`.
pub fn readiness(state: AppState) -> impl Handler {
    move |_req: Request| {
        let state = state.clone();
        async move {
            match state.storage.ping().await {
                Ok(()) => Response::text("ready"),
                Err(e) => {
                    warn!(error = %e, "readiness check failed");
                    Response::builder()
                        .status(Status::ServiceUnavailable)
                        .text("storage unavailable")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::app;
    use crate::storage::{Storage, StorageError};
    use crate::student::Student;

    /// A database that has gone away.
    struct Unreachable;

    #[async_trait]
    impl Storage for Unreachable {
        async fn create_student(&self, _: &str, _: &str, _: i64) -> Result<i64, StorageError> {
            Err(StorageError::internal("connection refused"))
        }
        async fn get_student_by_id(&self, _: i64) -> Result<Student, StorageError> {
            Err(StorageError::internal("connection refused"))
        }
        async fn get_students(&self) -> Result<Vec<Student>, StorageError> {
            Err(StorageError::internal("connection refused"))
        }
        async fn update_student(&self, _: i64, _: &str, _: &str, _: i64) -> Result<Student, StorageError> {
            Err(StorageError::internal("connection refused"))
        }
        async fn delete_student(&self, _: i64) -> Result<i64, StorageError> {
            Err(StorageError::internal("connection refused"))
        }
        async fn ping(&self) -> Result<(), StorageError> {
            Err(StorageError::internal("connection refused"))
        }
    }

    fn get(path: &str) -> http::Request<Bytes> {
        http::Request::builder().uri(path).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn readiness_fails_when_storage_is_down() {
        let router = app::router(Arc::new(Unreachable));

        let res = router.call(get("/readyz")).await;

        assert_eq!(res.status_code(), Status::ServiceUnavailable);
        assert_eq!(res.body(), b"storage unavailable");
    }

    #[tokio::test]
    async fn liveness_ignores_storage() {
        let router = app::router(Arc::new(Unreachable));

        let res = router.call(get("/healthz")).await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(res.body(), b"ok");
    }
}
