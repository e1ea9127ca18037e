//! The service's route table.

use std::sync::Arc;

use crate::handlers::{AppState, student};
use crate::health;
use crate::method::Method;
use crate::router::Router;
use crate::storage::Storage;

/// Builds the full router over `storage`.
///
/// | Method | Path |
/// |---|---|
/// | POST | `/api/students` |
/// | GET | `/api/students/{id}` |
/// | GET | `/api/students` |
/// | PUT | `/api/students/{id}` |
/// | DELETE | `/api/students/{id}` |
/// | GET | `/healthz`, `/readyz` |
pub fn router(storage: Arc<dyn Storage>) -> Router {
    let state = AppState::new(storage);

    Router::new()
        .on(Method::Post,   "/api/students",      student::create(state.clone()))
        .on(Method::Get,    "/api/students/{id}", student::get_by_id(state.clone()))
        .on(Method::Get,    "/api/students",      student::list(state.clone()))
        .on(Method::Put,    "/api/students/{id}", student::update(state.clone()))
        .on(Method::Delete, "/api/students/{id}", student::delete(state.clone()))
        .on(Method::Get,    "/healthz",           health::liveness)
        .on(Method::Get,    "/readyz",            health::readiness(state))
}
