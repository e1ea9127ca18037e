//! HTTP handlers and the state they share.

pub mod student;

use std::sync::Arc;

use crate::storage::Storage;
use crate::validation::Validator;

/// Everything a handler needs, cloned into each request's future.
///
/// Both members are behind `Arc`; a clone is two reference-count bumps.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub validator: Arc<Validator>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, validator: Arc::new(Validator::new()) }
    }
}
