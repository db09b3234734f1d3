//! Shared handler state.

use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    keys::{Ed25519KeyGenerator, KeyPairGenerator},
    services::search::SearchOptions,
    store::ProfileStore,
};

/// Collaborators injected into every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub clock: Arc<dyn Clock>,
    pub keys: Arc<dyn KeyPairGenerator>,
    pub search: SearchOptions,
}

impl AppState {
    /// Production wiring: wall clock and Ed25519 keys.
    pub fn new(store: Arc<dyn ProfileStore>, search: SearchOptions) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            keys: Arc::new(Ed25519KeyGenerator),
            search,
        }
    }
}
