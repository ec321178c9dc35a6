//! Shared state for the API layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::store::PanelStore;

/// Shared context for all routes.
///
/// Reads go straight to the store. Mutating handlers hold `write_lock`
/// for their whole read-modify-write so in-process updates are serialized.
/// Other processes writing the same files are not coordinated.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<PanelStore>,
    pub write_lock: Arc<Mutex<()>>,
}

impl ApiContext {
    pub fn new(store: PanelStore) -> Self {
        Self {
            store: Arc::new(store),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
