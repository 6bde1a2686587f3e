//! Shared helpers for engine tests.

use std::sync::Arc;

use quill_storage::{MockStorage, Storage};

use crate::{Engine, EngineConfig};

/// Build an engine over an in-memory site, keeping a handle to inspect writes.
pub(crate) fn engine(storage: MockStorage) -> (Engine, Arc<MockStorage>) {
    engine_with(storage, EngineConfig::default())
}

/// Build an engine with a custom configuration.
pub(crate) fn engine_with(storage: MockStorage, config: EngineConfig) -> (Engine, Arc<MockStorage>) {
    let storage = Arc::new(storage);
    let site: Arc<dyn Storage> = Arc::<MockStorage>::clone(&storage);
    (Engine::new(site, config), storage)
}
