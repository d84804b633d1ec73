//! Browser `localStorage` as the demo's key/value store

use metering_demo_core::errors::{StoreError, StoreResult};
use metering_demo_core::KeyValueStore;
use web_sys::{Storage, Window};

use crate::utils;

/// Get browser's localStorage
fn get_local_storage() -> StoreResult<Storage> {
    let window: Window =
        web_sys::window().ok_or_else(|| StoreError::Unavailable("no window object".into()))?;
    window
        .local_storage()
        .map_err(|e| StoreError::Unavailable(utils::describe(&e)))?
        .ok_or_else(|| StoreError::Unavailable("localStorage is not available".into()))
}

/// Store backed by `window.localStorage`.
///
/// Access failures (storage disabled, quota exceeded) surface as
/// [`StoreError::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        get_local_storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(utils::describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        get_local_storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(utils::describe(&e)))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        get_local_storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(utils::describe(&e)))
    }
}
