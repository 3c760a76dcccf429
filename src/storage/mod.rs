//! Storage
//!
//! A string-keyed blob store standing in for the browser's local storage.
//! Values are whole JSON documents; there is no versioning and no partial
//! update, so the last write for a key wins.

use std::{fmt::Debug, io, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the cart line list.
pub const CART_KEY: &str = "grocery-cart-items";

/// Key holding the most recently completed order.
pub const LAST_ORDER_KEY: &str = "last-order";

/// Key holding the signed-in user marker.
pub const USER_KEY: &str = "user";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing store could not be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Key contains characters the backend cannot store
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Filesystem error
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored value could not be encoded or decoded
    #[error("corrupt stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable string-keyed store.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the raw value for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by the cart, checkout and session.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns a [`StorageError`] if the read fails or the value is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns a [`StorageError`] if encoding or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;

    store.set(key, &raw)
}
