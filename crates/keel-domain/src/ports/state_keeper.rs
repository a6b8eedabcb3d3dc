//! State Keeper Port
//!
//! Defines the contract for saving state across process recreation. The
//! storage format behind the port is up to the implementation.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// State keeper interface for keyed state persistence
pub trait StateKeeper: Send + Sync {
    /// Save state under a key
    fn save_state(&self, key: &str, state: serde_json::Value) -> Result<()>;

    /// Retrieve state saved under a key
    fn retrieve_state(&self, key: &str) -> Result<Option<serde_json::Value>>;
}

/// Typed helpers over [`StateKeeper`]
pub trait StateKeeperExt {
    /// Serialize and save a value
    fn save_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<()>;

    /// Retrieve and deserialize a value
    fn retrieve_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;
}

impl<K: StateKeeper + ?Sized> StateKeeperExt for K {
    fn save_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.save_state(key, serde_json::to_value(value)?)
    }

    fn retrieve_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.retrieve_state(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
