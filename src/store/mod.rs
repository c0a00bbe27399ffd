//! Key-value persistence boundary.
//!
//! State lives in four independent blobs, each rewritten whole on every
//! mutation. Nothing coordinates two writers on the same backing store: with
//! two processes open, the last write wins.

pub mod dir;
pub mod memory;
pub mod schema;

use crate::common::error::StoreError;

/// Snapshot of the signed-in account.
pub const SESSION_KEY: &str = "imagerAiUser";
/// Email -> account mapping.
pub const ACCOUNTS_KEY: &str = "imagerAiUsers";
/// List of payment requests.
pub const PAYMENTS_KEY: &str = "imagerAiPayments";
/// Opaque API key for the image generation provider.
pub const API_KEY_OVERRIDE_KEY: &str = "imagerAiApiKeyOverride";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob under `key`. Readers see either the old or the new
    /// value, never a partial write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the blob; absent keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

pub use dir::DirStore;
pub use memory::MemoryStore;
