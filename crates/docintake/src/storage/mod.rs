pub mod local;

pub use local::LocalStorage;

use crate::error::StorageError;

/// Durable home for uploaded bytes. Returns a local path or an object key.
pub trait DocumentStorage: Send + Sync {
    fn save(&self, content: &[u8], filename: &str, user_id: &str) -> Result<String, StorageError>;
}
