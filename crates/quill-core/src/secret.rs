//! Credential vault trait.
//!
//! Defines the interface for secure API key storage, keyed by endpoint id.
//! Keys are never part of any persisted project document.

use crate::error::Result;
use async_trait::async_trait;

/// Secure storage for per-endpoint API keys.
///
/// # Security Note
///
/// Implementations must keep keys out of error messages and logs.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Returns whether a non-empty key is stored for the endpoint.
    async fn has_key(&self, endpoint_id: &str) -> Result<bool>;

    /// Returns the stored key. A missing key is a `Credential` error.
    async fn get_key(&self, endpoint_id: &str) -> Result<String>;

    async fn set_key(&self, endpoint_id: &str, key: &str) -> Result<()>;

    /// Deletes the key; deleting a missing key is not an error.
    async fn delete_key(&self, endpoint_id: &str) -> Result<()>;
}
