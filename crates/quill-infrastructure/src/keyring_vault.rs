//! OS keychain credential vault.
//!
//! Stores one API key per endpoint id under a single keyring service name.
//! Keys never touch the project directory or any JSON document.

use async_trait::async_trait;
use keyring::Entry;
use quill_core::{CredentialVault, QuillError, Result};

const SERVICE: &str = "quill-writer";

/// Credential vault backed by the operating system keychain.
pub struct KeyringVault {
    service: &'static str,
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringVault {
    pub fn new() -> Self {
        Self { service: SERVICE }
    }

    fn entry(&self, endpoint_id: &str) -> Result<Entry> {
        Entry::new(self.service, endpoint_id)
            .map_err(|e| QuillError::credential(format!("keyring entry unavailable: {e}")))
    }
}

#[async_trait]
impl CredentialVault for KeyringVault {
    async fn has_key(&self, endpoint_id: &str) -> Result<bool> {
        match self.entry(endpoint_id)?.get_password() {
            Ok(value) => Ok(!value.is_empty()),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(QuillError::credential(format!("failed to read API key: {e}"))),
        }
    }

    async fn get_key(&self, endpoint_id: &str) -> Result<String> {
        self.entry(endpoint_id)?
            .get_password()
            .map_err(|e| QuillError::credential(format!("failed to read API key: {e}")))
    }

    async fn set_key(&self, endpoint_id: &str, key: &str) -> Result<()> {
        self.entry(endpoint_id)?
            .set_password(key)
            .map_err(|e| QuillError::credential(format!("failed to store API key: {e}")))
    }

    async fn delete_key(&self, endpoint_id: &str) -> Result<()> {
        match self.entry(endpoint_id)?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(QuillError::credential(format!(
                "failed to delete API key: {e}"
            ))),
        }
    }
}
