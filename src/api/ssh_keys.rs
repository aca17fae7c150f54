//! Account SSH key endpoints.

use reqwest::Method;
use serde_json::Value;

use super::types::{NewSshKey, SshKey, SshKeyRemoval};
use super::{ApiError, FluenceClient};

const SSH_KEYS: &str = "ssh_keys";

impl FluenceClient {
    /// Lists SSH keys registered with the account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_ssh_keys(&self) -> Result<Vec<SshKey>, ApiError> {
        self.get(SSH_KEYS).await
    }

    /// Registers a public key. The key material must already be normalised.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn add_ssh_key(&self, key: &NewSshKey) -> Result<SshKey, ApiError> {
        self.request(Method::POST, SSH_KEYS, Some(key)).await
    }

    /// Removes the key with the given fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn remove_ssh_key(&self, fingerprint: &str) -> Result<Value, ApiError> {
        let body = SshKeyRemoval {
            fingerprint: fingerprint.trim().to_owned(),
        };
        self.request(Method::DELETE, SSH_KEYS, Some(&body)).await
    }
}
