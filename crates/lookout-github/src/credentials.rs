//! Decoding of the opaque client id issued when a repository is enrolled.
//!
//! The client id is base64 over a small JSON document naming the repository
//! the credential was issued for. Decoding it locally lets the notifier
//! derive its target without a round trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// Fields carried inside a client id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedCredential {
    pub owner: String,
    pub repository: String,
    #[serde(default)]
    pub installation_id: Option<u64>,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("client id is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("client id payload is not the expected JSON document: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Decode a client id into the repository identity it was issued for.
pub fn decode_client_id(client_id: &str) -> Result<DecodedCredential, CredentialError> {
    let raw = STANDARD.decode(client_id.trim())?;
    Ok(serde_json::from_slice(&raw)?)
}

// ── Tests ──
