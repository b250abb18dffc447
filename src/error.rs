//! Defines the custom error type for the `seal-exchange` crate.

use crate::contract::PartyId;
use thiserror::Error;

/// The main error type for the `seal-exchange` crate.
///
/// Verification helpers (`verify_signature`, `verify_certificate`) never
/// produce this type; they collapse every failure into `false`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Wrong key, tag mismatch and malformed input all end up here.
    #[error("could not decrypt the message")]
    Decryption,

    #[error("wrapping the symmetric key failed: {0}")]
    KeyWrap(String),

    #[error("unwrapping the symmetric key failed: {0}")]
    KeyUnwrap(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("random number generation failed: {0}")]
    Randomness(#[from] rand_core::OsError),

    #[error("invalid key material: {0}")]
    Key(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no message is in flight")]
    NoMessage,

    #[error("{0} sent the in-flight message and cannot verify it")]
    NotRecipient(PartyId),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "async-engine")]
    #[error("async task failed: {0}")]
    AsyncTask(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
