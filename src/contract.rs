//! # Data Contract
//!
//! Defines the data structures handed between the parties, the certificate
//! authority, and whatever collaborator displays them.
//!
//! Binary material travels as base64 text, digests as lowercase hex, and
//! timestamps serialize as RFC 3339. None of these records carry secret key
//! material.
//!
//! ---
//!
//! # 数据契约
//!
//! 参与方、证书颁发机构与展示方之间传递的数据结构。

use crate::asymmetric::systems::traditional::rsa_signature::SigningPublicKey;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two parties of the simulated exchange.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PartyId {
    Alice,
    Bob,
}

impl PartyId {
    /// The other party.
    pub fn peer(self) -> Self {
        match self {
            PartyId::Alice => PartyId::Bob,
            PartyId::Bob => PartyId::Alice,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartyId::Alice => "alice",
            PartyId::Bob => "bob",
        }
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binds a subject identity to a signing public key.
///
/// `ca_signature` is a placeholder string derived from the serial number, not
/// a signature over the certificate fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub subject: String,
    pub issuer: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    /// Hex-encoded, unique per issuance.
    pub serial_number: String,
    pub public_key: SigningPublicKey,
    pub ca_signature: String,
}

/// The envelope for one transmitted message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecureMessage {
    pub sender: PartyId,
    /// base64(`nonce ‖ ciphertext ‖ tag`) under the one-time symmetric key.
    pub encrypted_content: String,
    /// The one-time symmetric key under the recipient's RSA-OAEP key, base64.
    pub encrypted_symmetric_key: String,
    /// Signature over `message_hash`, base64.
    pub signature: String,
    /// The sender's certificate.
    pub certificate: Certificate,
    /// SHA-256 of the original plaintext, lowercase hex.
    pub message_hash: String,
    pub timestamp: DateTime<Utc>,
}

impl SecureMessage {
    /// The party the envelope is addressed to.
    pub fn recipient(&self) -> PartyId {
        self.sender.peer()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Coarse outcome shown to the user.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SecurityVerdict {
    Secure,
    /// The message was modified after sending and has not been re-verified.
    Warning,
    Breach,
}
