//! # Message Exchange Protocol
//!
//! [`send_message`] builds a [`SecureMessage`] envelope and
//! [`verify_message`] runs the receiving side's checks in a fixed order:
//!
//! 1. the sender's certificate,
//! 2. unwrapping the symmetric key and decrypting the body,
//! 3. comparing the digest of the decrypted body with `message_hash`,
//! 4. the signature over `message_hash`.
//!
//! The first failing check decides the outcome; later checks are not run.
//! [`session::ExchangeSession`] wraps these functions in a single-slot state
//! machine shared by the two parties.
//!
//! ---
//!
//! # 消息交换协议
//!
//! 验证按固定顺序进行：证书、解密、摘要比对、签名，遇到第一个失败即停止。

pub mod session;

#[cfg(feature = "async-engine")]
pub mod async_;

use crate::asymmetric::systems::traditional::rsa_oaep::EncryptionPublicKey;
use crate::authority::verify_certificate;
use crate::common::utils::constant_time_eq;
use crate::contract::{Certificate, PartyId, SecureMessage, SecurityVerdict};
use crate::error::Result;
use crate::hybrid::{
    decrypt_message, decrypt_symmetric_key, encrypt_message, encrypt_symmetric_key,
    generate_symmetric_key,
};
use crate::integrity::{hash_message, sign_message, verify_signature};
use crate::keys::UserKeyBundle;
use chrono::Utc;
use rand_core::{OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Written over `signature` by [`tamper`].
pub const TAMPERED_SIGNATURE: &str = "tampered_signature_data";
/// Written over `message_hash` by [`tamper`].
pub const TAMPERED_HASH: &str = "tampered_hash_data";
/// Written over `certificate.ca_signature` by [`tamper`]. Empty, so the
/// presence check in [`verify_certificate`] catches it.
pub const TAMPERED_CA_SIGNATURE: &str = "";

/// Why a message was classified as a breach.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BreachReason {
    InvalidCertificate,
    /// The symmetric key could not be unwrapped or the body did not decrypt.
    Undecryptable,
    HashMismatch { expected: String, computed: String },
    InvalidSignature,
}

/// Result of running the verification pipeline over an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Secure { plaintext: String },
    Breach(BreachReason),
}

impl VerificationOutcome {
    pub fn verdict(&self) -> SecurityVerdict {
        match self {
            VerificationOutcome::Secure { .. } => SecurityVerdict::Secure,
            VerificationOutcome::Breach(_) => SecurityVerdict::Breach,
        }
    }

    pub fn plaintext(&self) -> Option<&str> {
        match self {
            VerificationOutcome::Secure { plaintext } => Some(plaintext),
            VerificationOutcome::Breach(_) => None,
        }
    }

    pub fn breach_reason(&self) -> Option<&BreachReason> {
        match self {
            VerificationOutcome::Secure { .. } => None,
            VerificationOutcome::Breach(reason) => Some(reason),
        }
    }
}

/// Encrypts, wraps, hashes and signs `plaintext` into a new envelope.
///
/// Nothing is returned unless every step succeeds.
pub fn send_message(
    plaintext: &str,
    sender: PartyId,
    sender_keys: &UserKeyBundle,
    receiver_encryption_key: &EncryptionPublicKey,
    sender_certificate: &Certificate,
) -> Result<SecureMessage> {
    debug!(%sender, "generating one-time symmetric key");
    let symmetric_key = generate_symmetric_key()?;

    debug!(%sender, "encrypting message body");
    let encrypted_content = encrypt_message(plaintext, &symmetric_key)?;

    debug!(%sender, "wrapping symmetric key for the receiver");
    let encrypted_symmetric_key = encrypt_symmetric_key(&symmetric_key, receiver_encryption_key)?;

    let message_hash = hash_message(plaintext);
    debug!(%sender, "signing message digest");
    let signature = sign_message(&message_hash, &sender_keys.signing().private_key)?;

    info!(%sender, "message sealed");
    Ok(SecureMessage {
        sender,
        encrypted_content,
        encrypted_symmetric_key,
        signature,
        certificate: sender_certificate.clone(),
        message_hash,
        timestamp: Utc::now(),
    })
}

/// Runs the four checks over `message` with the receiver's keys.
///
/// A failing certificate, digest or signature check yields
/// `Ok(VerificationOutcome::Breach(_))`. Failure to unwrap the key or decrypt
/// the body is returned as the underlying error.
pub fn verify_message(
    message: &SecureMessage,
    receiver_keys: &UserKeyBundle,
) -> Result<VerificationOutcome> {
    let receiver = message.recipient();

    debug!(%receiver, "checking sender certificate");
    if !verify_certificate(&message.certificate) {
        warn!(%receiver, serial = %message.certificate.serial_number, "certificate rejected");
        return Ok(VerificationOutcome::Breach(BreachReason::InvalidCertificate));
    }

    debug!(%receiver, "unwrapping symmetric key");
    let symmetric_key = decrypt_symmetric_key(
        &message.encrypted_symmetric_key,
        &receiver_keys.encryption().private_key,
    )?;
    debug!(%receiver, "decrypting message body");
    let plaintext = decrypt_message(&message.encrypted_content, &symmetric_key)?;

    debug!(%receiver, "comparing message digest");
    let computed = hash_message(&plaintext);
    if !constant_time_eq(computed.as_bytes(), message.message_hash.as_bytes()) {
        warn!(%receiver, "digest mismatch");
        return Ok(VerificationOutcome::Breach(BreachReason::HashMismatch {
            expected: message.message_hash.clone(),
            computed,
        }));
    }

    debug!(%receiver, "checking signature");
    if !verify_signature(
        &message.message_hash,
        &message.signature,
        &message.certificate.public_key,
    ) {
        warn!(%receiver, "signature rejected");
        return Ok(VerificationOutcome::Breach(BreachReason::InvalidSignature));
    }

    info!(%receiver, sender = %message.sender, "message verified");
    Ok(VerificationOutcome::Secure { plaintext })
}

/// The envelope field a simulated attacker modifies.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TamperTarget {
    CertificateSignature,
    MessageHash,
    Signature,
}

impl TamperTarget {
    pub const ALL: [TamperTarget; 3] = [
        TamperTarget::CertificateSignature,
        TamperTarget::MessageHash,
        TamperTarget::Signature,
    ];

    /// Picks one of the three targets uniformly at random.
    pub fn random() -> Result<Self> {
        let draw = OsRng.try_next_u32()?;
        Ok(Self::ALL[(draw % 3) as usize])
    }
}

/// Returns a modified copy of `message`; the original is left untouched.
pub fn tamper(message: &SecureMessage, target: TamperTarget) -> SecureMessage {
    let mut tampered = message.clone();
    match target {
        TamperTarget::CertificateSignature => {
            tampered.certificate.ca_signature = TAMPERED_CA_SIGNATURE.to_string();
        }
        TamperTarget::MessageHash => tampered.message_hash = TAMPERED_HASH.to_string(),
        TamperTarget::Signature => tampered.signature = TAMPERED_SIGNATURE.to_string(),
    }
    debug!(?target, "envelope tampered");
    tampered
}
