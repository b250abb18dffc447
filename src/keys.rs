//! # Key Management
//!
//! Per-party key management.
//!
//! Every party owns two RSA key pairs: one for confidentiality (RSA-OAEP) and
//! one for authenticity (RSASSA-PKCS1-v1_5). They are separate types, are
//! generated independently, and are always regenerated together.
//!
//! ---
//!
//! # 密钥管理
//!
//! 每个参与方持有加密与签名两组独立的RSA密钥对。

use crate::asymmetric::errors::RsaSystemError;
use crate::asymmetric::systems::traditional::rsa_oaep::{
    EncryptionPrivateKey, EncryptionPublicKey, RsaOaepSystem,
};
use crate::asymmetric::systems::traditional::rsa_signature::{
    RsaSignatureSystem, SigningPrivateKey, SigningPublicKey,
};
use crate::asymmetric::traits::{AsymmetricCryptographicSystem, SignatureSystem};
use crate::common::config::CryptoConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A public/private key pair for a single role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair<P, S> {
    pub public_key: P,
    pub private_key: S,
}

pub type EncryptionKeyPair = KeyPair<EncryptionPublicKey, EncryptionPrivateKey>;
pub type SigningKeyPair = KeyPair<SigningPublicKey, SigningPrivateKey>;

/// Generates the RSA-OAEP key pair a party uses to receive symmetric keys.
pub fn generate_encryption_key_pair(config: &CryptoConfig) -> Result<EncryptionKeyPair> {
    let (public_key, private_key) = RsaOaepSystem::generate_keypair(config)
        .map_err(|e| Error::KeyGeneration(e.to_string()))?;
    Ok(KeyPair {
        public_key,
        private_key,
    })
}

/// Generates the RSA key pair a party signs message digests with.
pub fn generate_signature_key_pair(config: &CryptoConfig) -> Result<SigningKeyPair> {
    let (public_key, private_key) = RsaSignatureSystem::generate_keypair(config)
        .map_err(|e| Error::KeyGeneration(e.to_string()))?;
    Ok(KeyPair {
        public_key,
        private_key,
    })
}

/// Both key pairs belonging to one party.
///
/// There is no way to swap a single pair: a bundle is replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserKeyBundle {
    encryption: EncryptionKeyPair,
    signing: SigningKeyPair,
}

impl UserKeyBundle {
    pub fn generate(config: &CryptoConfig) -> Result<Self> {
        debug!(bits = config.rsa_key_bits, "generating key bundle");

        #[cfg(feature = "parallel")]
        let (encryption, signing) = rayon::join(
            || generate_encryption_key_pair(config),
            || generate_signature_key_pair(config),
        );
        #[cfg(not(feature = "parallel"))]
        let (encryption, signing) = (
            generate_encryption_key_pair(config),
            generate_signature_key_pair(config),
        );

        Ok(Self {
            encryption: encryption?,
            signing: signing?,
        })
    }

    /// Assembles a bundle from pairs generated elsewhere.
    pub fn from_key_pairs(encryption: EncryptionKeyPair, signing: SigningKeyPair) -> Self {
        Self {
            encryption,
            signing,
        }
    }

    pub fn encryption(&self) -> &EncryptionKeyPair {
        &self.encryption
    }

    pub fn signing(&self) -> &SigningKeyPair {
        &self.signing
    }

    pub fn encryption_public_key(&self) -> &EncryptionPublicKey {
        &self.encryption.public_key
    }

    pub fn signing_public_key(&self) -> &SigningPublicKey {
        &self.signing.public_key
    }

    /// Exports all four keys as PEM text for transfer across a boundary.
    pub fn export(&self) -> Result<ExportedKeyBundle> {
        let export = |e: RsaSystemError| Error::Key(e.to_string());
        Ok(ExportedKeyBundle {
            encryption_public_key: RsaOaepSystem::export_public_key(&self.encryption.public_key)
                .map_err(export)?,
            encryption_private_key: RsaOaepSystem::export_private_key(
                &self.encryption.private_key,
            )
            .map_err(export)?,
            signing_public_key: RsaSignatureSystem::export_public_key(&self.signing.public_key)
                .map_err(export)?,
            signing_private_key: RsaSignatureSystem::export_private_key(
                &self.signing.private_key,
            )
            .map_err(export)?,
        })
    }
}

/// PEM rendering of a [`UserKeyBundle`]: SPKI for public keys, PKCS#8 for
/// private keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedKeyBundle {
    pub encryption_public_key: String,
    pub encryption_private_key: String,
    pub signing_public_key: String,
    pub signing_private_key: String,
}

impl std::fmt::Debug for ExportedKeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedKeyBundle")
            .field("encryption_public_key", &self.encryption_public_key)
            .field("encryption_private_key", &"[REDACTED]")
            .field("signing_public_key", &self.signing_public_key)
            .field("signing_private_key", &"[REDACTED]")
            .finish()
    }
}

impl ExportedKeyBundle {
    pub fn import(&self) -> Result<UserKeyBundle> {
        let import = |e: RsaSystemError| Error::Key(e.to_string());
        Ok(UserKeyBundle {
            encryption: KeyPair {
                public_key: RsaOaepSystem::import_public_key(&self.encryption_public_key)
                    .map_err(import)?,
                private_key: RsaOaepSystem::import_private_key(&self.encryption_private_key)
                    .map_err(import)?,
            },
            signing: KeyPair {
                public_key: RsaSignatureSystem::import_public_key(&self.signing_public_key)
                    .map_err(import)?,
                private_key: RsaSignatureSystem::import_private_key(&self.signing_private_key)
                    .map_err(import)?,
            },
        })
    }
}
