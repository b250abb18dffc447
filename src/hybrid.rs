//! # Hybrid Encryption
//!
//! AES-256-GCM for the message body, RSA-OAEP for the one-time AES key.
//!
//! All outputs are base64 text so they can be placed straight into a
//! [`SecureMessage`](crate::contract::SecureMessage).
//!
//! ---
//!
//! # 混合加密
//!
//! 消息正文使用一次性AES密钥加密，该密钥再用接收方的RSA-OAEP公钥封装。

use crate::asymmetric::systems::traditional::rsa_oaep::{
    EncryptionPrivateKey, EncryptionPublicKey, RsaOaepSystem,
};
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::utils::{from_base64, to_base64};
use crate::error::{Error, Result};
use crate::symmetric::systems::aes_gcm::{AesGcmKey, AesGcmSystem};
use crate::symmetric::traits::SymmetricCryptographicSystem;

/// One-time key protecting a single message body.
pub type SymmetricKey = AesGcmKey;

pub fn generate_symmetric_key() -> Result<SymmetricKey> {
    AesGcmSystem::generate_key().map_err(|e| Error::KeyGeneration(e.to_string()))
}

/// Encrypts `plaintext` under a fresh random nonce.
pub fn encrypt_message(plaintext: &str, key: &SymmetricKey) -> Result<String> {
    let sealed = AesGcmSystem::encrypt(key, plaintext.as_bytes(), None)
        .map_err(|e| Error::Encryption(e.to_string()))?;
    Ok(to_base64(&sealed))
}

/// Any failure here (malformed input, wrong key, modified ciphertext) is
/// reported as the same [`Error::Decryption`].
pub fn decrypt_message(encrypted: &str, key: &SymmetricKey) -> Result<String> {
    let sealed = from_base64(encrypted).map_err(|_| Error::Decryption)?;
    let plaintext = AesGcmSystem::decrypt(key, &sealed, None).map_err(|_| Error::Decryption)?;
    String::from_utf8(plaintext).map_err(|_| Error::Decryption)
}

/// Wraps the raw symmetric key for the holder of `recipient_public_key`.
pub fn encrypt_symmetric_key(
    key: &SymmetricKey,
    recipient_public_key: &EncryptionPublicKey,
) -> Result<String> {
    let raw = AesGcmSystem::export_key(key);
    let wrapped = RsaOaepSystem::encrypt(recipient_public_key, &raw)
        .map_err(|e| Error::KeyWrap(e.to_string()))?;
    Ok(to_base64(&wrapped))
}

pub fn decrypt_symmetric_key(
    wrapped: &str,
    recipient_private_key: &EncryptionPrivateKey,
) -> Result<SymmetricKey> {
    let wrapped = from_base64(wrapped).map_err(|e| Error::KeyUnwrap(e.to_string()))?;
    let raw = zeroize::Zeroizing::new(
        RsaOaepSystem::decrypt(recipient_private_key, &wrapped)
            .map_err(|e| Error::KeyUnwrap(e.to_string()))?,
    );
    AesGcmSystem::import_key(&raw).map_err(|e| Error::KeyUnwrap(e.to_string()))
}
