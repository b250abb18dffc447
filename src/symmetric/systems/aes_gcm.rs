//! AES-256-GCM 对称加密实现
//!
//! 密文格式：`[12字节nonce][密文][16字节tag]`
use crate::common::utils::ZeroizingVec;
use crate::symmetric::traits::SymmetricCryptographicSystem;
use aes_gcm::aead::{Aead, Error as AeadError, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

/// AES-GCM 系统的独立错误类型
#[derive(Error, Debug)]
pub enum AesGcmSystemError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rand_core::OsError),

    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Encryption failed: {0}")]
    EncryptionFailed(#[from] AeadError),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Ciphertext is malformed or truncated: {0}")]
    MalformedCiphertext(String),
}

/// AES-GCM 对称加密系统
#[derive(Debug)]
pub struct AesGcmSystem;

/// 256位 AES-GCM 密钥，离开作用域时自动清零
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AesGcmKey([u8; KEY_SIZE]);

impl std::fmt::Debug for AesGcmKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesGcmKey([REDACTED])")
    }
}

impl SymmetricCryptographicSystem for AesGcmSystem {
    const KEY_SIZE: usize = KEY_SIZE;
    type Key = AesGcmKey;
    type Error = AesGcmSystemError;

    fn generate_key() -> Result<Self::Key, Self::Error> {
        use rand_core::{OsRng, TryRngCore};
        let mut key_bytes = [0u8; KEY_SIZE];
        OsRng.try_fill_bytes(&mut key_bytes)?;
        Ok(AesGcmKey(key_bytes))
    }

    fn encrypt(
        key: &Self::Key,
        plaintext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));
        // 每次加密都必须使用新的nonce
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let sealed = cipher.encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad: additional_data.unwrap_or(&[]),
            },
        )?;

        let mut output = Vec::with_capacity(NONCE_SIZE + sealed.len());
        output.extend_from_slice(nonce.as_slice());
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    fn decrypt(
        key: &Self::Key,
        ciphertext: &[u8],
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, Self::Error> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(AesGcmSystemError::MalformedCiphertext(format!(
                "expected at least {} bytes, got {}",
                NONCE_SIZE + TAG_SIZE,
                ciphertext.len()
            )));
        }

        let (nonce_slice, sealed) = ciphertext.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0));

        cipher
            .decrypt(
                Nonce::from_slice(nonce_slice),
                Payload {
                    msg: sealed,
                    aad: additional_data.unwrap_or(&[]),
                },
            )
            .map_err(|_| AesGcmSystemError::DecryptionFailed)
    }

    fn export_key(key: &Self::Key) -> ZeroizingVec {
        ZeroizingVec(key.0.to_vec())
    }

    fn import_key(key_data: &[u8]) -> Result<Self::Key, Self::Error> {
        let bytes: [u8; KEY_SIZE] = key_data
            .try_into()
            .map_err(|_| AesGcmSystemError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key_data.len(),
            })?;
        Ok(AesGcmKey(bytes))
    }
}
