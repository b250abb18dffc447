//! `RsaOaepSystem` 提供了基于 RSA-OAEP (SHA-256) 的非对称加解密功能。
//! 在本库中，它只用于封装每条消息的对称密钥。

use super::{
    generate_der_keypair, parse_private_der, parse_public_der, private_der_to_pem,
    private_pem_to_der, public_der_to_pem, public_pem_to_der,
};
use crate::asymmetric::errors::RsaSystemError;
use crate::asymmetric::traits::AsymmetricCryptographicSystem;
use crate::common::config::CryptoConfig;
use crate::common::utils::{ZeroizingVec, base64_bytes};
use rsa::Oaep;
use rsa::rand_core::OsRng as RsaOsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// RSA加密公钥，内部为SPKI DER编码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionPublicKey(#[serde(with = "base64_bytes")] pub Vec<u8>);

impl EncryptionPublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// RSA加密私钥，内部为PKCS#8 DER编码，离开作用域时自动清零
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionPrivateKey(pub ZeroizingVec);

impl EncryptionPrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// RSA-OAEP 加密系统实现
pub struct RsaOaepSystem;

impl AsymmetricCryptographicSystem for RsaOaepSystem {
    type PublicKey = EncryptionPublicKey;
    type PrivateKey = EncryptionPrivateKey;
    type Error = RsaSystemError;

    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error> {
        let (public_der, private_der) = generate_der_keypair(config.rsa_key_bits)?;
        Ok((
            EncryptionPublicKey(public_der),
            EncryptionPrivateKey(private_der),
        ))
    }

    fn encrypt(public_key: &Self::PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let public_key = parse_public_der(&public_key.0)?;
        let mut rng = RsaOsRng;
        public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(RsaSystemError::Oaep)
    }

    fn decrypt(
        private_key: &Self::PrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Self::Error> {
        let private_key = parse_private_der(&private_key.0)?;
        private_key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(RsaSystemError::Oaep)
    }

    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error> {
        public_der_to_pem(&public_key.0)
    }

    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error> {
        private_der_to_pem(&private_key.0)
    }

    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error> {
        public_pem_to_der(key_data).map(EncryptionPublicKey)
    }

    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error> {
        private_pem_to_der(key_data).map(EncryptionPrivateKey)
    }
}
