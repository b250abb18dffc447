//! `RsaSignatureSystem` 提供了 RSASSA-PKCS1-v1_5 (SHA-256) 签名功能。
//! 该方案是确定性的：同一密钥对同一消息总是产生相同的签名。

use super::{
    generate_der_keypair, parse_private_der, parse_public_der, private_der_to_pem,
    private_pem_to_der, public_der_to_pem, public_pem_to_der,
};
use crate::asymmetric::errors::RsaSystemError;
use crate::asymmetric::traits::SignatureSystem;
use crate::common::config::CryptoConfig;
use crate::common::utils::{ZeroizingVec, base64_bytes};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// RSA签名公钥，内部为SPKI DER编码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPublicKey(#[serde(with = "base64_bytes")] pub Vec<u8>);

impl SigningPublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// RSA签名私钥，内部为PKCS#8 DER编码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPrivateKey(pub ZeroizingVec);

impl SigningPrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// RSA 签名包装器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaSignature(pub Vec<u8>);

impl AsRef<[u8]> for RsaSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

pub struct RsaSignatureSystem;

impl SignatureSystem for RsaSignatureSystem {
    type PublicKey = SigningPublicKey;
    type PrivateKey = SigningPrivateKey;
    type Signature = RsaSignature;
    type Error = RsaSystemError;

    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error> {
        let (public_der, private_der) = generate_der_keypair(config.rsa_key_bits)?;
        Ok((SigningPublicKey(public_der), SigningPrivateKey(private_der)))
    }

    fn sign(
        private_key: &Self::PrivateKey,
        message: &[u8],
    ) -> Result<Self::Signature, Self::Error> {
        let signing_key = SigningKey::<Sha256>::new(parse_private_der(&private_key.0)?);
        let signature = signing_key
            .try_sign(message)
            .map_err(RsaSystemError::Signature)?;
        Ok(RsaSignature(signature.to_vec()))
    }

    fn verify(
        public_key: &Self::PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error> {
        let verifying_key = VerifyingKey::<Sha256>::new(parse_public_der(&public_key.0)?);
        let signature = Signature::try_from(signature).map_err(RsaSystemError::Signature)?;
        verifying_key
            .verify(message, &signature)
            .map_err(RsaSystemError::Signature)
    }

    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error> {
        public_der_to_pem(&public_key.0)
    }

    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error> {
        private_der_to_pem(&private_key.0)
    }

    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error> {
        public_pem_to_der(key_data).map(SigningPublicKey)
    }

    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error> {
        private_pem_to_der(key_data).map(SigningPrivateKey)
    }
}
