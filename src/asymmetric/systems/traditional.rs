//! # Traditional Cryptographic Algorithm Module
//!
//! RSA in its two roles: RSA-OAEP/SHA-256 for wrapping symmetric keys and
//! RSASSA-PKCS1-v1_5/SHA-256 for signatures. Both roles store keys as DER
//! (SPKI for public keys, PKCS#8 for private keys) and re-parse them per
//! operation.
//!
//! ---
//!
//! # 传统加密算法模块
//!
//! 加密与签名使用各自独立的RSA密钥对。

pub mod rsa_oaep;
pub mod rsa_signature;

pub use rsa_oaep::RsaOaepSystem;
pub use rsa_signature::RsaSignatureSystem;

use crate::asymmetric::errors::RsaSystemError;
use crate::common::config::{MAX_RSA_KEY_BITS, MIN_RSA_KEY_BITS};
use crate::common::utils::ZeroizingVec;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};

/// 生成新的RSA密钥，返回 `(SPKI DER, PKCS#8 DER)`
pub(crate) fn generate_der_keypair(
    bits: usize,
) -> Result<(Vec<u8>, ZeroizingVec), RsaSystemError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(RsaSystemError::WeakKey {
            minimum: MIN_RSA_KEY_BITS,
            actual: bits,
        });
    }
    if bits > MAX_RSA_KEY_BITS {
        return Err(RsaSystemError::OversizedKey {
            maximum: MAX_RSA_KEY_BITS,
            actual: bits,
        });
    }

    let mut rng = RsaOsRng;
    let private_key =
        RsaPrivateKey::new(&mut rng, bits).map_err(RsaSystemError::KeyGeneration)?;
    let public_key = RsaPublicKey::from(&private_key);

    let public_der = public_key
        .to_public_key_der()
        .map_err(|e| RsaSystemError::Encoding(format!("导出RSA公钥DER失败: {}", e)))?;
    let private_der = private_key
        .to_pkcs8_der()
        .map_err(|e| RsaSystemError::Encoding(format!("导出RSA私钥DER失败: {}", e)))?;

    Ok((
        public_der.as_bytes().to_vec(),
        ZeroizingVec(private_der.as_bytes().to_vec()),
    ))
}

pub(crate) fn parse_public_der(der: &[u8]) -> Result<RsaPublicKey, RsaSystemError> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| RsaSystemError::Encoding(format!("解析RSA公钥失败: {}", e)))
}

pub(crate) fn parse_private_der(der: &[u8]) -> Result<RsaPrivateKey, RsaSystemError> {
    RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| RsaSystemError::Encoding(format!("解析RSA私钥失败: {}", e)))
}

pub(crate) fn public_der_to_pem(der: &[u8]) -> Result<String, RsaSystemError> {
    parse_public_der(der)?
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| RsaSystemError::Encoding(format!("RSA公钥导出失败: {}", e)))
}

pub(crate) fn private_der_to_pem(der: &[u8]) -> Result<String, RsaSystemError> {
    let pem = parse_private_der(der)?
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| RsaSystemError::Encoding(format!("RSA私钥导出失败: {}", e)))?;
    Ok(pem.to_string())
}

pub(crate) fn public_pem_to_der(pem: &str) -> Result<Vec<u8>, RsaSystemError> {
    let public_key = RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| RsaSystemError::Encoding(format!("导入RSA公钥失败: {}", e)))?;
    let der = public_key
        .to_public_key_der()
        .map_err(|e| RsaSystemError::Encoding(format!("导出RSA公钥DER失败: {}", e)))?;
    Ok(der.as_bytes().to_vec())
}

pub(crate) fn private_pem_to_der(pem: &str) -> Result<ZeroizingVec, RsaSystemError> {
    let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
        .map_err(|e| RsaSystemError::Encoding(format!("导入RSA私钥失败: {}", e)))?;
    let der = private_key
        .to_pkcs8_der()
        .map_err(|e| RsaSystemError::Encoding(format!("导出RSA私钥DER失败: {}", e)))?;
    Ok(ZeroizingVec(der.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_key_size_rejected() {
        let result = generate_der_keypair(1024);
        assert!(matches!(
            result,
            Err(RsaSystemError::WeakKey {
                minimum: 2048,
                actual: 1024
            })
        ));
    }

    #[test]
    fn test_oversized_key_rejected() {
        assert!(matches!(
            generate_der_keypair(4104),
            Err(RsaSystemError::OversizedKey {
                maximum: 4096,
                actual: 4104
            })
        ));
    }

    #[test]
    fn test_garbage_der_rejected() {
        assert!(parse_public_der(b"not der").is_err());
        assert!(parse_private_der(b"not der").is_err());
        assert!(public_pem_to_der("not-a-valid-pem").is_err());
        assert!(private_pem_to_der("not-a-valid-pem").is_err());
    }
}
