//! # Integrity & Signing
//!
//! Message digests and signatures over them.
//!
//! The signature covers the raw 32 digest bytes (decoded from hex), which the
//! RSASSA-PKCS1-v1_5/SHA-256 scheme hashes once more internally.
//!
//! ---
//!
//! # 完整性与签名
//!
//! SHA-256 十六进制摘要，以及对摘要字节的RSA签名与验证。

use crate::asymmetric::systems::traditional::rsa_signature::{
    RsaSignatureSystem, SigningPrivateKey, SigningPublicKey,
};
use crate::asymmetric::traits::SignatureSystem;
use crate::common::utils::{from_base64, to_base64};
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

/// SHA-256 of the UTF-8 plaintext as lowercase hex.
pub fn hash_message(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

pub fn sign_message(digest_hex: &str, signing_private_key: &SigningPrivateKey) -> Result<String> {
    let digest = hex::decode(digest_hex)
        .map_err(|e| Error::Signing(format!("digest is not valid hex: {e}")))?;
    let signature = RsaSignatureSystem::sign(signing_private_key, &digest)
        .map_err(|e| Error::Signing(e.to_string()))?;
    Ok(to_base64(signature.as_ref()))
}

/// Returns `false` for a bad signature and for any decoding or provider
/// failure alike.
pub fn verify_signature(
    digest_hex: &str,
    signature_b64: &str,
    signing_public_key: &SigningPublicKey,
) -> bool {
    let Ok(digest) = hex::decode(digest_hex) else {
        debug!("digest is not valid hex");
        return false;
    };
    let Ok(signature) = from_base64(signature_b64) else {
        debug!("signature is not valid base64");
        return false;
    };

    match RsaSignatureSystem::verify(signing_public_key, &digest, &signature) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "signature rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::CryptoConfig;
    use crate::keys::{SigningKeyPair, generate_signature_key_pair};
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn signer() -> &'static SigningKeyPair {
        static PAIR: OnceLock<SigningKeyPair> = OnceLock::new();
        PAIR.get_or_init(|| generate_signature_key_pair(&CryptoConfig::default()).unwrap())
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_message("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hash_message(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sign_then_verify() {
        let pair = signer();
        let digest = hash_message("ola");
        let signature = sign_message(&digest, &pair.private_key).unwrap();

        assert!(verify_signature(&digest, &signature, &pair.public_key));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let pair = signer();
        let digest = hash_message("repeat");
        assert_eq!(
            sign_message(&digest, &pair.private_key).unwrap(),
            sign_message(&digest, &pair.private_key).unwrap()
        );
    }

    #[test]
    fn test_every_signature_byte_matters() {
        let pair = signer();
        let digest = hash_message("integrity");
        let signature = from_base64(&sign_message(&digest, &pair.private_key).unwrap()).unwrap();

        for i in (0..signature.len()).step_by(17) {
            let mut mutated = signature.clone();
            mutated[i] ^= 0x01;
            assert!(!verify_signature(&digest, &to_base64(&mutated), &pair.public_key));
        }
    }

    #[test]
    fn test_every_digest_byte_matters() {
        let pair = signer();
        let digest = hash_message("integrity");
        let signature = sign_message(&digest, &pair.private_key).unwrap();
        let raw = hex::decode(&digest).unwrap();

        for i in 0..raw.len() {
            let mut mutated = raw.clone();
            mutated[i] ^= 0x01;
            assert!(!verify_signature(&hex::encode(&mutated), &signature, &pair.public_key));
        }
    }

    #[test]
    fn test_wrong_public_key_rejected() {
        let pair = signer();
        let other = generate_signature_key_pair(&CryptoConfig::default()).unwrap();
        let digest = hash_message("who signed this");
        let signature = sign_message(&digest, &pair.private_key).unwrap();

        assert!(!verify_signature(&digest, &signature, &other.public_key));
    }

    #[test]
    fn test_malformed_inputs_return_false() {
        let pair = signer();
        let digest = hash_message("x");
        let signature = sign_message(&digest, &pair.private_key).unwrap();

        assert!(!verify_signature("tampered_hash_data", &signature, &pair.public_key));
        assert!(!verify_signature(&digest, "tampered_signature_data", &pair.public_key));
        assert!(!verify_signature(&digest, "", &pair.public_key));
    }

    #[test]
    fn test_sign_rejects_non_hex_digest() {
        assert!(matches!(
            sign_message("zz", &signer().private_key),
            Err(Error::Signing(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_digest_is_deterministic_hex(plaintext in ".*") {
            let digest = hash_message(&plaintext);
            prop_assert_eq!(digest.len(), 64);
            prop_assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
            prop_assert_eq!(digest, hash_message(&plaintext));
        }
    }
}
