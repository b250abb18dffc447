use thiserror::Error;

/// RSA 系统的独立错误类型
#[derive(Error, Debug)]
pub enum RsaSystemError {
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    #[error("RSA key of {actual} bits is below the {minimum}-bit minimum")]
    WeakKey { minimum: usize, actual: usize },

    #[error("RSA key of {actual} bits exceeds the {maximum}-bit maximum")]
    OversizedKey { maximum: usize, actual: usize },

    #[error("RSA key encoding failed: {0}")]
    Encoding(String),

    #[error("RSA-OAEP operation failed: {0}")]
    Oaep(#[source] rsa::Error),

    #[error("RSA signature operation failed: {0}")]
    Signature(#[source] rsa::signature::Error),
}
