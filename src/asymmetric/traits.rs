//! 定义了非对称加密系统的核心 Trait。
use crate::common::config::CryptoConfig;
use std::fmt::Debug;

/// `AsymmetricCryptographicSystem` 定义了非对称加密算法必须实现的核心功能。
///
/// 非对称算法只用于封装每条消息的对称密钥，从不直接加密消息内容。
pub trait AsymmetricCryptographicSystem: Sized {
    /// 公钥类型
    type PublicKey: Clone + Debug;

    /// 私钥类型
    type PrivateKey: Clone + Debug;

    /// 错误类型
    type Error: std::error::Error + Send + Sync + 'static;

    /// 生成密钥对
    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error>;

    /// 使用公钥加密单个数据块（通常是对称密钥）。
    fn encrypt(public_key: &Self::PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// 使用私钥解密单个数据块。
    fn decrypt(private_key: &Self::PrivateKey, ciphertext: &[u8])
    -> Result<Vec<u8>, Self::Error>;

    /// 将公钥导出为PEM格式
    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error>;

    /// 将私钥导出为PEM格式
    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error>;

    /// 从PEM格式导入公钥
    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error>;

    /// 从PEM格式导入私钥
    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error>;
}

/// `SignatureSystem` 定义了数字签名算法的核心功能。
///
/// 签名密钥与加密密钥是不同的类型，一种角色的密钥对不能用于另一种角色。
pub trait SignatureSystem: Sized {
    type PublicKey: Clone + Debug;
    type PrivateKey: Clone + Debug;
    type Signature: AsRef<[u8]>;
    type Error: std::error::Error + Send + Sync + 'static;

    fn generate_keypair(
        config: &CryptoConfig,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Self::Error>;

    /// 生成签名
    fn sign(private_key: &Self::PrivateKey, message: &[u8])
    -> Result<Self::Signature, Self::Error>;

    /// 验证签名，失败时返回错误
    fn verify(
        public_key: &Self::PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Self::Error>;

    fn export_public_key(public_key: &Self::PublicKey) -> Result<String, Self::Error>;

    fn export_private_key(private_key: &Self::PrivateKey) -> Result<String, Self::Error>;

    fn import_public_key(key_data: &str) -> Result<Self::PublicKey, Self::Error>;

    fn import_private_key(key_data: &str) -> Result<Self::PrivateKey, Self::Error>;
}
