//!
//! # 通用配置模块
//!
//! 会话的加密参数与证书颁发机构设置。配置可来自默认值、JSON 文件，
//! 或以 `SEAL_EXCHANGE_` 为前缀的环境变量。
//!
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 两种密钥角色允许的最小 RSA 模数位数
pub const MIN_RSA_KEY_BITS: usize = 2048;
/// 允许的最大 RSA 模数位数，`rsa` 无法解析更大的 SPKI 公钥
pub const MAX_RSA_KEY_BITS: usize = 4096;

const ENV_RSA_BITS: &str = "SEAL_EXCHANGE_RSA_BITS";
const ENV_CA_ISSUER: &str = "SEAL_EXCHANGE_CA_ISSUER";
const ENV_CERT_VALIDITY_MONTHS: &str = "SEAL_EXCHANGE_CERT_VALIDITY_MONTHS";

/// 加密配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CryptoConfig {
    /// RSA密钥位数，加密与签名密钥共用
    pub rsa_key_bits: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            rsa_key_bits: MIN_RSA_KEY_BITS,
        }
    }
}

/// 证书颁发机构配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorityConfig {
    /// 写入每张证书 `issuer` 字段的身份
    pub issuer: String,
    /// 证书有效期（月）
    pub validity_months: u32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            issuer: "Demonstration Test CA".to_string(),
            validity_months: 12,
        }
    }
}

/// 完整配置文件
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub authority: AuthorityConfig,
}

impl ExchangeConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ExchangeConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// 从环境变量加载配置，未设置的项保留默认值
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(ENV_RSA_BITS) {
            config.crypto.rsa_key_bits = value.parse().map_err(|_| {
                Error::Configuration(format!("{ENV_RSA_BITS} is not a number: {value}"))
            })?;
        }

        if let Ok(value) = std::env::var(ENV_CA_ISSUER) {
            config.authority.issuer = value;
        }

        if let Ok(value) = std::env::var(ENV_CERT_VALIDITY_MONTHS) {
            config.authority.validity_months = value.parse().map_err(|_| {
                Error::Configuration(format!(
                    "{ENV_CERT_VALIDITY_MONTHS} is not a number: {value}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crypto.rsa_key_bits < MIN_RSA_KEY_BITS {
            return Err(Error::Configuration(format!(
                "RSA keys need at least {MIN_RSA_KEY_BITS} bits, got {}",
                self.crypto.rsa_key_bits
            )));
        }
        if self.crypto.rsa_key_bits > MAX_RSA_KEY_BITS {
            return Err(Error::Configuration(format!(
                "RSA keys above {MAX_RSA_KEY_BITS} bits are not supported, got {}",
                self.crypto.rsa_key_bits
            )));
        }
        if self.authority.issuer.is_empty() {
            return Err(Error::Configuration("CA issuer must not be empty".into()));
        }
        // 保证 valid_from < valid_until
        if self.authority.validity_months == 0 {
            return Err(Error::Configuration(
                "certificate validity must be at least one month".into(),
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
