//! 通用模块，包含配置与工具函数

pub mod config;
pub mod utils;

pub use self::config::{AuthorityConfig, CryptoConfig, ExchangeConfig};
pub use self::utils::{ZeroizingVec, constant_time_eq, from_base64, to_base64};
