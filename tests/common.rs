//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use seal_exchange::common::config::{CryptoConfig, ExchangeConfig};
use seal_exchange::keys::UserKeyBundle;
use seal_exchange::protocol::session::ExchangeSession;
use std::sync::OnceLock;

/// RSA key generation dominates test time, so both bundles are generated once
/// per test binary and cloned into each session.
pub fn key_bundles() -> (UserKeyBundle, UserKeyBundle) {
    static BUNDLES: OnceLock<(UserKeyBundle, UserKeyBundle)> = OnceLock::new();
    BUNDLES
        .get_or_init(|| {
            let config = CryptoConfig::default();
            (
                UserKeyBundle::generate(&config).unwrap(),
                UserKeyBundle::generate(&config).unwrap(),
            )
        })
        .clone()
}

/// A session with fresh certificates around the cached key bundles.
pub fn session() -> ExchangeSession {
    let (alice, bob) = key_bundles();
    ExchangeSession::with_key_bundles(ExchangeConfig::default(), alice, bob).unwrap()
}
