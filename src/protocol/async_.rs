//! 异步会话包装
//!
//! 所有 RSA 运算都在 tokio 的阻塞线程池中执行，不占用调用方的运行时线程。

use crate::common::config::ExchangeConfig;
use crate::contract::{Certificate, PartyId, SecureMessage};
use crate::error::Result;
use crate::keys::UserKeyBundle;
use crate::protocol::session::{ExchangeEvent, ExchangeSession, ExchangeState};
use crate::protocol::{TamperTarget, VerificationOutcome};
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// `AsyncExchangeSession`：在 tokio 阻塞线程池上驱动 [`ExchangeSession`]。
///
/// 克隆开销很小，所有克隆共享同一个会话。
#[derive(Clone)]
pub struct AsyncExchangeSession {
    inner: Arc<ExchangeSession>,
}

impl AsyncExchangeSession {
    /// 生成双方密钥并签发证书。
    pub async fn new(config: ExchangeConfig) -> Result<Self> {
        let session = spawn_blocking(move || ExchangeSession::new(config)).await??;
        Ok(Self::from_session(session))
    }

    pub async fn with_key_bundles(
        config: ExchangeConfig,
        alice: UserKeyBundle,
        bob: UserKeyBundle,
    ) -> Result<Self> {
        let session =
            spawn_blocking(move || ExchangeSession::with_key_bundles(config, alice, bob)).await??;
        Ok(Self::from_session(session))
    }

    pub fn from_session(session: ExchangeSession) -> Self {
        Self {
            inner: Arc::new(session),
        }
    }

    /// 被包装的同步会话
    pub fn session(&self) -> &ExchangeSession {
        &self.inner
    }

    pub fn state(&self) -> Arc<ExchangeState> {
        self.inner.state()
    }

    pub fn certificate(&self, id: PartyId) -> Certificate {
        self.inner.certificate(id)
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ExchangeEvent) + Send + Sync + 'static,
    {
        self.inner.subscribe(listener);
    }

    pub async fn send(
        &self,
        plaintext: impl Into<String>,
        sender: PartyId,
    ) -> Result<SecureMessage> {
        let inner = self.inner.clone();
        let plaintext = plaintext.into();
        spawn_blocking(move || inner.send(&plaintext, sender)).await?
    }

    pub async fn verify(&self, receiver: PartyId) -> Result<VerificationOutcome> {
        let inner = self.inner.clone();
        spawn_blocking(move || inner.verify(receiver)).await?
    }

    pub async fn verify_message(
        &self,
        message: SecureMessage,
        receiver: PartyId,
    ) -> Result<VerificationOutcome> {
        let inner = self.inner.clone();
        spawn_blocking(move || inner.verify_message(&message, receiver)).await?
    }

    /// 篡改不涉及 RSA 运算，直接在当前任务中执行。
    pub fn tamper(&self) -> Result<SecureMessage> {
        self.inner.tamper()
    }

    pub fn tamper_with(&self, target: TamperTarget) -> Result<SecureMessage> {
        self.inner.tamper_with(target)
    }

    /// 重新生成双方密钥并清空消息槽。
    pub async fn reset(&self) -> Result<()> {
        let inner = self.inner.clone();
        spawn_blocking(move || inner.reset()).await?
    }
}
