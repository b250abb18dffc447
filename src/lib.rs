//! # Seal-Exchange: a two-party secure messaging simulator
//!
//! `seal-exchange` models Alice and Bob exchanging one message at a time
//! through an untrusted channel. Each message is:
//!
//! - encrypted with a one-time AES-256-GCM key,
//! - sent with that key wrapped under the receiver's RSA-OAEP key,
//! - hashed with SHA-256 and signed with the sender's RSASSA-PKCS1-v1_5 key,
//! - accompanied by the sender's certificate from a demonstration CA.
//!
//! The receiver checks the certificate, decrypts, compares digests and
//! verifies the signature, then classifies the message as
//! [`SecurityVerdict::Secure`] or [`SecurityVerdict::Breach`]. A tamper hook
//! lets a simulated attacker modify an in-flight message in between.
//!
//! The certificate authority is a teaching device: its "signature" is a
//! placeholder string and certificates are not cryptographically bound to
//! the CA. See [`authority`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seal_exchange::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let session = ExchangeSession::new(ExchangeConfig::default())?;
//!
//!     session.send("ola", PartyId::Alice)?;
//!     let outcome = session.verify(PartyId::Bob)?;
//!     assert_eq!(outcome.plaintext(), Some("ola"));
//!
//!     session.tamper_with(TamperTarget::Signature)?;
//!     assert_eq!(session.verify(PartyId::Bob)?.verdict(), SecurityVerdict::Breach);
//!     Ok(())
//! }
//! ```

pub mod asymmetric;
pub mod authority;
pub mod common;
pub mod contract;
pub mod error;
pub mod hybrid;
pub mod integrity;
pub mod keys;
pub mod protocol;
pub mod symmetric;

pub use authority::{CertificateAuthority, verify_certificate};
pub use contract::{Certificate, PartyId, SecureMessage, SecurityVerdict};
pub use error::{Error, Result};
pub use keys::{ExportedKeyBundle, UserKeyBundle};
pub use protocol::session::{ExchangeSession, initialize_parties};
pub use protocol::{send_message, tamper, verify_message};

#[cfg(feature = "async-engine")]
pub use protocol::async_::AsyncExchangeSession;

// --- Prelude ---
// The types needed to drive an exchange end to end.
pub mod prelude {
    pub use crate::authority::CertificateAuthority;
    pub use crate::common::config::{AuthorityConfig, CryptoConfig, ExchangeConfig};
    pub use crate::contract::{Certificate, PartyId, SecureMessage, SecurityVerdict};
    pub use crate::error::{Error, Result};
    pub use crate::keys::UserKeyBundle;
    pub use crate::protocol::session::{ExchangeEvent, ExchangeSession, ExchangeState};
    pub use crate::protocol::{BreachReason, TamperTarget, VerificationOutcome};

    #[cfg(feature = "async-engine")]
    pub use crate::protocol::async_::AsyncExchangeSession;
}

/// The version of the `seal-exchange` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
