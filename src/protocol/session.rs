//! # Exchange Session
//!
//! Session context for the two-party exchange.
//!
//! An [`ExchangeSession`] owns both parties' keys and certificates and the
//! single in-flight message slot. Both are swapped atomically as whole
//! values; nothing is ever patched in place.
//!
//! ---
//!
//! # 交换会话
//!
//! 双方密钥、证书与唯一的消息槽都以整体原子替换，从不局部修改。

use crate::authority::CertificateAuthority;
use crate::common::config::ExchangeConfig;
use crate::contract::{Certificate, PartyId, SecureMessage, SecurityVerdict};
use crate::error::{Error, Result};
use crate::keys::UserKeyBundle;
use crate::protocol::{
    BreachReason, TamperTarget, VerificationOutcome, send_message, tamper, verify_message,
};
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// One provisioned party.
#[derive(Debug, Clone)]
pub struct Party {
    pub id: PartyId,
    pub keys: UserKeyBundle,
    pub certificate: Certificate,
}

/// Both parties, always provisioned together.
#[derive(Debug, Clone)]
pub struct Parties {
    alice: Party,
    bob: Party,
}

impl Parties {
    pub fn get(&self, id: PartyId) -> &Party {
        match id {
            PartyId::Alice => &self.alice,
            PartyId::Bob => &self.bob,
        }
    }

    fn issue(
        authority: &CertificateAuthority,
        alice: UserKeyBundle,
        bob: UserKeyBundle,
    ) -> Result<Self> {
        let alice_cert =
            authority.issue_certificate(PartyId::Alice.as_str(), alice.signing_public_key())?;
        let bob_cert =
            authority.issue_certificate(PartyId::Bob.as_str(), bob.signing_public_key())?;
        Ok(Self {
            alice: Party {
                id: PartyId::Alice,
                keys: alice,
                certificate: alice_cert,
            },
            bob: Party {
                id: PartyId::Bob,
                keys: bob,
                certificate: bob_cert,
            },
        })
    }
}

/// Generates key bundles for Alice and Bob and has `authority` certify their
/// signing keys.
///
/// Returns `(alice_keys, bob_keys, alice_certificate, bob_certificate)`.
pub fn initialize_parties(
    config: &ExchangeConfig,
    authority: &CertificateAuthority,
) -> Result<(UserKeyBundle, UserKeyBundle, Certificate, Certificate)> {
    let parties = provision(config, authority)?;
    let Parties { alice, bob } = parties;
    Ok((alice.keys, bob.keys, alice.certificate, bob.certificate))
}

fn provision(config: &ExchangeConfig, authority: &CertificateAuthority) -> Result<Parties> {
    #[cfg(feature = "parallel")]
    let (alice, bob) = rayon::join(
        || UserKeyBundle::generate(&config.crypto),
        || UserKeyBundle::generate(&config.crypto),
    );
    #[cfg(not(feature = "parallel"))]
    let (alice, bob) = (
        UserKeyBundle::generate(&config.crypto),
        UserKeyBundle::generate(&config.crypto),
    );

    let parties = Parties::issue(authority, alice?, bob?)?;
    info!(issuer = authority.issuer(), "parties provisioned");
    Ok(parties)
}

/// The single message slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    NoMessage,
    Sent(SecureMessage),
    /// Modified after sending; shown as a warning until verified again.
    Tampered {
        message: SecureMessage,
        target: TamperTarget,
    },
    Verified {
        message: SecureMessage,
        outcome: VerificationOutcome,
    },
}

impl ExchangeState {
    pub fn message(&self) -> Option<&SecureMessage> {
        match self {
            ExchangeState::NoMessage => None,
            ExchangeState::Sent(message)
            | ExchangeState::Tampered { message, .. }
            | ExchangeState::Verified { message, .. } => Some(message),
        }
    }

    /// `None` until a message has been tampered with or verified.
    pub fn verdict(&self) -> Option<SecurityVerdict> {
        match self {
            ExchangeState::NoMessage | ExchangeState::Sent(_) => None,
            ExchangeState::Tampered { .. } => Some(SecurityVerdict::Warning),
            ExchangeState::Verified { outcome, .. } => Some(outcome.verdict()),
        }
    }
}

/// Notification sent to subscribers after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    Reset,
    MessageSent {
        sender: PartyId,
    },
    /// The previous message, if any, is still in the slot.
    SendFailed {
        sender: PartyId,
        error: String,
    },
    MessageTampered {
        target: TamperTarget,
    },
    MessageVerified {
        receiver: PartyId,
        verdict: SecurityVerdict,
        reason: Option<BreachReason>,
    },
    /// The key could not be unwrapped or the body did not decrypt; the slot
    /// now records a breach.
    VerificationFailed {
        receiver: PartyId,
        error: String,
    },
}

/// Callback invoked with each [`ExchangeEvent`]. Listeners run with no
/// session lock held and may call back into the session.
pub type ExchangeListener = Arc<dyn Fn(&ExchangeEvent) + Send + Sync>;

pub struct ExchangeSession {
    authority: CertificateAuthority,
    config: ExchangeConfig,
    parties: ArcSwap<Parties>,
    state: ArcSwap<ExchangeState>,
    listeners: Mutex<Vec<ExchangeListener>>,
}

impl ExchangeSession {
    /// Validates `config` and provisions fresh keys and certificates for
    /// both parties.
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        config.validate()?;
        let authority = CertificateAuthority::new(config.authority.clone());
        let parties = provision(&config, &authority)?;
        Ok(Self::assemble(config, authority, parties))
    }

    /// Builds a session around existing key bundles; certificates are issued
    /// by the session's own authority.
    pub fn with_key_bundles(
        config: ExchangeConfig,
        alice: UserKeyBundle,
        bob: UserKeyBundle,
    ) -> Result<Self> {
        config.validate()?;
        let authority = CertificateAuthority::new(config.authority.clone());
        let parties = Parties::issue(&authority, alice, bob)?;
        Ok(Self::assemble(config, authority, parties))
    }

    fn assemble(
        config: ExchangeConfig,
        authority: CertificateAuthority,
        parties: Parties,
    ) -> Self {
        Self {
            authority,
            config,
            parties: ArcSwap::from_pointee(parties),
            state: ArcSwap::from_pointee(ExchangeState::NoMessage),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn authority(&self) -> &CertificateAuthority {
        &self.authority
    }

    /// Snapshot of both parties.
    pub fn parties(&self) -> Arc<Parties> {
        self.parties.load_full()
    }

    pub fn certificate(&self, id: PartyId) -> Certificate {
        self.parties.load().get(id).certificate.clone()
    }

    pub fn state(&self) -> Arc<ExchangeState> {
        self.state.load_full()
    }

    pub fn current_message(&self) -> Option<SecureMessage> {
        self.state.load().message().cloned()
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&ExchangeEvent) + Send + Sync + 'static,
    {
        self.lock_listeners().push(Arc::new(listener));
    }

    /// Regenerates both parties and clears the message slot.
    pub fn reset(&self) -> Result<()> {
        let parties = provision(&self.config, &self.authority)?;
        self.parties.store(Arc::new(parties));
        self.state.store(Arc::new(ExchangeState::NoMessage));
        self.notify(&ExchangeEvent::Reset);
        Ok(())
    }

    /// Seals `plaintext` from `sender` to the other party and places it in
    /// the slot.
    pub fn send(&self, plaintext: &str, sender: PartyId) -> Result<SecureMessage> {
        let parties = self.parties.load();
        let from = parties.get(sender);
        let to = parties.get(sender.peer());

        match send_message(
            plaintext,
            sender,
            &from.keys,
            to.keys.encryption_public_key(),
            &from.certificate,
        ) {
            Ok(message) => {
                self.state.store(Arc::new(ExchangeState::Sent(message.clone())));
                self.notify(&ExchangeEvent::MessageSent { sender });
                Ok(message)
            }
            Err(e) => {
                warn!(%sender, error = %e, "send failed");
                self.notify(&ExchangeEvent::SendFailed {
                    sender,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Verifies the in-flight message as `receiver`.
    pub fn verify(&self, receiver: PartyId) -> Result<VerificationOutcome> {
        let state = self.state.load_full();
        let message = state.message().ok_or(Error::NoMessage)?;
        self.verify_message(message, receiver)
    }

    /// Verifies `message` as `receiver` and records the result in the slot.
    pub fn verify_message(
        &self,
        message: &SecureMessage,
        receiver: PartyId,
    ) -> Result<VerificationOutcome> {
        if receiver == message.sender {
            return Err(Error::NotRecipient(receiver));
        }

        let parties = self.parties.load();
        match verify_message(message, &parties.get(receiver).keys) {
            Ok(outcome) => {
                self.state.store(Arc::new(ExchangeState::Verified {
                    message: message.clone(),
                    outcome: outcome.clone(),
                }));
                self.notify(&ExchangeEvent::MessageVerified {
                    receiver,
                    verdict: outcome.verdict(),
                    reason: outcome.breach_reason().cloned(),
                });
                Ok(outcome)
            }
            Err(e) => {
                warn!(%receiver, error = %e, "message could not be decrypted");
                self.state.store(Arc::new(ExchangeState::Verified {
                    message: message.clone(),
                    outcome: VerificationOutcome::Breach(BreachReason::Undecryptable),
                }));
                self.notify(&ExchangeEvent::VerificationFailed {
                    receiver,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Tampers with a randomly chosen field of the in-flight message.
    pub fn tamper(&self) -> Result<SecureMessage> {
        self.tamper_with(TamperTarget::random()?)
    }

    pub fn tamper_with(&self, target: TamperTarget) -> Result<SecureMessage> {
        let state = self.state.load_full();
        let message = state.message().ok_or(Error::NoMessage)?;

        let tampered = tamper(message, target);
        self.state.store(Arc::new(ExchangeState::Tampered {
            message: tampered.clone(),
            target,
        }));
        self.notify(&ExchangeEvent::MessageTampered { target });
        Ok(tampered)
    }

    fn notify(&self, event: &ExchangeEvent) {
        // Snapshot first: a listener may re-enter send/verify/tamper/reset.
        let listeners = self.lock_listeners().clone();
        for listener in &listeners {
            listener(event);
        }
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<ExchangeListener>> {
        // A panicking listener must not disable notifications for good.
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymmetric::systems::traditional::rsa_oaep::EncryptionPublicKey;
    use crate::common::config::CryptoConfig;
    use crate::keys::KeyPair;
    use std::sync::{OnceLock, mpsc};
    use std::time::Duration;

    fn bundles() -> (UserKeyBundle, UserKeyBundle) {
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

    fn session() -> ExchangeSession {
        let (alice, bob) = bundles();
        ExchangeSession::with_key_bundles(ExchangeConfig::default(), alice, bob).unwrap()
    }

    fn recorded(session: &ExchangeSession) -> Arc<Mutex<Vec<ExchangeEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        session.subscribe(move |event: &ExchangeEvent| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_starts_empty() {
        let session = session();
        assert_eq!(*session.state(), ExchangeState::NoMessage);
        assert_eq!(session.state().verdict(), None);
        assert!(matches!(session.verify(PartyId::Bob), Err(Error::NoMessage)));
        assert!(matches!(session.tamper(), Err(Error::NoMessage)));
    }

    #[test]
    fn test_certificates_issued_for_both_parties() {
        let session = session();
        let alice = session.certificate(PartyId::Alice);
        let bob = session.certificate(PartyId::Bob);

        assert_eq!(alice.subject, "alice");
        assert_eq!(bob.subject, "bob");
        assert_ne!(alice.serial_number, bob.serial_number);
        assert_eq!(&alice.public_key, bundles().0.signing_public_key());
        assert!(session.authority().has_issued(&bob.serial_number));
    }

    #[test]
    fn test_state_machine_transitions() {
        let session = session();
        let events = recorded(&session);

        let sent = session.send("ola", PartyId::Alice).unwrap();
        assert_eq!(*session.state(), ExchangeState::Sent(sent.clone()));

        let outcome = session.verify(PartyId::Bob).unwrap();
        assert_eq!(outcome.plaintext(), Some("ola"));
        assert_eq!(session.state().verdict(), Some(SecurityVerdict::Secure));

        session.tamper_with(TamperTarget::MessageHash).unwrap();
        assert_eq!(session.state().verdict(), Some(SecurityVerdict::Warning));

        let outcome = session.verify(PartyId::Bob).unwrap();
        assert_eq!(outcome.verdict(), SecurityVerdict::Breach);
        assert_eq!(session.state().verdict(), Some(SecurityVerdict::Breach));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            ExchangeEvent::MessageSent {
                sender: PartyId::Alice
            }
        );
        assert_eq!(
            events[2],
            ExchangeEvent::MessageTampered {
                target: TamperTarget::MessageHash
            }
        );
        assert!(matches!(
            &events[3],
            ExchangeEvent::MessageVerified {
                receiver: PartyId::Bob,
                verdict: SecurityVerdict::Breach,
                reason: Some(BreachReason::HashMismatch { .. }),
            }
        ));
    }

    #[test]
    fn test_listener_can_call_back_into_session() {
        let session = Arc::new(session());
        let weak = Arc::downgrade(&session);
        session.subscribe(move |event: &ExchangeEvent| {
            if let ExchangeEvent::MessageSent { sender } = event {
                if let Some(session) = weak.upgrade() {
                    session.verify(sender.peer()).unwrap();
                }
            }
        });

        let (tx, rx) = mpsc::channel();
        let worker = session.clone();
        std::thread::spawn(move || {
            let _ = tx.send(worker.send("ola", PartyId::Alice).is_ok());
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(30)), Ok(true));
        assert_eq!(session.state().verdict(), Some(SecurityVerdict::Secure));
    }

    #[test]
    fn test_failed_send_keeps_previous_message() {
        let (alice, bob) = bundles();
        let unusable_bob = UserKeyBundle::from_key_pairs(
            KeyPair {
                public_key: EncryptionPublicKey(vec![0x30, 0x00]),
                private_key: bob.encryption().private_key.clone(),
            },
            bob.signing().clone(),
        );
        let session =
            ExchangeSession::with_key_bundles(ExchangeConfig::default(), alice, unusable_bob)
                .unwrap();
        let events = recorded(&session);

        let first = session.send("from bob", PartyId::Bob).unwrap();
        let result = session.send("to bob", PartyId::Alice);

        assert!(matches!(result, Err(Error::KeyWrap(_))));
        assert_eq!(session.current_message(), Some(first.clone()));
        assert_eq!(*session.state(), ExchangeState::Sent(first));
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(ExchangeEvent::SendFailed {
                sender: PartyId::Alice,
                ..
            })
        ));
    }

    #[test]
    fn test_sender_cannot_verify_own_message() {
        let session = session();
        session.send("mine", PartyId::Bob).unwrap();

        assert!(matches!(
            session.verify(PartyId::Bob),
            Err(Error::NotRecipient(PartyId::Bob))
        ));
        // The rejected attempt leaves the slot as it was.
        assert!(matches!(*session.state(), ExchangeState::Sent(_)));
    }

    #[test]
    fn test_undecryptable_message_records_breach() {
        let session = session();
        let events = recorded(&session);
        let mut message = session.send("hello", PartyId::Alice).unwrap();
        message.encrypted_symmetric_key = "AAAA".to_string();

        let result = session.verify_message(&message, PartyId::Bob);
        assert!(matches!(result, Err(Error::KeyUnwrap(_))));
        assert_eq!(session.state().verdict(), Some(SecurityVerdict::Breach));
        assert!(matches!(
            events.lock().unwrap().last(),
            Some(ExchangeEvent::VerificationFailed {
                receiver: PartyId::Bob,
                ..
            })
        ));
    }

    #[test]
    fn test_new_message_replaces_previous() {
        let session = session();
        session.send("first", PartyId::Alice).unwrap();
        let second = session.send("second", PartyId::Bob).unwrap();

        assert_eq!(session.current_message(), Some(second));
        let outcome = session.verify(PartyId::Alice).unwrap();
        assert_eq!(outcome.plaintext(), Some("second"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let (alice, bob) = bundles();
        let mut config = ExchangeConfig::default();
        config.authority.issuer.clear();

        assert!(matches!(
            ExchangeSession::with_key_bundles(config, alice, bob),
            Err(Error::Configuration(_))
        ));
    }
}
