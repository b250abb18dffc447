//! # Demonstration Certificate Authority
//!
//! Certificates issued here are NOT cryptographically signed. The
//! `ca_signature` field holds `ca_signature_<serial>` and verification only
//! checks that the identifying fields are present and that the current time
//! falls inside the validity window. The public key is not bound to the CA
//! in any verifiable way; a forged certificate with well-formed fields
//! passes. This mirrors a teaching simulation, not a PKI.
//!
//! ---
//!
//! # 演示用证书颁发机构
//!
//! 证书没有真正的CA签名，验证只检查字段是否存在以及有效期。

use crate::asymmetric::systems::traditional::rsa_signature::SigningPublicKey;
use crate::common::config::AuthorityConfig;
use crate::contract::Certificate;
use crate::error::{Error, Result};
use chrono::{DateTime, Months, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand_core::{OsRng, TryRngCore};
use tracing::{debug, warn};

/// Random bytes in a serial number (64 bits, 16 hex characters).
pub const SERIAL_NUMBER_BYTES: usize = 8;

const CA_SIGNATURE_PREFIX: &str = "ca_signature_";

pub struct CertificateAuthority {
    config: AuthorityConfig,
    /// serial number -> subject, for every certificate this CA issued
    issued: DashMap<String, String>,
}

impl CertificateAuthority {
    pub fn new(config: AuthorityConfig) -> Self {
        Self {
            config,
            issued: DashMap::new(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Issues a certificate valid from now for the configured number of months.
    pub fn issue_certificate(
        &self,
        subject: &str,
        signing_public_key: &SigningPublicKey,
    ) -> Result<Certificate> {
        self.issue_certificate_at(subject, signing_public_key, Utc::now())
    }

    pub fn issue_certificate_at(
        &self,
        subject: &str,
        signing_public_key: &SigningPublicKey,
        now: DateTime<Utc>,
    ) -> Result<Certificate> {
        let valid_until = now
            .checked_add_months(Months::new(self.config.validity_months))
            .filter(|until| *until > now)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "certificate validity of {} months does not produce a valid window",
                    self.config.validity_months
                ))
            })?;

        let serial_number = self.next_serial(subject)?;
        debug!(subject, serial = %serial_number, "issued certificate");

        Ok(Certificate {
            subject: subject.to_string(),
            issuer: self.config.issuer.clone(),
            valid_from: now,
            valid_until,
            ca_signature: format!("{CA_SIGNATURE_PREFIX}{serial_number}"),
            serial_number,
            public_key: signing_public_key.clone(),
        })
    }

    /// Whether this CA handed out `serial_number`.
    pub fn has_issued(&self, serial_number: &str) -> bool {
        self.issued.contains_key(serial_number)
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    fn next_serial(&self, subject: &str) -> Result<String> {
        loop {
            let mut bytes = [0u8; SERIAL_NUMBER_BYTES];
            OsRng.try_fill_bytes(&mut bytes)?;
            let serial = hex::encode(bytes);

            match self.issued.entry(serial.clone()) {
                Entry::Occupied(_) => {
                    warn!(serial = %serial, "serial number collision, drawing again");
                }
                Entry::Vacant(entry) => {
                    entry.insert(subject.to_string());
                    return Ok(serial);
                }
            }
        }
    }
}

impl Default for CertificateAuthority {
    fn default() -> Self {
        Self::new(AuthorityConfig::default())
    }
}

/// Checks field presence and the validity window against the current time.
pub fn verify_certificate(certificate: &Certificate) -> bool {
    verify_certificate_at(certificate, Utc::now())
}

/// Both ends of the window are inclusive.
pub fn verify_certificate_at(certificate: &Certificate, now: DateTime<Utc>) -> bool {
    !certificate.subject.is_empty()
        && !certificate.issuer.is_empty()
        && !certificate.serial_number.is_empty()
        && !certificate.ca_signature.is_empty()
        && certificate.valid_from <= now
        && now <= certificate.valid_until
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dummy_key() -> SigningPublicKey {
        SigningPublicKey(vec![0x30, 0x82, 0x01, 0x22])
    }

    #[test]
    fn test_issued_certificate_shape() {
        let ca = CertificateAuthority::default();
        let cert = ca.issue_certificate("alice", &dummy_key()).unwrap();

        assert_eq!(cert.subject, "alice");
        assert_eq!(cert.issuer, "Demonstration Test CA");
        assert_eq!(cert.serial_number.len(), SERIAL_NUMBER_BYTES * 2);
        assert!(cert.serial_number.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cert.ca_signature, format!("ca_signature_{}", cert.serial_number));
        assert!(cert.valid_from < cert.valid_until);
        assert_eq!(cert.public_key, dummy_key());
        assert!(verify_certificate(&cert));
    }

    #[test]
    fn test_validity_is_one_year_by_default() {
        let ca = CertificateAuthority::default();
        let now = DateTime::parse_from_rfc3339("2026-03-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let cert = ca.issue_certificate_at("bob", &dummy_key(), now).unwrap();

        assert_eq!(cert.valid_from, now);
        assert_eq!(
            cert.valid_until,
            DateTime::parse_from_rfc3339("2027-03-15T12:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_serials_are_unique_for_same_subject() {
        let ca = CertificateAuthority::default();
        let first = ca.issue_certificate("alice", &dummy_key()).unwrap();
        let second = ca.issue_certificate("alice", &dummy_key()).unwrap();

        assert_ne!(first.serial_number, second.serial_number);
        assert!(ca.has_issued(&first.serial_number));
        assert!(ca.has_issued(&second.serial_number));
        assert_eq!(ca.issued_count(), 2);
    }

    #[test]
    fn test_window_bounds() {
        let ca = CertificateAuthority::default();
        let cert = ca.issue_certificate("alice", &dummy_key()).unwrap();

        assert!(verify_certificate_at(&cert, cert.valid_from));
        assert!(verify_certificate_at(&cert, cert.valid_until));
        assert!(!verify_certificate_at(
            &cert,
            cert.valid_from - Duration::seconds(1)
        ));
        assert!(!verify_certificate_at(
            &cert,
            cert.valid_until + Duration::seconds(1)
        ));
    }

    #[test]
    fn test_any_empty_field_fails() {
        let ca = CertificateAuthority::default();
        let cert = ca.issue_certificate("alice", &dummy_key()).unwrap();

        let mutations: [fn(&mut Certificate); 4] = [
            |c| c.subject.clear(),
            |c| c.issuer.clear(),
            |c| c.serial_number.clear(),
            |c| c.ca_signature.clear(),
        ];
        for mutate in mutations {
            let mut tampered = cert.clone();
            mutate(&mut tampered);
            assert!(!verify_certificate(&tampered));
        }
    }

    #[test]
    fn test_placeholder_signature_is_not_checked() {
        // Only presence of the CA signature is verified, never its content.
        let ca = CertificateAuthority::default();
        let mut cert = ca.issue_certificate("alice", &dummy_key()).unwrap();
        cert.ca_signature = "forged".to_string();
        cert.public_key = SigningPublicKey(vec![0xde, 0xad]);

        assert!(verify_certificate(&cert));
    }
}
