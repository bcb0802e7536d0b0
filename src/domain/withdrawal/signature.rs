//! Gateway notification signature verification.
//!
//! Notifications are authenticated with RSA-SHA256 over a canonical
//! `key=value&...` string (see [`GatewayNotification::canonical_string`])
//! against the gateway's configured public key. Verification is pure and
//! deterministic: the same payload and key always produce the same verdict.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;

use super::errors::WithdrawalError;
use super::notification::GatewayNotification;

/// Verifies gateway notification signatures.
///
/// Constructed once from configuration and injected where needed; there is no
/// process-wide key singleton. A missing or unparseable key is reported as a
/// [`WithdrawalError::SignatureRejected`] at verification time, never a panic.
pub struct SignatureVerifier {
    key: Option<VerifyingKey<Sha256>>,
}

impl SignatureVerifier {
    /// Creates a verifier from PEM key material.
    ///
    /// Stored keys sometimes lack the PEM delimiters; bare base64 material is
    /// wrapped with standard `BEGIN/END PUBLIC KEY` markers before parsing.
    pub fn new(public_key: &str) -> Self {
        let pem = ensure_pem(public_key);
        let key = RsaPublicKey::from_public_key_pem(&pem)
            .ok()
            .map(VerifyingKey::new);
        Self { key }
    }

    /// Whether the configured key material parsed.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Checks the notification's signature against the configured key.
    ///
    /// # Errors
    ///
    /// Returns [`WithdrawalError::SignatureRejected`] when the key is
    /// missing/unparseable, the signature field is absent or not base64, or
    /// the signature does not match the canonical string.
    pub fn verify(&self, notification: &GatewayNotification) -> Result<(), WithdrawalError> {
        let key = self.key.as_ref().ok_or_else(|| {
            WithdrawalError::signature_rejected("gateway public key is missing or unparseable")
        })?;

        if notification.sign.is_empty() {
            return Err(WithdrawalError::signature_rejected(
                "notification carries no sign field",
            ));
        }

        let sig_bytes = BASE64
            .decode(notification.sign.trim())
            .map_err(|_| WithdrawalError::signature_rejected("signature is not valid base64"))?;
        let signature = Signature::try_from(sig_bytes.as_slice())
            .map_err(|_| WithdrawalError::signature_rejected("signature has invalid length"))?;

        let canonical = notification.canonical_string();
        key.verify(canonical.as_bytes(), &signature)
            .map_err(|_| WithdrawalError::signature_rejected("signature mismatch"))
    }
}

/// Wraps bare base64 key material with PEM delimiters; PEM input is returned
/// unchanged.
fn ensure_pem(material: &str) -> String {
    let trimmed = material.trim();
    if trimmed.contains("-----BEGIN") {
        return trimmed.to_string();
    }

    let compact: String = trimmed.split_whitespace().collect();
    let mut pem = String::with_capacity(compact.len() + 64);
    pem.push_str("-----BEGIN PUBLIC KEY-----\n");
    let mut line_len = 0;
    for ch in compact.chars() {
        pem.push(ch);
        line_len += 1;
        if line_len == 64 {
            pem.push('\n');
            line_len = 0;
        }
    }
    if line_len > 0 {
        pem.push('\n');
    }
    pem.push_str("-----END PUBLIC KEY-----\n");
    pem
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;
    use std::sync::OnceLock;

    // Key generation is expensive; share one keypair across the module.
    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            let mut rng = rand::thread_rng();
            RsaPrivateKey::new(&mut rng, 2048).expect("keygen")
        })
    }

    fn public_pem() -> String {
        test_key()
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("pem")
    }

    fn signed_notification(pairs: &[(&str, &str)]) -> GatewayNotification {
        let unsigned = GatewayNotification::from_fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        );
        let signing_key = SigningKey::<Sha256>::new(test_key().clone());
        let signature = signing_key.sign(unsigned.canonical_string().as_bytes());
        let sign = BASE64.encode(signature.to_bytes());

        let mut fields: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        fields.push(("sign".to_string(), sign));
        fields.push(("sign_type".to_string(), "RSA2".to_string()));
        GatewayNotification::from_fields(fields)
    }

    fn base_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("trade_status", "SUCCESS"),
            ("biz_content", r#"{"out_trade_no":"WITHDRAW_10_abc"}"#),
            ("notify_id", "n-42"),
        ]
    }

    #[test]
    fn accepts_a_correctly_signed_notification() {
        let verifier = SignatureVerifier::new(&public_pem());
        let notification = signed_notification(&base_fields());
        assert!(verifier.verify(&notification).is_ok());
    }

    #[test]
    fn verification_is_deterministic() {
        let verifier = SignatureVerifier::new(&public_pem());
        let notification = signed_notification(&base_fields());
        for _ in 0..3 {
            assert!(verifier.verify(&notification).is_ok());
        }
    }

    #[test]
    fn mutating_any_retained_field_flips_the_verdict() {
        let verifier = SignatureVerifier::new(&public_pem());
        let mut notification = signed_notification(&base_fields());
        notification.trade_status = "FAIL".to_string();
        assert!(verifier.verify(&notification).is_err());

        let mut notification = signed_notification(&base_fields());
        notification
            .extra
            .insert("notify_id".to_string(), "n-43".to_string());
        assert!(verifier.verify(&notification).is_err());
    }

    #[test]
    fn altering_the_signature_bytes_flips_the_verdict() {
        let verifier = SignatureVerifier::new(&public_pem());
        let mut notification = signed_notification(&base_fields());
        let mut bytes = BASE64.decode(&notification.sign).unwrap();
        bytes[0] ^= 0x01;
        notification.sign = BASE64.encode(bytes);
        assert!(matches!(
            verifier.verify(&notification),
            Err(WithdrawalError::SignatureRejected { .. })
        ));
    }

    #[test]
    fn mutating_sign_type_does_not_affect_the_verdict() {
        // sign_type is excluded from the canonical string.
        let verifier = SignatureVerifier::new(&public_pem());
        let mut notification = signed_notification(&base_fields());
        notification.sign_type = "RSA".to_string();
        assert!(verifier.verify(&notification).is_ok());
    }

    #[test]
    fn missing_signature_is_a_signature_error() {
        let verifier = SignatureVerifier::new(&public_pem());
        let notification = GatewayNotification::from_fields(vec![(
            "trade_status".to_string(),
            "SUCCESS".to_string(),
        )]);
        assert!(matches!(
            verifier.verify(&notification),
            Err(WithdrawalError::SignatureRejected { .. })
        ));
    }

    #[test]
    fn garbage_base64_signature_is_a_signature_error() {
        let verifier = SignatureVerifier::new(&public_pem());
        let mut notification = signed_notification(&base_fields());
        notification.sign = "!!not-base64!!".to_string();
        assert!(matches!(
            verifier.verify(&notification),
            Err(WithdrawalError::SignatureRejected { .. })
        ));
    }

    #[test]
    fn unparseable_key_rejects_instead_of_panicking() {
        let verifier = SignatureVerifier::new("not a key at all");
        assert!(!verifier.has_key());
        let notification = signed_notification(&base_fields());
        assert!(matches!(
            verifier.verify(&notification),
            Err(WithdrawalError::SignatureRejected { .. })
        ));
    }

    #[test]
    fn wrong_key_rejects_the_signature() {
        let mut rng = rand::thread_rng();
        let other = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
        let other_pem = other
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("pem");
        let verifier = SignatureVerifier::new(&other_pem);
        let notification = signed_notification(&base_fields());
        assert!(verifier.verify(&notification).is_err());
    }

    #[test]
    fn bare_base64_key_material_is_wrapped_and_accepted() {
        let der = test_key()
            .to_public_key()
            .to_public_key_der()
            .expect("der");
        let bare = BASE64.encode(der.as_bytes());
        let verifier = SignatureVerifier::new(&bare);
        assert!(verifier.has_key());
        let notification = signed_notification(&base_fields());
        assert!(verifier.verify(&notification).is_ok());
    }

    #[test]
    fn ensure_pem_leaves_pem_input_unchanged() {
        let pem = public_pem();
        assert_eq!(ensure_pem(&pem), pem.trim());
    }
}
