//! Payment-event verification.
//!
//! Authenticates that an inbound "payment succeeded" signal genuinely
//! originated from the payment gateway, before any state mutation is
//! attempted. Two independent forms exist because two call sites use
//! different payloads:
//!
//! - **Webhook form**: HMAC-SHA256 over the exact raw request body bytes with
//!   the webhook secret. The raw bytes matter: re-serializing parsed JSON
//!   before hashing changes the byte sequence and breaks verification.
//! - **Checkout form**: HMAC-SHA256 over `"{order_id}|{payment_id}"` with the
//!   key secret, as computed by the gateway's browser checkout flow.
//!
//! Both comparisons are constant-time. Verification is pure: no side effects,
//! no state.

use crate::error::ConfirmationError;
use crate::types::{OrderId, PaymentId};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for payment gateway signatures.
///
/// Secrets are injected at construction from secure configuration. There is
/// deliberately no default and no fallback value of any kind.
#[derive(Clone)]
pub struct PaymentVerifier {
    webhook_secret: String,
    checkout_secret: String,
}

impl std::fmt::Debug for PaymentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets never appear in logs or debug output.
        f.debug_struct("PaymentVerifier").finish_non_exhaustive()
    }
}

impl PaymentVerifier {
    /// Create a verifier from the two pre-shared secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationError::Configuration` if either secret is empty.
    pub fn new(
        webhook_secret: impl Into<String>,
        checkout_secret: impl Into<String>,
    ) -> Result<Self, ConfirmationError> {
        let webhook_secret = webhook_secret.into();
        let checkout_secret = checkout_secret.into();
        if webhook_secret.is_empty() {
            return Err(ConfirmationError::Configuration(
                "webhook secret must not be empty".to_string(),
            ));
        }
        if checkout_secret.is_empty() {
            return Err(ConfirmationError::Configuration(
                "checkout secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            webhook_secret,
            checkout_secret,
        })
    }

    /// Verify a server-to-server webhook delivery.
    ///
    /// `raw_body` must be the unparsed request body bytes exactly as
    /// received; `signature` is the hex digest from the signature header.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationError::Authentication` if the signature does not
    /// match or is not valid hex.
    pub fn verify_webhook(&self, raw_body: &[u8], signature: &str) -> Result<(), ConfirmationError> {
        Self::verify(self.webhook_secret.as_bytes(), raw_body, signature)
    }

    /// Verify a browser checkout-completion callback.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with the key secret and
    /// hands the hex digest to the browser.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationError::Authentication` if the signature does not
    /// match or is not valid hex.
    pub fn verify_checkout(
        &self,
        order_id: &OrderId,
        payment_id: &PaymentId,
        signature: &str,
    ) -> Result<(), ConfirmationError> {
        let message = format!("{order_id}|{payment_id}");
        Self::verify(self.checkout_secret.as_bytes(), message.as_bytes(), signature)
    }

    fn verify(secret: &[u8], message: &[u8], signature: &str) -> Result<(), ConfirmationError> {
        let supplied = hex::decode(signature.trim()).map_err(|_| ConfirmationError::Authentication)?;
        let expected = Self::digest(secret, message)?;
        if constant_time_eq(&expected, &supplied) {
            Ok(())
        } else {
            Err(ConfirmationError::Authentication)
        }
    }

    fn digest(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, ConfirmationError> {
        // HMAC-SHA256 accepts keys of any length; the error path is
        // unreachable but propagated rather than unwrapped.
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| ConfirmationError::Configuration(e.to_string()))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Hex HMAC-SHA256 digest of `message` under the webhook secret.
    ///
    /// Exposed so tests and tools can produce well-signed payloads.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationError::Configuration` if the mac cannot be keyed.
    pub fn sign_webhook_body(&self, raw_body: &[u8]) -> Result<String, ConfirmationError> {
        Ok(hex::encode(Self::digest(
            self.webhook_secret.as_bytes(),
            raw_body,
        )?))
    }

    /// Hex HMAC-SHA256 digest of the checkout message under the key secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationError::Configuration` if the mac cannot be keyed.
    pub fn sign_checkout(
        &self,
        order_id: &OrderId,
        payment_id: &PaymentId,
    ) -> Result<String, ConfirmationError> {
        let message = format!("{order_id}|{payment_id}");
        Ok(hex::encode(Self::digest(
            self.checkout_secret.as_bytes(),
            message.as_bytes(),
        )?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn verifier() -> PaymentVerifier {
        PaymentVerifier::new("webhook-secret", "checkout-secret").unwrap()
    }

    #[test]
    fn rejects_empty_secrets() {
        assert!(matches!(
            PaymentVerifier::new("", "x"),
            Err(ConfirmationError::Configuration(_))
        ));
        assert!(matches!(
            PaymentVerifier::new("x", ""),
            Err(ConfirmationError::Configuration(_))
        ));
    }

    #[test]
    fn webhook_round_trip() {
        let v = verifier();
        let body = br#"{"event":"payment.captured","payload":{}}"#;
        let sig = v.sign_webhook_body(body).unwrap();
        assert!(v.verify_webhook(body, &sig).is_ok());
    }

    #[test]
    fn webhook_rejects_wrong_secret() {
        let v = verifier();
        let other = PaymentVerifier::new("different-secret", "checkout-secret").unwrap();
        let body = b"payload";
        let sig = other.sign_webhook_body(body).unwrap();
        assert!(matches!(
            v.verify_webhook(body, &sig),
            Err(ConfirmationError::Authentication)
        ));
    }

    #[test]
    fn webhook_rejects_non_hex_signature() {
        let v = verifier();
        assert!(matches!(
            v.verify_webhook(b"payload", "not-hex!"),
            Err(ConfirmationError::Authentication)
        ));
    }

    #[test]
    fn checkout_round_trip() {
        let v = verifier();
        let order = OrderId::new("order_9");
        let payment = PaymentId::new("pay_9");
        let sig = v.sign_checkout(&order, &payment).unwrap();
        assert!(v.verify_checkout(&order, &payment, &sig).is_ok());
        // A different payment id must not verify under the same signature.
        assert!(v
            .verify_checkout(&order, &PaymentId::new("pay_10"), &sig)
            .is_err());
    }

    proptest! {
        /// Tampering with any body byte after signing breaks verification.
        #[test]
        fn tampered_body_never_verifies(
            body in proptest::collection::vec(any::<u8>(), 1..256),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let v = verifier();
            let sig = v.sign_webhook_body(&body).unwrap();
            let mut tampered = body.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= flip;
            prop_assert!(v.verify_webhook(&tampered, &sig).is_err());
        }
    }
}
