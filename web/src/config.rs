//! Configuration management for the booking confirmation service.
//!
//! Loads configuration from environment variables. Server settings carry
//! sensible defaults; payment gateway secrets do NOT - a deployment without
//! them fails fast at startup instead of silently running with a fallback
//! value baked into the code.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set or is empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("invalid value for environment variable {0}")]
    InvalidVar(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Payment gateway configuration
    pub razorpay: RazorpayConfig,
    /// SMTP configuration; when absent, confirmations are logged to the
    /// console instead of emailed
    pub smtp: Option<SmtpConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Payment gateway secrets.
///
/// Both values are required. There is no default and no fallback.
#[derive(Clone, Serialize, Deserialize)]
pub struct RazorpayConfig {
    /// Pre-shared secret for webhook signature verification
    pub webhook_secret: String,
    /// API key secret used for checkout-redirect signature verification
    pub key_secret: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets never appear in logs or debug output.
        f.debug_struct("RazorpayConfig").finish_non_exhaustive()
    }
}

/// SMTP transport configuration for confirmation emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay host (e.g. `smtp.example.com`)
    pub relay: String,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// Sender mailbox (e.g. `Bookings <bookings@example.com>`)
    pub from: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a gateway secret is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let smtp = match env::var("SMTP_RELAY") {
            Ok(relay) if !relay.is_empty() => Some(SmtpConfig {
                relay,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from: required("SMTP_FROM")?,
            }),
            _ => None,
        };

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .map_or(Ok(8080), |s| s.parse().map_err(|_| ConfigError::InvalidVar("PORT")))?,
            },
            razorpay: RazorpayConfig {
                webhook_secret: required("RAZORPAY_WEBHOOK_SECRET")?,
                key_secret: required("RAZORPAY_KEY_SECRET")?,
            },
            smtp,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
