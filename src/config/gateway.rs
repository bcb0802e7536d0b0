//! Payment gateway configuration
//!
//! Explicitly constructed and injected into the gateway client and the
//! signature verifier; there is no process-wide gateway singleton.

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Application id issued by the gateway
    pub app_id: String,

    /// Base URL of the gateway API
    pub endpoint: String,

    /// API credential for outbound calls
    pub api_secret: SecretString,

    /// Gateway RSA public key for notification verification (PEM, or bare
    /// base64 which gets wrapped with PEM markers at use)
    pub public_key: String,

    /// URL the gateway posts outcome notifications to
    pub notify_url: String,

    /// Minutes after which a processing withdrawal counts as stale and is
    /// surfaced for reconciliation
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
}

impl GatewayConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_APP_ID"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayEndpoint);
        }
        if self.public_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_PUBLIC_KEY"));
        }
        if self.stale_after_minutes <= 0 {
            return Err(ValidationError::InvalidStalenessWindow);
        }
        Ok(())
    }
}

fn default_stale_after_minutes() -> i64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            app_id: "2026000001".to_string(),
            endpoint: "https://gateway.example.com".to_string(),
            api_secret: SecretString::new("secret".to_string()),
            public_key: "MIIBIjANBg...".to_string(),
            notify_url: "https://admin.example.com/api/notifications/gateway".to_string(),
            stale_after_minutes: 30,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn empty_app_id_fails() {
        let config = GatewayConfig {
            app_id: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_endpoint_fails() {
        let config = GatewayConfig {
            endpoint: "ftp://gateway.example.com".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_public_key_fails() {
        let config = GatewayConfig {
            public_key: "   ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_staleness_window_fails() {
        let config = GatewayConfig {
            stale_after_minutes: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
