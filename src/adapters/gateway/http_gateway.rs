//! HTTP payment gateway adapter.
//!
//! Implements the `PaymentGateway` port over the gateway's REST API.
//!
//! # Security
//!
//! - API credential carried via `secrecy::SecretString`, never logged
//! - Error classification keeps transient transport faults (retryable)
//!   separate from business rejections (permanent)

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::ports::{GatewayError, PaymentGateway, TransferReceipt, TransferRequest, TransferState};

const SUCCESS_CODE: &str = "SUCCESS";

/// Payment gateway adapter over HTTP.
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl HttpPaymentGateway {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn classify_status(status: StatusCode) -> GatewayError {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            GatewayError::transient(format!("gateway returned {}", status))
        } else {
            GatewayError::rejected(format!("gateway returned {}", status))
        }
    }
}

/// Outbound transfer request body.
#[derive(Debug, Serialize)]
struct TransferApiRequest<'a> {
    app_id: &'a str,
    out_trade_no: &'a str,
    amount: Decimal,
    account_type: &'a str,
    account_info: &'a str,
    notify_url: &'a str,
}

/// Gateway response to a transfer submission.
#[derive(Debug, Deserialize)]
struct TransferApiResponse {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    fee: Option<Decimal>,
    #[serde(default)]
    actual_amount: Option<Decimal>,
}

/// Gateway response to a transfer status query.
#[derive(Debug, Deserialize)]
struct TransferQueryResponse {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn submit_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let body = TransferApiRequest {
            app_id: &self.config.app_id,
            out_trade_no: &request.reference,
            amount: request.amount,
            account_type: &request.account_type,
            account_info: &request.account_info,
            notify_url: &self.config.notify_url,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/transfers", self.config.endpoint))
            .bearer_auth(self.config.api_secret.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::transient(format!("transfer request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(status));
        }

        let parsed: TransferApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::transient(format!("unreadable gateway response: {}", e)))?;

        if parsed.code != SUCCESS_CODE {
            return Err(GatewayError::rejected(format!(
                "transfer refused: {} ({})",
                parsed.code,
                parsed.msg.unwrap_or_default()
            )));
        }

        let gateway_order_id = parsed.order_id.ok_or_else(|| {
            GatewayError::rejected("gateway accepted the transfer but returned no order id")
        })?;
        let fee = parsed.fee.unwrap_or(Decimal::ZERO);
        let actual_amount = parsed.actual_amount.unwrap_or(request.amount - fee);

        Ok(TransferReceipt {
            gateway_order_id,
            fee,
            actual_amount,
        })
    }

    async fn query_transfer(&self, reference: &str) -> Result<TransferState, GatewayError> {
        let response = self
            .http_client
            .get(format!("{}/v1/transfers/{}", self.config.endpoint, reference))
            .bearer_auth(self.config.api_secret.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::transient(format!("transfer query failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(status));
        }

        let parsed: TransferQueryResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::transient(format!("unreadable gateway response: {}", e)))?;

        if parsed.code != SUCCESS_CODE {
            return Err(GatewayError::rejected(format!(
                "transfer query refused: {} ({})",
                parsed.code,
                parsed.msg.unwrap_or_default()
            )));
        }

        match parsed.status.as_deref() {
            Some("PROCESSING") | Some("PENDING") => Ok(TransferState::Processing),
            Some("SUCCESS") => Ok(TransferState::Succeeded),
            Some("FAIL") | Some("FAILED") | Some("CLOSED") => Ok(TransferState::Failed),
            other => Err(GatewayError::rejected(format!(
                "gateway reported unknown transfer status {:?}",
                other
            ))),
        }
    }
}
