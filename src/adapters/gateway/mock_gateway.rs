//! Mock payment gateway for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::ports::{GatewayError, PaymentGateway, TransferReceipt, TransferRequest, TransferState};

/// Deterministic in-memory gateway.
///
/// Accepts every transfer, charges a fixed per-mille fee, and reports
/// submitted transfers as `Processing` until a test flips their state via
/// [`MockPaymentGateway::set_state`].
pub struct MockPaymentGateway {
    fee_per_mille: Decimal,
    states: Mutex<HashMap<String, TransferState>>,
}

impl MockPaymentGateway {
    /// Creates a gateway charging 6 per mille.
    pub fn new() -> Self {
        Self {
            fee_per_mille: Decimal::from(6),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the reported state for a reference.
    pub fn set_state(&self, reference: &str, state: TransferState) {
        self.states
            .lock()
            .unwrap()
            .insert(reference.to_string(), state);
    }

    fn fee_for(&self, amount: Decimal) -> Decimal {
        (amount * self.fee_per_mille / Decimal::from(1000)).round_dp(2)
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn submit_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferReceipt, GatewayError> {
        let fee = self.fee_for(request.amount);
        self.states
            .lock()
            .unwrap()
            .entry(request.reference.clone())
            .or_insert(TransferState::Processing);

        Ok(TransferReceipt {
            gateway_order_id: format!("MOCK-{}", request.reference),
            fee,
            actual_amount: request.amount - fee,
        })
    }

    async fn query_transfer(&self, reference: &str) -> Result<TransferState, GatewayError> {
        self.states
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::rejected(format!("unknown transfer '{}'", reference)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: i64) -> TransferRequest {
        TransferRequest {
            reference: "WITHDRAW_10_abc".to_string(),
            amount: Decimal::from(amount),
            account_type: "bank".to_string(),
            account_info: "6222".to_string(),
        }
    }

    #[tokio::test]
    async fn charges_six_per_mille() {
        let gateway = MockPaymentGateway::new();
        let receipt = gateway.submit_transfer(request(1000)).await.unwrap();
        assert_eq!(receipt.fee, Decimal::from(6));
        assert_eq!(receipt.actual_amount, Decimal::from(994));
        assert_eq!(receipt.gateway_order_id, "MOCK-WITHDRAW_10_abc");
    }

    #[tokio::test]
    async fn submitted_transfers_report_processing() {
        let gateway = MockPaymentGateway::new();
        gateway.submit_transfer(request(100)).await.unwrap();
        assert_eq!(
            gateway.query_transfer("WITHDRAW_10_abc").await.unwrap(),
            TransferState::Processing
        );
    }

    #[tokio::test]
    async fn set_state_changes_the_reported_ground_truth() {
        let gateway = MockPaymentGateway::new();
        gateway.submit_transfer(request(100)).await.unwrap();
        gateway.set_state("WITHDRAW_10_abc", TransferState::Succeeded);
        assert_eq!(
            gateway.query_transfer("WITHDRAW_10_abc").await.unwrap(),
            TransferState::Succeeded
        );
    }

    #[tokio::test]
    async fn unknown_references_are_rejected() {
        let gateway = MockPaymentGateway::new();
        let result = gateway.query_transfer("WITHDRAW_404_x").await;
        assert!(matches!(result, Err(GatewayError { retryable: false, .. })));
    }
}
