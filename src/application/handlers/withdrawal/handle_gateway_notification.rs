//! HandleGatewayNotificationHandler - processes asynchronous gateway
//! outcome notifications.
//!
//! Deliveries are at-least-once: the gateway redelivers until it sees the
//! acknowledged token. The return type therefore distinguishes three cases
//! the HTTP adapter maps onto the two ack literals:
//!
//! - `Ok(Applied | Duplicate | Rejected)` - processing genuinely completed
//!   (including permanent rejections, which are logged in full first); the
//!   gateway should stop retrying.
//! - `Err(_)` - a plausibly transient internal failure; the gateway's own
//!   retry mechanism is the recovery path.

use std::sync::Arc;

use crate::domain::withdrawal::{
    reference, GatewayNotification, SettlementOutcome, SignatureVerifier, TradeStatus,
    WithdrawStatus, WithdrawalError,
};
use crate::domain::foundation::WithdrawId;

use super::settlement::{AppliedSettlement, SettlementService};

/// Command wrapping the decoded form fields of a notification POST.
#[derive(Debug, Clone)]
pub struct GatewayNotificationCommand {
    pub fields: Vec<(String, String)>,
}

/// Outcome of processing one notification delivery.
#[derive(Debug, Clone)]
pub enum NotificationOutcome {
    /// This delivery performed the settlement transition.
    Applied {
        withdraw_id: WithdrawId,
        status: WithdrawStatus,
    },
    /// A previous delivery already settled the record; nothing changed.
    Duplicate { status: WithdrawStatus },
    /// The notification is permanently invalid (bad signature, malformed
    /// reference, no matching record, unrecognized status code).
    Rejected { reason: String },
}

/// Handler for inbound gateway notifications.
pub struct HandleGatewayNotificationHandler {
    verifier: Arc<SignatureVerifier>,
    settlement: SettlementService,
}

impl HandleGatewayNotificationHandler {
    pub fn new(verifier: Arc<SignatureVerifier>, settlement: SettlementService) -> Self {
        Self {
            verifier,
            settlement,
        }
    }

    pub async fn handle(
        &self,
        cmd: GatewayNotificationCommand,
    ) -> Result<NotificationOutcome, WithdrawalError> {
        let notification = GatewayNotification::from_fields(cmd.fields);

        // 1. Authenticate. A bad signature is either misconfiguration or a
        //    forgery; both are logged with the full payload and never
        //    silently swallowed.
        if let Err(e) = self.verifier.verify(&notification) {
            tracing::error!(
                payload = %notification.to_audit_json(),
                error = %e,
                "gateway notification rejected: signature verification failed"
            );
            return Ok(NotificationOutcome::Rejected { reason: e.message() });
        }

        // 2. Extract the task reference from the business content.
        let biz = match notification.parse_biz_content() {
            Ok(biz) => biz,
            Err(e) => return Ok(self.reject(&notification, e)),
        };
        let task_id = match reference::decode(&biz.out_trade_no) {
            Ok(task_id) => task_id,
            Err(e) => return Ok(self.reject(&notification, e)),
        };

        // 3. Interpret the trade status.
        let outcome = match notification.trade_status() {
            TradeStatus::Success => SettlementOutcome::Success,
            TradeStatus::Failed => SettlementOutcome::Failed,
            TradeStatus::Unknown(code) => {
                return Ok(self.reject(
                    &notification,
                    WithdrawalError::validation(
                        "trade_status",
                        format!("unrecognized code '{}'", code),
                    ),
                ));
            }
        };

        // 4. Apply via compare-and-swap. Infrastructure failures propagate as
        //    Err so the gateway retries; everything else is final.
        let applied = self
            .settlement
            .apply_outcome(
                task_id,
                outcome,
                biz.trade_no.as_deref(),
                Some(&notification.to_audit_json()),
            )
            .await?;

        match applied {
            AppliedSettlement::Applied(record) => Ok(NotificationOutcome::Applied {
                withdraw_id: record.id,
                status: record.status,
            }),
            AppliedSettlement::Duplicate(status) => {
                Ok(NotificationOutcome::Duplicate { status })
            }
            AppliedSettlement::NotFound => Ok(self.reject(
                &notification,
                WithdrawalError::validation(
                    "out_trade_no",
                    format!("no withdrawal exists for task {}", task_id),
                ),
            )),
        }
    }

    fn reject(
        &self,
        notification: &GatewayNotification,
        error: WithdrawalError,
    ) -> NotificationOutcome {
        tracing::error!(
            payload = %notification.to_audit_json(),
            error = %error,
            "gateway notification rejected"
        );
        NotificationOutcome::Rejected {
            reason: error.message(),
        }
    }
}
