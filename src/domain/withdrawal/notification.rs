//! Typed model of the gateway's asynchronous outcome notification.
//!
//! The gateway posts an arbitrary set of form fields. The required fields are
//! lifted into the struct; everything else lands in a sorted catch-all bag so
//! signature-string construction is unambiguous regardless of which optional
//! fields the gateway chose to include.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::errors::WithdrawalError;

/// Field carrying the signature; excluded from the canonical string.
pub const SIGN_FIELD: &str = "sign";
/// Field naming the signature algorithm; excluded from the canonical string.
pub const SIGN_TYPE_FIELD: &str = "sign_type";

const TRADE_STATUS_FIELD: &str = "trade_status";
const BIZ_CONTENT_FIELD: &str = "biz_content";

/// A signed key/value notification from the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayNotification {
    pub sign: String,
    pub sign_type: String,
    pub trade_status: String,
    /// Nested JSON business-content block carrying the encoded task reference.
    pub biz_content: String,
    /// All remaining fields, keyed in ascending order.
    pub extra: BTreeMap<String, String>,
}

impl GatewayNotification {
    /// Builds a notification from decoded form fields.
    ///
    /// Never fails: missing required fields become empty strings and are
    /// rejected downstream (an absent signature is a verification failure,
    /// not a parse error).
    pub fn from_fields(fields: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut sign = String::new();
        let mut sign_type = String::new();
        let mut trade_status = String::new();
        let mut biz_content = String::new();
        let mut extra = BTreeMap::new();

        for (key, value) in fields {
            match key.as_str() {
                SIGN_FIELD => sign = value,
                SIGN_TYPE_FIELD => sign_type = value,
                TRADE_STATUS_FIELD => trade_status = value,
                BIZ_CONTENT_FIELD => biz_content = value,
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        Self {
            sign,
            sign_type,
            trade_status,
            biz_content,
            extra,
        }
    }

    /// Builds the canonical string the signature covers.
    ///
    /// `sign` and `sign_type` are excluded, empty values are dropped, and the
    /// remaining fields are joined as `key=value` pairs with `&` in ascending
    /// key order.
    pub fn canonical_string(&self) -> String {
        let mut fields: BTreeMap<&str, &str> = self
            .extra
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.insert(TRADE_STATUS_FIELD, &self.trade_status);
        fields.insert(BIZ_CONTENT_FIELD, &self.biz_content);

        fields
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parses the nested business-content block.
    pub fn parse_biz_content(&self) -> Result<BizContent, WithdrawalError> {
        serde_json::from_str(&self.biz_content).map_err(|e| {
            WithdrawalError::validation(BIZ_CONTENT_FIELD, format!("malformed JSON: {}", e))
        })
    }

    /// Interprets the trade status code.
    pub fn trade_status(&self) -> TradeStatus {
        TradeStatus::from_code(&self.trade_status)
    }

    /// Serializes every field (signature included) for the audit trail.
    pub fn to_audit_json(&self) -> String {
        let mut fields: BTreeMap<&str, &str> = self
            .extra
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.insert(SIGN_FIELD, &self.sign);
        fields.insert(SIGN_TYPE_FIELD, &self.sign_type);
        fields.insert(TRADE_STATUS_FIELD, &self.trade_status);
        fields.insert(BIZ_CONTENT_FIELD, &self.biz_content);

        serde_json::to_string(&fields).expect("string map serializes")
    }
}

/// Business content nested inside a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct BizContent {
    /// The encoded task reference (`WITHDRAW_<taskId>_<suffix>`).
    pub out_trade_no: String,

    /// The gateway's own order identifier.
    #[serde(default)]
    pub trade_no: Option<String>,

    /// Amount the gateway disbursed.
    #[serde(default)]
    pub amount: Option<Decimal>,

    /// Fee the gateway charged.
    #[serde(default)]
    pub fee: Option<Decimal>,
}

/// Interpreted trade status code from a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeStatus {
    /// The transfer completed.
    Success,
    /// The transfer was rejected or closed by the gateway.
    Failed,
    /// A code this system does not recognize.
    Unknown(String),
}

impl TradeStatus {
    fn from_code(code: &str) -> Self {
        match code {
            "SUCCESS" | "TRADE_SUCCESS" => TradeStatus::Success,
            "FAIL" | "FAILED" | "TRADE_CLOSED" => TradeStatus::Failed,
            other => TradeStatus::Unknown(other.to_string()),
        }
    }
}
