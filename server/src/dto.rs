//! Request and response bodies of the HTTP interface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use coinledger_common::{parse_amount, parse_cutoff, Timestamp, MIN_AMOUNT};

use crate::state::ServiceState;

pub const AMOUNT_REQUIRED: &str = "Amount is required";
pub const AMOUNT_TOO_SMALL: &str = "Amount must be >= 0.01";
pub const AS_OF_INVALID: &str = "as_of must be an RFC 3339 timestamp or YYYY-MM-DD date";

/// Body of `POST /deposit` and `POST /withdraw`.
///
/// The amount is kept as raw JSON so a number and a numeric string are both
/// read exactly. `serde_json` is built with `arbitrary_precision`, so a JSON
/// number keeps its source digits and never passes through `f64`.
#[derive(Debug, Default, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Option<Value>,
}

impl AmountRequest {
    /// Extract the amount, rejecting anything missing, non-numeric or below
    /// [`MIN_AMOUNT`].
    pub fn validate(&self) -> Result<Decimal, ValidationError> {
        let amount = match &self.amount {
            Some(Value::Number(n)) => parse_amount(&n.to_string()).ok(),
            Some(Value::String(s)) => parse_amount(s).ok(),
            _ => None,
        }
        .ok_or_else(|| ValidationError::amount_required())?;

        if amount < MIN_AMOUNT {
            return Err(ValidationError::single("amount", AMOUNT_TOO_SMALL));
        }
        Ok(amount)
    }
}

/// Query of `GET /balance`.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    pub as_of: Option<String>,
}

impl BalanceQuery {
    pub fn cutoff(&self) -> Result<Option<Timestamp>, ValidationError> {
        match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_cutoff(raw)
                .map(Some)
                .ok_or_else(|| ValidationError::single("as_of", AS_OF_INVALID)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub as_of: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceState,
    pub strategy: &'static str,
    /// Absent when the ledger could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<usize>,
}

/// Messages for one offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

/// Structured rejection of a request that never reached the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub error: String,
    #[serde(rename = "fieldErrors")]
    pub field_errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(field_errors: Vec<FieldError>) -> Self {
        Self {
            error: "Validation failed".to_string(),
            field_errors,
        }
    }

    pub fn single(field: &str, message: &str) -> Self {
        Self::new(vec![FieldError {
            field: field.to_string(),
            messages: vec![message.to_string()],
        }])
    }

    /// Body was missing, malformed, or carried no usable amount.
    pub fn amount_required() -> Self {
        Self::single("amount", AMOUNT_REQUIRED)
    }
}
