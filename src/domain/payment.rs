use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::money::Money;

/// A self-reported purchase claim awaiting administrative review.
///
/// The requester fields are a snapshot taken at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    /// Plan label, e.g. `120 Credits`.
    pub plan: String,
    pub amount: Money,
    pub transaction_id: String,
    /// Payment date as entered by the requester.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    /// Approved and rejected requests never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// Purchase details supplied by the requester.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub plan: String,
    pub amount: Money,
    pub transaction_id: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl PaymentRequest {
    pub fn set_status(&mut self, status: PaymentStatus) {
        self.status = status;
    }
}
