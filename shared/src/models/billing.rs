//! Billing Ledger Model

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TransactionType {
    Payment,
    Refund,
}

impl TransactionType {
    /// Reference prefix, e.g. `PAYMENT_1A2B3C4D`
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            Self::Payment => "PAYMENT",
            Self::Refund => "REFUND",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// `pending → completed | cancelled`, `completed → refunded`
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Cancelled) | (Self::Completed, Self::Refunded)
        )
    }
}

/// Ledger entry (DB row). Only `status` and its timestamps change after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BillingTransaction {
    pub id: i64,
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub description: Option<String>,
    pub processed_by: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ledger entry joined with member info (admin view)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BillingTransactionDetail {
    pub id: i64,
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub description: Option<String>,
    pub processed_by: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: Option<String>,
}

/// Manual transaction recorded by an admin
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ManualTransactionCreate {
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatusUpdate {
    pub status: TransactionStatus,
}

/// Admin ledger filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingQuery {
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<String>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_transitions() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Cancelled.can_transition_to(Completed));
        assert!(!Refunded.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn test_reference_prefix() {
        assert_eq!(TransactionType::Payment.reference_prefix(), "PAYMENT");
        assert_eq!(TransactionType::Refund.reference_prefix(), "REFUND");
    }
}
