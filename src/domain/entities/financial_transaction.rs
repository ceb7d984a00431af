//! Financial ledger entry and repository trait.
//!
//! Maps to the `financial_transactions` table. The ledger is append-only:
//! entries are created and listed, never edited.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Amount, CalendarDate};
use crate::shared::error::AppError;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "expense" => Self::Expense,
            _ => Self::Income,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in the cash-flow ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: Uuid,

    pub description: String,

    pub amount: Amount,

    pub date: CalendarDate,

    /// Free-form category, e.g. "Serviços Prestados"
    pub category: String,

    pub kind: TransactionKind,

    pub created_at: DateTime<Utc>,
}

/// Repository trait for ledger data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<FinancialTransaction>, AppError>;

    /// Entries within an inclusive date range, newest first.
    async fn find_by_date_range(
        &self,
        from: CalendarDate,
        to: CalendarDate,
    ) -> Result<Vec<FinancialTransaction>, AppError>;

    async fn create(
        &self,
        transaction: &FinancialTransaction,
    ) -> Result<FinancialTransaction, AppError>;

    /// Delete every ledger entry. Returns the number of rows removed.
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_strings() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::from_str(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_unknown_kind_defaults_to_income() {
        assert_eq!(TransactionKind::from_str("transfer"), TransactionKind::Income);
    }
}
