//! Finance Service
//!
//! The cash-flow ledger: appending entries, listing, totals and the
//! administrative clear-all operations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    AppointmentRepository, FinancialTransaction, TransactionKind, TransactionRepository,
};
use crate::domain::value_objects::{Amount, CalendarDate};

/// Finance service trait for ledger operations.
#[async_trait]
pub trait FinanceService: Send + Sync {
    /// Append one entry to the ledger.
    async fn append(&self, request: AppendTransactionDto)
        -> Result<FinancialTransaction, FinanceError>;

    /// List entries, optionally restricted to an inclusive date range.
    async fn list(
        &self,
        range: Option<(CalendarDate, CalendarDate)>,
    ) -> Result<Vec<FinancialTransaction>, FinanceError>;

    /// Income, expense and net totals over the same optional range.
    async fn summary(
        &self,
        range: Option<(CalendarDate, CalendarDate)>,
    ) -> Result<FinanceSummaryDto, FinanceError>;

    /// Delete every ledger entry. Returns the number removed.
    async fn clear_transactions(&self) -> Result<u64, FinanceError>;

    /// Delete every appointment. Returns the number removed.
    async fn clear_appointments(&self) -> Result<u64, FinanceError>;
}

/// Request DTO for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct AppendTransactionDto {
    pub description: String,
    pub amount: Amount,
    pub date: CalendarDate,
    pub category: String,
    pub kind: TransactionKind,
}

/// Ledger totals.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FinanceSummaryDto {
    pub total_income: String,
    pub total_expense: String,
    pub net: String,
    pub entry_count: usize,
}

/// Finance service errors.
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    #[error("Invalid transaction: {0}")]
    Validation(String),

    #[error("Ledger totals overflowed")]
    Overflow,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Finance service implementation.
pub struct FinanceServiceImpl<T, A>
where
    T: TransactionRepository,
    A: AppointmentRepository,
{
    transaction_repo: Arc<T>,
    appointment_repo: Arc<A>,
}

impl<T, A> FinanceServiceImpl<T, A>
where
    T: TransactionRepository,
    A: AppointmentRepository,
{
    pub fn new(transaction_repo: Arc<T>, appointment_repo: Arc<A>) -> Self {
        Self {
            transaction_repo,
            appointment_repo,
        }
    }
}

#[async_trait]
impl<T, A> FinanceService for FinanceServiceImpl<T, A>
where
    T: TransactionRepository + 'static,
    A: AppointmentRepository + 'static,
{
    async fn append(
        &self,
        request: AppendTransactionDto,
    ) -> Result<FinancialTransaction, FinanceError> {
        if request.description.trim().is_empty() {
            return Err(FinanceError::Validation(
                "Description must not be empty".into(),
            ));
        }
        if !request.amount.is_positive() {
            return Err(FinanceError::Validation("Amount must be positive".into()));
        }
        if request.category.trim().is_empty() {
            return Err(FinanceError::Validation(
                "Category must not be empty".into(),
            ));
        }

        let transaction = FinancialTransaction {
            id: Uuid::new_v4(),
            description: request.description.trim().to_string(),
            amount: request.amount,
            date: request.date,
            category: request.category.trim().to_string(),
            kind: request.kind,
            created_at: Utc::now(),
        };

        self.transaction_repo
            .create(&transaction)
            .await
            .map_err(|e| FinanceError::Internal(e.to_string()))
    }

    async fn list(
        &self,
        range: Option<(CalendarDate, CalendarDate)>,
    ) -> Result<Vec<FinancialTransaction>, FinanceError> {
        let result = match range {
            Some((from, to)) => self.transaction_repo.find_by_date_range(from, to).await,
            None => self.transaction_repo.find_all().await,
        };
        result.map_err(|e| FinanceError::Internal(e.to_string()))
    }

    async fn summary(
        &self,
        range: Option<(CalendarDate, CalendarDate)>,
    ) -> Result<FinanceSummaryDto, FinanceError> {
        let entries = self.list(range).await?;

        let mut income = Amount::ZERO;
        let mut expense = Amount::ZERO;
        for entry in &entries {
            match entry.kind {
                TransactionKind::Income => {
                    income = income
                        .checked_add(entry.amount)
                        .ok_or(FinanceError::Overflow)?;
                }
                TransactionKind::Expense => {
                    expense = expense
                        .checked_add(entry.amount)
                        .ok_or(FinanceError::Overflow)?;
                }
            }
        }
        let net = income.checked_sub(expense).ok_or(FinanceError::Overflow)?;

        Ok(FinanceSummaryDto {
            total_income: income.to_string(),
            total_expense: expense.to_string(),
            net: net.to_string(),
            entry_count: entries.len(),
        })
    }

    async fn clear_transactions(&self) -> Result<u64, FinanceError> {
        let deleted = self
            .transaction_repo
            .delete_all()
            .await
            .map_err(|e| FinanceError::Internal(e.to_string()))?;
        tracing::warn!(deleted, "Cleared all financial transactions");
        Ok(deleted)
    }

    async fn clear_appointments(&self) -> Result<u64, FinanceError> {
        let deleted = self
            .appointment_repo
            .delete_all()
            .await
            .map_err(|e| FinanceError::Internal(e.to_string()))?;
        tracing::warn!(deleted, "Cleared all appointments");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::appointment::MockAppointmentRepository;
    use crate::domain::entities::financial_transaction::MockTransactionRepository;
    use pretty_assertions::assert_eq;

    fn entry(kind: TransactionKind, amount: &str) -> FinancialTransaction {
        FinancialTransaction {
            id: Uuid::new_v4(),
            description: "entry".into(),
            amount: amount.parse().unwrap(),
            date: "2026-03-01".parse().unwrap(),
            category: "misc".into(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn build(
        transactions: MockTransactionRepository,
        appointments: MockAppointmentRepository,
    ) -> FinanceServiceImpl<MockTransactionRepository, MockAppointmentRepository> {
        FinanceServiceImpl::new(Arc::new(transactions), Arc::new(appointments))
    }

    #[tokio::test]
    async fn test_summary_totals_income_expense_and_net() {
        let entries = vec![
            entry(TransactionKind::Income, "150,00"),
            entry(TransactionKind::Income, "89,90"),
            entry(TransactionKind::Expense, "40,00"),
        ];

        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_all()
            .returning(move || Ok(entries.clone()));

        let summary = build(transactions, MockAppointmentRepository::new())
            .summary(None)
            .await
            .unwrap();

        assert_eq!(summary.total_income, "239.90");
        assert_eq!(summary.total_expense, "40.00");
        assert_eq!(summary.net, "199.90");
        assert_eq!(summary.entry_count, 3);
    }

    #[tokio::test]
    async fn test_summary_with_range_uses_filtered_query() {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_date_range()
            .times(1)
            .returning(|_, _| Ok(vec![]));
        transactions.expect_find_all().times(0);

        let from: CalendarDate = "2026-03-01".parse().unwrap();
        let to: CalendarDate = "2026-03-31".parse().unwrap();
        let summary = build(transactions, MockAppointmentRepository::new())
            .summary(Some((from, to)))
            .await
            .unwrap();
        assert_eq!(summary.net, "0.00");
    }

    #[tokio::test]
    async fn test_append_rejects_nonpositive_amount() {
        let result = build(
            MockTransactionRepository::new(),
            MockAppointmentRepository::new(),
        )
        .append(AppendTransactionDto {
            description: "Produtos".into(),
            amount: "0,00".parse().unwrap(),
            date: "2026-03-01".parse().unwrap(),
            category: "Compras".into(),
            kind: TransactionKind::Expense,
        })
        .await;
        assert!(matches!(result, Err(FinanceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_clear_all_reports_deleted_counts() {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_delete_all().returning(|| Ok(12));
        let mut appointments = MockAppointmentRepository::new();
        appointments.expect_delete_all().returning(|| Ok(7));

        let service = build(transactions, appointments);
        assert_eq!(service.clear_transactions().await.unwrap(), 12);
        assert_eq!(service.clear_appointments().await.unwrap(), 7);
    }
}
