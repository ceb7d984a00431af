//! Transaction Repository Implementation
//!
//! PostgreSQL implementation of the TransactionRepository trait. The
//! ledger is append-only; there are no update statements here.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{FinancialTransaction, TransactionKind, TransactionRepository};
use crate::domain::value_objects::{Amount, CalendarDate};
use crate::shared::error::AppError;

/// Database row representation matching the financial_transactions table.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    description: String,
    amount: Decimal,
    date: NaiveDate,
    category: String,
    kind: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> FinancialTransaction {
        FinancialTransaction {
            id: self.id,
            description: self.description,
            amount: Amount::new(self.amount),
            date: CalendarDate::new(self.date),
            category: self.category,
            kind: TransactionKind::from_str(&self.kind),
            created_at: self.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, description, amount, date, category, kind, created_at
    FROM financial_transactions
"#;

/// PostgreSQL transaction repository implementation.
#[derive(Clone)]
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn find_all(&self) -> Result<Vec<FinancialTransaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "{} ORDER BY date DESC, created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TransactionRow::into_transaction)
            .collect())
    }

    async fn find_by_date_range(
        &self,
        from: CalendarDate,
        to: CalendarDate,
    ) -> Result<Vec<FinancialTransaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "{} WHERE date BETWEEN $1 AND $2 ORDER BY date DESC, created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(from.inner())
        .bind(to.inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TransactionRow::into_transaction)
            .collect())
    }

    async fn create(
        &self,
        transaction: &FinancialTransaction,
    ) -> Result<FinancialTransaction, AppError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO financial_transactions (id, description, amount, date, category, kind)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, description, amount, date, category, kind, created_at
            "#,
        )
        .bind(transaction.id)
        .bind(&transaction.description)
        .bind(transaction.amount.inner())
        .bind(transaction.date.inner())
        .bind(&transaction.category)
        .bind(transaction.kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_transaction())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM financial_transactions")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
