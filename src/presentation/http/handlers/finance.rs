//! Finance Handlers
//!
//! HTTP handlers for the cash-flow ledger and the administrative
//! clear-all operations.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{AppendTransactionRequest, LedgerQuery};
use crate::application::dto::response::{DeletedCountResponse, TransactionResponse};
use crate::application::services::{
    AppendTransactionDto, FinanceError, FinanceService, FinanceServiceImpl, FinanceSummaryDto,
};
use crate::domain::value_objects::CalendarDate;
use crate::infrastructure::repositories::{PgAppointmentRepository, PgTransactionRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Helper to convert FinanceError to AppError
fn map_finance_error(e: FinanceError) -> AppError {
    match e {
        FinanceError::Validation(msg) => AppError::BadRequest(msg),
        FinanceError::Overflow => AppError::Internal("Ledger totals overflowed".into()),
        FinanceError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(
    state: &AppState,
) -> FinanceServiceImpl<PgTransactionRepository, PgAppointmentRepository> {
    FinanceServiceImpl::new(
        Arc::new(PgTransactionRepository::new(state.db.clone())),
        Arc::new(PgAppointmentRepository::new(state.db.clone())),
    )
}

fn range_of(query: &LedgerQuery) -> Result<Option<(CalendarDate, CalendarDate)>, AppError> {
    match (query.from, query.to) {
        (Some(from), Some(to)) => {
            if to < from {
                return Err(AppError::BadRequest(
                    "Range end must not precede range start".into(),
                ));
            }
            Ok(Some((from, to)))
        }
        (None, None) => Ok(None),
        _ => Err(AppError::BadRequest(
            "Both from and to are required for a range".into(),
        )),
    }
}

/// Append a ledger entry
///
/// POST /api/v1/transactions
pub async fn append_transaction(
    State(state): State<AppState>,
    Json(body): Json<AppendTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let transaction = build_service(&state)
        .append(AppendTransactionDto {
            description: body.description,
            amount: body.amount,
            date: body.date,
            category: body.category,
            kind: body.kind,
        })
        .await
        .map_err(map_finance_error)?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// List ledger entries, optionally within a date range
///
/// GET /api/v1/transactions?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let range = range_of(&query)?;
    let transactions = build_service(&state)
        .list(range)
        .await
        .map_err(map_finance_error)?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Ledger totals, optionally within a date range
///
/// GET /api/v1/transactions/summary?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn transaction_summary(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<FinanceSummaryDto>, AppError> {
    let range = range_of(&query)?;
    let summary = build_service(&state)
        .summary(range)
        .await
        .map_err(map_finance_error)?;

    Ok(Json(summary))
}

/// Delete every ledger entry
///
/// DELETE /api/v1/admin/transactions
pub async fn clear_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DeletedCountResponse>, AppError> {
    let deleted = build_service(&state)
        .clear_transactions()
        .await
        .map_err(map_finance_error)?;

    tracing::warn!(deleted, operator = %auth.user_id, "All ledger entries deleted");
    Ok(Json(DeletedCountResponse::new(deleted)))
}

/// Delete every appointment
///
/// DELETE /api/v1/admin/appointments
pub async fn clear_appointments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DeletedCountResponse>, AppError> {
    let deleted = build_service(&state)
        .clear_appointments()
        .await
        .map_err(map_finance_error)?;

    tracing::warn!(deleted, operator = %auth.user_id, "All appointments deleted");
    Ok(Json(DeletedCountResponse::new(deleted)))
}
