//! Transaction CRUD and listing routes.
//!
//! Every handler takes the owner from [`AuthUser`]. An id that is not a UUID
//! is answered exactly like a missing or foreign record.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{JsonBody, QueryParams};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use fintrack_core::transaction::{
    Frequency, ListParams, PaymentMethod, Transaction, TransactionDraft, TransactionError,
    TransactionKind, TransactionPage, TransactionPatch,
};
use fintrack_shared::types::{PageMeta, TransactionId, UserId};

/// Creates the transaction router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
}

/// A transaction as clients see it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owner.
    pub user_id: UserId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Amount as a JSON number.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    /// Category.
    pub category: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Tags.
    pub tags: Vec<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Whether the transaction repeats.
    pub is_recurring: bool,
    /// Repeat interval.
    pub recurring_frequency: Option<Frequency>,
    /// Next occurrence.
    pub next_recurring_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            date: tx.date,
            description: tx.description,
            amount: tx.amount,
            category: tx.category,
            kind: tx.kind,
            tags: tx.tags,
            notes: tx.notes,
            payment_method: tx.payment_method,
            is_recurring: tx.recurrence.is_some(),
            recurring_frequency: tx.recurrence.map(|r| r.frequency),
            next_recurring_date: tx.recurrence.map(|r| r.next_due_date),
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// One page of the list endpoint.
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    /// Transactions on this page.
    pub transactions: Vec<TransactionResponse>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

impl From<TransactionPage> for TransactionListResponse {
    fn from(page: TransactionPage) -> Self {
        Self {
            transactions: page.transactions.into_iter().map(Into::into).collect(),
            pagination: page.pagination,
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<TransactionId> {
    TransactionId::parse(raw).ok_or_else(|| ApiError::from(TransactionError::NotFound))
}

/// GET /transactions - Filtered, sorted, paginated list.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<Json<ApiResponse<TransactionListResponse>>> {
    let query = params.into_query(auth.user_id())?;
    let page = state.transactions.list(query).await?;

    Ok(Json(ApiResponse::ok(page.into())))
}

/// GET /transactions/{id}
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<TransactionResponse>>> {
    let id = parse_id(&id)?;
    let transaction = state.transactions.get(auth.user_id(), id).await?;

    Ok(Json(ApiResponse::ok(transaction.into())))
}

/// POST /transactions
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(draft): JsonBody<TransactionDraft>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TransactionResponse>>)> {
    let transaction = state.transactions.create(auth.user_id(), &draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            transaction.into(),
            "Transaction created successfully",
        )),
    ))
}

/// PATCH /transactions/{id} - Sparse update; `null` clears optional fields.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<TransactionPatch>,
) -> ApiResult<Json<ApiResponse<TransactionResponse>>> {
    let id = parse_id(&id)?;
    if patch.is_empty() {
        debug!(transaction_id = %id, "empty patch");
    }
    let transaction = state
        .transactions
        .update(auth.user_id(), id, patch)
        .await?;

    Ok(Json(ApiResponse::with_message(
        transaction.into(),
        "Transaction updated successfully",
    )))
}

/// DELETE /transactions/{id} - Returns the deleted record.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<TransactionResponse>>> {
    let id = parse_id(&id)?;
    let transaction = state.transactions.delete(auth.user_id(), id).await?;

    Ok(Json(ApiResponse::with_message(
        transaction.into(),
        "Transaction deleted successfully",
    )))
}
