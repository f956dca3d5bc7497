//! Billing API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::billing;
use crate::utils::AppResult;
use crate::utils::reference::payment_reference;

use shared::models::{
    BillingQuery, BillingTransaction, BillingTransactionDetail, ManualTransactionCreate,
    TransactionStatusUpdate,
};

/// Admin ledger joined with member info
pub async fn list_admin(
    State(state): State<ServerState>,
    Query(query): Query<BillingQuery>,
) -> AppResult<Json<Vec<BillingTransactionDetail>>> {
    let rows = billing::list_admin(state.pool(), &query).await?;
    Ok(Json(rows))
}

/// Record a completed payment or refund
pub async fn create_manual(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(payload): Json<ManualTransactionCreate>,
) -> AppResult<Json<BillingTransaction>> {
    payload.validate()?;
    let reference = payment_reference(payload.transaction_type.reference_prefix());
    let tx = billing::create_manual(
        state.pool(),
        &payload,
        admin.id,
        &state.config.gym.billing_currency,
        &reference,
    )
    .await?;

    tracing::info!(
        transaction_id = tx.id,
        user_id = tx.user_id,
        amount = tx.amount,
        reference = %reference,
        admin_id = admin.id,
        "Manual transaction recorded"
    );
    Ok(Json(tx))
}

/// Move a transaction along `pending -> completed | cancelled`, `completed -> refunded`
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionStatusUpdate>,
) -> AppResult<Json<BillingTransaction>> {
    let tx = billing::update_status(state.pool(), id, payload.status).await?;
    tracing::info!(
        transaction_id = id,
        status = tx.status.as_str(),
        admin_id = admin.id,
        "Transaction status updated"
    );
    Ok(Json(tx))
}

/// The member's own transactions, newest first
pub async fn list_own(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<BillingTransaction>>> {
    let rows = billing::list_for_user(state.pool(), current.id).await?;
    Ok(Json(rows))
}
