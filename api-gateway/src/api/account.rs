//! Account API handlers
//!
//! Handles endpoints related to account management:
//! - Create account
//! - Get account details
//! - List accounts
//! - Update and delete accounts
//! - Aggregate the total balance across all accounts

use std::str::FromStr;
use std::sync::Arc;

use aggregation_engine::{
    AccountPageReader, AggregateResult, AggregatorConfig, BalanceAggregator, SchedulingMode,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use common::decimal::Amount;
use common::model::account::{Account, AccountChanges, NewAccount};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::ApiError;
use crate::AppState;

/// Create account request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    /// Display name of the account holder
    pub name: String,
    /// Globally unique account number
    pub number: String,
    /// Opening balance, zero when omitted
    pub balance: Option<Amount>,
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account successfully created", body = Account),
        (status = 400, description = "Invalid name or number"),
        (status = 409, description = "Account number already in use"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .create_account(NewAccount {
            name: request.name,
            number: request.number,
            balance: request.balance.unwrap_or(Amount::ZERO),
        })
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(account))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account details retrieved successfully", body = Account),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .account(id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(account))
}

/// List query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of accounts to return (clamped to 1..=1000)
    pub limit: Option<u64>,
    /// Number of accounts to skip
    pub offset: Option<u64>,
}

/// List accounts ordered by id ascending
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(ListQuery),
    responses(
        (status = 200, description = "Accounts retrieved successfully", body = [Account]),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<ApiListResponse<Account>, ApiError> {
    let accounts = state
        .account_service
        .list_accounts(query.limit.unwrap_or(100), query.offset.unwrap_or(0))
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiListResponse::new(accounts))
}

/// Update account request; omitted fields are left unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    /// New display name
    pub name: Option<String>,
    /// New account number
    pub number: Option<String>,
    /// New balance
    pub balance: Option<Amount>,
}

/// Update an account
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated successfully", body = Account),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account number already in use"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state
        .account_service
        .update_account(
            id,
            AccountChanges {
                name: request.name,
                number: request.number,
                balance: request.balance,
            },
        )
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(account))
}

/// Delete confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResult {
    /// Always "deleted"
    pub status: String,
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account deleted successfully", body = DeleteResult),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<DeleteResult>, ApiError> {
    state
        .account_service
        .delete_account(id)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(DeleteResult {
        status: "deleted".to_string(),
    }))
}

/// Balance aggregation query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceTotalQuery {
    /// Scheduling mode: "pool" (default) or "tasks"
    pub mode: Option<String>,
    /// Accounts per page
    pub page_size: Option<u64>,
    /// Concurrency cap for summation units
    pub max_workers: Option<usize>,
}

/// Aggregated balance total
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceTotal {
    /// One sum per successfully aggregated batch, in completion order
    pub per_batch_sums: Vec<Amount>,
    /// Sum of all successful batch sums
    pub total: Amount,
    /// Number of successfully aggregated batches
    pub batch_count: usize,
}

impl From<AggregateResult> for BalanceTotal {
    fn from(result: AggregateResult) -> Self {
        Self {
            per_batch_sums: result.per_batch_sums,
            total: result.total,
            batch_count: result.batch_count,
        }
    }
}

/// Sum all account balances in concurrent batches
#[utoipa::path(
    get,
    path = "/api/v1/accounts/balance-total",
    params(BalanceTotalQuery),
    responses(
        (status = 200, description = "Balances aggregated successfully", body = BalanceTotal),
        (status = 400, description = "Unknown scheduling mode"),
        (status = 500, description = "Aggregation failed before the first page")
    ),
    tag = "account"
)]
pub async fn balance_total(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BalanceTotalQuery>,
) -> Result<ApiResponse<BalanceTotal>, ApiError> {
    let mode = match query.mode.as_deref() {
        Some(mode) => {
            SchedulingMode::from_str(mode).map_err(|e| ApiError::BadRequest(e.to_string()))?
        }
        None => SchedulingMode::default(),
    };

    let config = AggregatorConfig::new(
        query.page_size.unwrap_or(state.agg_config.page_size),
        query.max_workers.unwrap_or(state.agg_config.max_workers),
    );

    let reader = state.account_service.clone() as Arc<dyn AccountPageReader>;
    let result = BalanceAggregator::new(reader, config)
        .aggregate(mode)
        .await
        .map_err(ApiError::Common)?;

    Ok(ApiResponse::new(result.into()))
}
