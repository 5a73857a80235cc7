// api-gateway/src/lib.rs
pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use account_service::AccountService;
use aggregation_engine::AggregatorConfig;
use axum::{
    routing::{get, post},
    Router,
};
use rate_feed::RateFeedService;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::account::{
    balance_total, create_account, delete_account, get_account, list_accounts, update_account,
};
use crate::api::rates::get_rates;

/// App state shared across handlers
pub struct AppState {
    /// Account service
    pub account_service: Arc<AccountService>,
    /// Default aggregation knobs; per-request query params may override
    pub agg_config: AggregatorConfig,
    /// Interest-rate feed
    pub rate_feed: Arc<RateFeedService>,
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::account::create_account,
        api::account::get_account,
        api::account::list_accounts,
        api::account::update_account,
        api::account::delete_account,
        api::account::balance_total,
        api::rates::get_rates,
    ),
    components(
        schemas(
            api::account::CreateAccountRequest,
            api::account::UpdateAccountRequest,
            api::account::BalanceTotal,
            api::account::DeleteResult,
            common::model::account::Account,
            rate_feed::RateSheet,
            api::response::ResponseMetadata,
        )
    ),
    tags(
        (name = "account", description = "Account management endpoints"),
        (name = "rates", description = "Interest rate endpoints")
    ),
    info(
        title = "Bank Account API",
        version = "1.0.0",
        description = "API for managing bank accounts and aggregating balances"
    )
)]
pub struct ApiDoc;

/// Build the full application router over the given state.
///
/// Shared by the gateway binary and the integration binary so the route
/// table exists in exactly one place.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Account routes
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/balance-total", get(balance_total))
        .route(
            "/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        // Rate routes
        .route("/rates", get(get_rates));

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(swagger_ui)
        .with_state(state)
}
