//! Statistics routes.

use axum::{Json, Router, extract::State, routing::get};

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::QueryParams;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use fintrack_core::transaction::{CategoryStat, MonthlyStat, StatsParams, TypeSummary};

/// Creates the statistics router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions/stats", get(summary))
        .route("/transactions/stats/categories", get(categories))
        .route("/transactions/stats/monthly", get(monthly))
}

/// GET /transactions/stats - Totals by type.
async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<StatsParams>,
) -> ApiResult<Json<ApiResponse<TypeSummary>>> {
    let range = params.date_range()?;
    let summary = state.transactions.summary(auth.user_id(), range).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /transactions/stats/categories - Totals by category and type.
async fn categories(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<StatsParams>,
) -> ApiResult<Json<ApiResponse<Vec<CategoryStat>>>> {
    let (range, kind) = params.range_and_kind()?;
    let stats = state
        .transactions
        .category_stats(auth.user_id(), range, kind)
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /transactions/stats/monthly - Month-by-month trend.
async fn monthly(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(params): QueryParams<StatsParams>,
) -> ApiResult<Json<ApiResponse<Vec<MonthlyStat>>>> {
    let year = params.year()?;
    let months = state.transactions.monthly_stats(auth.user_id(), year).await?;
    Ok(Json(ApiResponse::ok(months)))
}
