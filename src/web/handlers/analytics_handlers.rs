// src/web/handlers/analytics_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::services::AppServices;
use crate::types::{DashboardStats, UserAnalytics};
use crate::web::types::{api_error, ApiResult, DataResponse, UserQuery};

pub async fn get_analytics_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<UserAnalytics> {
    let analytics = services
        .analytics
        .user_analytics(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        "Analytics computed".to_string(),
        analytics,
        None,
    )))
}

pub async fn get_dashboard_stats_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<DashboardStats> {
    let stats = services
        .analytics
        .dashboard_stats(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        "Dashboard stats computed".to_string(),
        stats,
        None,
    )))
}
