// src/web/handlers/job_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::services::AppServices;
use crate::types::JobMatch;
use crate::web::types::{
    api_error, ApiResult, DataResponse, DiscoverJobsRequest, StandardRequest, StatusUpdateData,
    UpdateStatusRequest, UserQuery, WithConversationId,
};

pub async fn discover_jobs_handler(
    request: Json<StandardRequest<DiscoverJobsRequest>>,
    services: &State<AppServices>,
) -> ApiResult<Vec<JobMatch>> {
    let conversation_id = request.conversation_id();
    let body = &request.data;

    app_log!(info, "Job discovery requested by {}", body.user_id);

    let outcome = services
        .discovery
        .discover(&body.user_id, body.location.as_deref(), body.limit)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        outcome.message(),
        outcome.into_matches(),
        conversation_id,
    )))
}

pub async fn get_jobs_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<Vec<JobMatch>> {
    let jobs = services
        .discovery
        .current_jobs(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        format!("Found {} job matches", jobs.len()),
        jobs,
        None,
    )))
}

pub async fn update_job_status_handler(
    request: Json<StandardRequest<UpdateStatusRequest>>,
    services: &State<AppServices>,
) -> ApiResult<StatusUpdateData> {
    let conversation_id = request.conversation_id();
    let body = &request.data;

    let updated = services
        .discovery
        .update_status(&body.user_id, &body.id, body.status)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    let message = if updated {
        format!("Job marked as {}", body.status)
    } else {
        app_log!(warn, "No job match {} for user {}", body.id, body.user_id);
        "No matching job found for this user".to_string()
    };

    Ok(Json(DataResponse::success(
        message,
        StatusUpdateData {
            id: body.id.clone(),
            status: body.status,
            updated,
        },
        conversation_id,
    )))
}
