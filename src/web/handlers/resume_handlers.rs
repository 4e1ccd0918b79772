// src/web/handlers/resume_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::resume_analysis::ResumeUpload;
use crate::services::AppServices;
use crate::types::ResumeRecord;
use crate::web::types::{
    api_error, not_found, ApiResult, DataResponse, StandardRequest, UploadResumeRequest,
    UserQuery, WithConversationId,
};

/// Analyze and store the resume, answer right away, then discover jobs in the background
pub async fn upload_resume_handler(
    request: Json<StandardRequest<UploadResumeRequest>>,
    services: &State<AppServices>,
) -> ApiResult<ResumeRecord> {
    let conversation_id = request.conversation_id();
    let StandardRequest { data: body, .. } = request.into_inner();

    app_log!(info, "Resume upload from {}: {}", body.user_id, body.file_name);

    let record = services
        .resumes
        .ingest(
            &body.user_id,
            ResumeUpload {
                file_name: body.file_name,
                file_url: body.file_url,
                text: body.text,
            },
        )
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    // detached; the handle is not awaited
    services.discovery.spawn_background_discovery(
        record.user_id.clone(),
        record.analysis.clone(),
        record.file_name.clone(),
    );

    Ok(Json(DataResponse::success(
        "Resume analyzed. Job discovery started in the background".to_string(),
        record,
        conversation_id,
    )))
}

pub async fn get_resume_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<ResumeRecord> {
    let resume = services
        .resumes
        .get(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    match resume {
        Some(record) => Ok(Json(DataResponse::success(
            "Resume found".to_string(),
            record,
            None,
        ))),
        None => Err(not_found(
            "No resume uploaded for this user".to_string(),
            vec!["Upload your resume first".to_string()],
            None,
        )),
    }
}
