// src/web/handlers/interview_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::services::AppServices;
use crate::types::{InterviewPrep, MockQuestion};
use crate::web::types::{
    api_error, ApiResult, DataResponse, InterviewPrepRequest, QuestionsQuery, StandardRequest,
    UserQuery, WithConversationId,
};

pub async fn generate_interview_prep_handler(
    request: Json<StandardRequest<InterviewPrepRequest>>,
    services: &State<AppServices>,
) -> ApiResult<InterviewPrep> {
    let conversation_id = request.conversation_id();
    let body = &request.data;

    let prep = services
        .interviews
        .generate(&body.user_id, &body.role, &body.technologies)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!("Interview prep generated for {}", prep.role),
        prep,
        conversation_id,
    )))
}

pub async fn list_interview_preps_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<Vec<InterviewPrep>> {
    let preps = services
        .interviews
        .list(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        format!("Found {} interview preps", preps.len()),
        preps,
        None,
    )))
}

pub async fn latest_interview_prep_handler(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<Option<InterviewPrep>> {
    let latest = services
        .interviews
        .latest(query.user_id())
        .await
        .map_err(|e| api_error(&e, None))?;

    let message = match &latest {
        Some(prep) => format!("Latest interview prep: {}", prep.role),
        None => "No interview prep generated yet".to_string(),
    };
    Ok(Json(DataResponse::success(message, latest, None)))
}

pub async fn interview_questions_handler(
    query: QuestionsQuery,
    services: &State<AppServices>,
) -> ApiResult<Vec<MockQuestion>> {
    let questions = services
        .interviews
        .mock_questions(query.user_id(), query.prep_id.as_deref(), query.category())
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        format!("Loaded {} interview questions", questions.len()),
        questions,
        None,
    )))
}
