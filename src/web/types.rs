// src/web/types.rs
use rocket::form::FromForm;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::app_log;
use crate::core::PipelineError;
use crate::types::{JobStatus, QuestionCategory};

// ===== Response Envelopes =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Error,
}

/// Error body plus the status it is sent with
pub type ApiError = (Status, Json<StandardErrorResponse>);
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

/// Map a service error to a status and envelope. Typed pipeline errors keep
/// their own code; anything else is a 500 with a generic message.
pub fn api_error(err: &anyhow::Error, conversation_id: Option<String>) -> ApiError {
    match err.downcast_ref::<PipelineError>() {
        Some(pipeline_error) => {
            let status = match pipeline_error {
                PipelineError::UpstreamMalformed(_) => Status::BadGateway,
                _ => Status::BadRequest,
            };
            app_log!(warn, "Request failed ({}): {:#}", status.code, err);
            (
                status,
                Json(StandardErrorResponse::new(
                    pipeline_error.to_string(),
                    pipeline_error.code().to_string(),
                    pipeline_error.suggestions(),
                    conversation_id,
                )),
            )
        }
        None => {
            app_log!(error, "Request failed: {:#}", err);
            (
                Status::InternalServerError,
                Json(StandardErrorResponse::new(
                    err.to_string(),
                    "INTERNAL_ERROR".to_string(),
                    vec![
                        "Try again in a few moments".to_string(),
                        "Contact support if the problem persists".to_string(),
                    ],
                    conversation_id,
                )),
            )
        }
    }
}

pub fn not_found(error: String, suggestions: Vec<String>, conversation_id: Option<String>) -> ApiError {
    (
        Status::NotFound,
        Json(StandardErrorResponse::new(
            error,
            "NOT_FOUND".to_string(),
            suggestions,
            conversation_id,
        )),
    )
}

// ===== Requests =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

/// `?userId=` on the read endpoints
#[derive(FromForm)]
pub struct UserQuery {
    #[field(name = "userId")]
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or("")
    }
}

/// `?userId=&prepId=&category=` on the mock-interview question feed
#[derive(FromForm)]
pub struct QuestionsQuery {
    #[field(name = "userId")]
    pub user_id: Option<String>,
    #[field(name = "prepId")]
    pub prep_id: Option<String>,
    pub category: Option<String>,
}

impl QuestionsQuery {
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or("")
    }

    pub fn category(&self) -> QuestionCategory {
        QuestionCategory::from_name(self.category.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct DiscoverJobsRequest {
    #[serde(default)]
    pub user_id: String,
    pub location: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub user_id: String,
    pub id: String,
    pub status: JobStatus,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UploadResumeRequest {
    #[serde(default)]
    pub user_id: String,
    pub file_name: String,
    pub file_url: Option<String>,
    pub text: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct InterviewPrepRequest {
    #[serde(default)]
    pub user_id: String,
    pub role: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

// ===== Response Data =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct StatusUpdateData {
    pub id: String,
    pub status: JobStatus,
    pub updated: bool,
}
