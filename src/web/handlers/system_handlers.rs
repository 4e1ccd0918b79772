// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;

use crate::app_log;
use crate::web::types::TextResponse;

pub async fn health_handler() -> Json<TextResponse> {
    app_log!(debug, "Health check");
    Json(TextResponse::success("OK".to_string(), None))
}
