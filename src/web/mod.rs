// src/web/mod.rs
//! JSON API mounted under /api

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, patch, post, routes, Build, Request, Response, Rocket, State};

use crate::app_log;
use crate::services::AppServices;
use crate::types::{
    DashboardStats, InterviewPrep, JobMatch, MockQuestion, ResumeRecord, UserAnalytics,
};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// ===== Routes =====

#[post("/jobs/discover", data = "<request>")]
pub async fn discover_jobs(
    request: Json<StandardRequest<DiscoverJobsRequest>>,
    services: &State<AppServices>,
) -> ApiResult<Vec<JobMatch>> {
    handlers::discover_jobs_handler(request, services).await
}

#[get("/jobs/discover?<query..>")]
pub async fn get_jobs(query: UserQuery, services: &State<AppServices>) -> ApiResult<Vec<JobMatch>> {
    handlers::get_jobs_handler(query, services).await
}

#[patch("/jobs/status", data = "<request>")]
pub async fn update_job_status(
    request: Json<StandardRequest<UpdateStatusRequest>>,
    services: &State<AppServices>,
) -> ApiResult<StatusUpdateData> {
    handlers::update_job_status_handler(request, services).await
}

#[get("/analytics?<query..>")]
pub async fn get_analytics(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<UserAnalytics> {
    handlers::get_analytics_handler(query, services).await
}

#[get("/dashboard/stats?<query..>")]
pub async fn get_dashboard_stats(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<DashboardStats> {
    handlers::get_dashboard_stats_handler(query, services).await
}

#[post("/resume", data = "<request>")]
pub async fn upload_resume(
    request: Json<StandardRequest<UploadResumeRequest>>,
    services: &State<AppServices>,
) -> ApiResult<ResumeRecord> {
    handlers::upload_resume_handler(request, services).await
}

#[get("/resume?<query..>")]
pub async fn get_resume(query: UserQuery, services: &State<AppServices>) -> ApiResult<ResumeRecord> {
    handlers::get_resume_handler(query, services).await
}

#[post("/interview-prep", data = "<request>")]
pub async fn generate_interview_prep(
    request: Json<StandardRequest<InterviewPrepRequest>>,
    services: &State<AppServices>,
) -> ApiResult<InterviewPrep> {
    handlers::generate_interview_prep_handler(request, services).await
}

#[get("/interview-prep?<query..>")]
pub async fn list_interview_preps(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<Vec<InterviewPrep>> {
    handlers::list_interview_preps_handler(query, services).await
}

#[get("/interview/latest?<query..>")]
pub async fn latest_interview_prep(
    query: UserQuery,
    services: &State<AppServices>,
) -> ApiResult<Option<InterviewPrep>> {
    handlers::latest_interview_prep_handler(query, services).await
}

#[get("/interview/questions?<query..>")]
pub async fn interview_questions(
    query: QuestionsQuery,
    services: &State<AppServices>,
) -> ApiResult<Vec<MockQuestion>> {
    handlers::interview_questions_handler(query, services).await
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found_catcher() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "INVALID_BODY".to_string(),
        vec![
            "Use camelCase field names such as userId".to_string(),
            "Status must be one of new, viewed, applied, rejected".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the API without launching it
pub fn build_rocket(rocket: Rocket<Build>, services: AppServices) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(services)
        .register(
            "/api",
            catchers![bad_request, not_found_catcher, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                discover_jobs,
                get_jobs,
                update_job_status,
                get_analytics,
                get_dashboard_stats,
                upload_resume,
                get_resume,
                generate_interview_prep,
                list_interview_preps,
                latest_interview_prep,
                interview_questions,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(services: AppServices, port: u16) -> Result<()> {
    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port));

    app_log!(info, "Starting careerai API server on port {}", port);

    let _rocket = build_rocket(rocket::custom(figment), services)
        .launch()
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::FixedProficiency;
    use crate::core::config_manager::DiscoveryConfig;
    use crate::core::{JobStore, MemoryStore};
    use crate::job_discovery::GeneratedJobSource;
    use crate::test_support::CannedReasoning;
    use crate::types::job::fixtures::{prep, resume};
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use std::sync::Arc;

    async fn client_with(store: Arc<MemoryStore>, reply: &str) -> Client {
        let services = AppServices::new(
            store,
            Arc::new(CannedReasoning::new(reply)),
            Arc::new(GeneratedJobSource),
            DiscoveryConfig::default(),
            Arc::new(FixedProficiency {
                level: 80.0,
                score: 90,
            }),
            None,
        );
        Client::tracked(build_rocket(rocket::build(), services))
            .await
            .unwrap()
    }

    fn json_body(raw: Option<String>) -> rocket::serde::json::Value {
        rocket::serde::json::from_str(&raw.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let client = client_with(Arc::new(MemoryStore::new()), "[]").await;
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("*")
        );
        let body = json_body(response.into_string().await);
        assert_eq!(body["type"], "text");
        assert_eq!(body["message"], "OK");
    }

    #[tokio::test]
    async fn test_discover_without_resume_is_bad_request() {
        let client = client_with(Arc::new(MemoryStore::new()), "[]").await;
        let response = client
            .post("/api/jobs/discover")
            .header(ContentType::JSON)
            .body(r#"{"userId": "u1"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body = json_body(response.into_string().await);
        assert_eq!(body["type"], "error");
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "RESUME_REQUIRED");
    }

    #[tokio::test]
    async fn test_discover_and_update_status() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_resume(&resume("u1", &["React", "Node.js"]))
            .await
            .unwrap();
        let client = client_with(store.clone(), "```json\n[]\n```").await;

        let response = client
            .post("/api/jobs/discover")
            .header(ContentType::JSON)
            .body(r#"{"userId": "u1", "location": "Remote", "limit": 3}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_body(response.into_string().await);
        assert_eq!(body["type"], "data");
        let jobs = body["data"].as_array().unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0]["matchScore"], 50);
        assert_eq!(jobs[0]["status"], "new");

        let match_id = jobs[0]["id"].as_str().unwrap().to_string();
        let response = client
            .patch("/api/jobs/status")
            .header(ContentType::JSON)
            .body(format!(
                r#"{{"userId": "u1", "id": "{}", "status": "applied"}}"#,
                match_id
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_body(response.into_string().await);
        assert_eq!(body["data"]["updated"], true);

        let response = client.get("/api/dashboard/stats?userId=u1").dispatch().await;
        let body = json_body(response.into_string().await);
        assert_eq!(body["data"]["jobsMatched"], 3);
        assert_eq!(body["data"]["applications"], 1);
        assert_eq!(body["data"]["skillScore"], 90);
    }

    #[tokio::test]
    async fn test_malformed_matcher_reply_is_bad_gateway() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_resume(&resume("u1", &["Rust"])).await.unwrap();
        let client = client_with(store, "I could not score these jobs").await;

        let response = client
            .post("/api/jobs/discover")
            .header(ContentType::JSON)
            .body(r#"{"userId": "u1"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadGateway);
        let body = json_body(response.into_string().await);
        assert_eq!(body["error_code"], "UPSTREAM_MALFORMED");
    }

    #[tokio::test]
    async fn test_get_resume_missing_is_not_found() {
        let client = client_with(Arc::new(MemoryStore::new()), "[]").await;
        let response = client.get("/api/resume?userId=u9").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client.get("/api/analytics").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let body = json_body(response.into_string().await);
        assert_eq!(body["error_code"], "USER_ID_REQUIRED");
    }

    #[tokio::test]
    async fn test_interview_question_feed() {
        let store = Arc::new(MemoryStore::new());
        let client = client_with(store.clone(), "[]").await;

        let response = client.get("/api/interview/latest?userId=u1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_body(response.into_string().await);
        assert!(body["data"].is_null());

        let stored = prep("u1", "Backend Engineer", chrono::Utc::now());
        store.append_interview_prep(&stored).await.unwrap();

        let response = client.get("/api/interview/latest?userId=u1").dispatch().await;
        let body = json_body(response.into_string().await);
        assert_eq!(body["data"]["id"], stored.id.as_str());

        let response = client
            .get(format!(
                "/api/interview/questions?userId=u1&prepId={}&category=technical",
                stored.id
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_body(response.into_string().await);
        let questions = body["data"].as_array().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0]["id"], "tech-0");
        assert_eq!(questions[0]["category"], "technical");

        let response = client
            .get("/api/interview/questions?userId=u1&category=behavioral")
            .dispatch()
            .await;
        let body = json_body(response.into_string().await);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"][0]["category"], "behavioral");

        let response = client.get("/api/interview/questions").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn test_analytics_envelope() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_resume(&resume("u1", &["Rust"])).await.unwrap();
        let client = client_with(store, "[]").await;

        let response = client.get("/api/analytics?userId=u1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = json_body(response.into_string().await);
        assert_eq!(body["data"]["userId"], "u1");
        assert_eq!(body["data"]["weeklyProgress"].as_array().unwrap().len(), 4);
        assert_eq!(body["data"]["activityLog"][0]["action"], "Uploaded resume");
    }
}
