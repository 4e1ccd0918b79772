// src/core/store.rs
//! Persistence sink for resumes, job matches and interview preps

use anyhow::Result;
use rocket::async_trait;

use crate::types::{InterviewPrep, JobMatch, JobStatus, ResumeRecord};

/// Storage contract shared by the SQLite store and the in-memory store.
///
/// Job matches are append-only: repeated discoveries add new rows and never
/// replace earlier ones. Only `update_job_status` mutates a stored match.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or replace the single resume kept per user
    async fn upsert_resume(&self, resume: &ResumeRecord) -> Result<()>;

    async fn get_resume(&self, user_id: &str) -> Result<Option<ResumeRecord>>;

    async fn append_job_matches(&self, user_id: &str, matches: &[JobMatch]) -> Result<()>;

    /// All matches for the user, best score first, insertion order on ties
    async fn list_job_matches(&self, user_id: &str) -> Result<Vec<JobMatch>>;

    /// Up to `limit` matches, newest first; on equal timestamps the later insert comes first
    async fn recent_job_matches(&self, user_id: &str, limit: usize) -> Result<Vec<JobMatch>>;

    /// Returns false when no match with that id belongs to the user
    async fn update_job_status(
        &self,
        user_id: &str,
        match_id: &str,
        status: JobStatus,
    ) -> Result<bool>;

    async fn count_job_matches_with_status(&self, user_id: &str, status: JobStatus)
        -> Result<usize>;

    async fn append_interview_prep(&self, prep: &InterviewPrep) -> Result<()>;

    /// Newest first; on equal timestamps the later insert comes first
    async fn list_interview_preps(&self, user_id: &str) -> Result<Vec<InterviewPrep>>;

    async fn get_interview_prep(&self, user_id: &str, prep_id: &str)
        -> Result<Option<InterviewPrep>>;

    async fn clear_user_data(&self, user_id: &str) -> Result<()>;
}

/// Best score first; `sort_by` is stable so equal scores keep store order
pub fn sort_by_score(matches: &mut [JobMatch]) {
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
}
