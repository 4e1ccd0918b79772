// src/test_support.rs
//! Stub collaborators shared by unit tests

use anyhow::Result;
use rocket::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::error::PipelineError;
use crate::core::service_client::ReasoningClient;
use crate::job_discovery::job_source::JobSource;
use crate::job_discovery::matcher::ProfileMatcher;
use crate::types::{JobPosting, MatchResult, ProfileSnapshot};

/// Replays a canned reply and records every prompt it was given
pub struct CannedReasoning {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedReasoning {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReasoningClient for CannedReasoning {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Serves a fixed posting list
pub struct StubSource {
    jobs: Vec<JobPosting>,
    pub calls: AtomicUsize,
}

impl StubSource {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self {
            jobs,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobSource for StubSource {
    async fn search(&self, _skills: &[String], _location: &str, limit: usize) -> Vec<JobPosting> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.iter().take(limit).cloned().collect()
    }
}

/// Returns fixed results, or fails like a malformed upstream reply
pub enum StubMatcher {
    Results(Vec<MatchResult>),
    Malformed,
}

impl StubMatcher {
    pub fn scores(pairs: &[(&str, u8)]) -> Self {
        StubMatcher::Results(
            pairs
                .iter()
                .map(|(id, score)| MatchResult {
                    job_id: id.to_string(),
                    match_score: *score,
                    match_reasons: vec![format!("Matched {}", id)],
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ProfileMatcher for StubMatcher {
    async fn match_jobs(
        &self,
        _profile: &ProfileSnapshot,
        _jobs: &[JobPosting],
    ) -> Result<Vec<MatchResult>> {
        match self {
            StubMatcher::Results(results) => Ok(results.clone()),
            StubMatcher::Malformed => {
                Err(PipelineError::UpstreamMalformed("not a JSON array".to_string()).into())
            }
        }
    }
}
