// src/core/memory_store.rs
//! Process-local store keyed by user id. Nothing survives a restart.

use anyhow::Result;
use rocket::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::store::{sort_by_score, JobStore};
use crate::types::{InterviewPrep, JobMatch, JobStatus, ResumeRecord};

#[derive(Default)]
pub struct MemoryStore {
    resumes: RwLock<HashMap<String, ResumeRecord>>,
    job_matches: RwLock<HashMap<String, Vec<JobMatch>>>,
    interview_preps: RwLock<HashMap<String, Vec<InterviewPrep>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert_resume(&self, resume: &ResumeRecord) -> Result<()> {
        self.resumes
            .write()
            .await
            .insert(resume.user_id.clone(), resume.clone());
        Ok(())
    }

    async fn get_resume(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
        Ok(self.resumes.read().await.get(user_id).cloned())
    }

    async fn append_job_matches(&self, user_id: &str, matches: &[JobMatch]) -> Result<()> {
        self.job_matches
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(matches);
        Ok(())
    }

    async fn list_job_matches(&self, user_id: &str) -> Result<Vec<JobMatch>> {
        let mut matches = self
            .job_matches
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        sort_by_score(&mut matches);
        Ok(matches)
    }

    async fn recent_job_matches(&self, user_id: &str, limit: usize) -> Result<Vec<JobMatch>> {
        let mut matches = self
            .job_matches
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        matches.reverse();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn update_job_status(
        &self,
        user_id: &str,
        match_id: &str,
        status: JobStatus,
    ) -> Result<bool> {
        let mut guard = self.job_matches.write().await;
        let Some(matches) = guard.get_mut(user_id) else {
            return Ok(false);
        };

        match matches.iter_mut().find(|m| m.id == match_id) {
            Some(job_match) => {
                job_match.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_job_matches_with_status(
        &self,
        user_id: &str,
        status: JobStatus,
    ) -> Result<usize> {
        Ok(self
            .job_matches
            .read()
            .await
            .get(user_id)
            .map(|matches| matches.iter().filter(|m| m.status == status).count())
            .unwrap_or(0))
    }

    async fn append_interview_prep(&self, prep: &InterviewPrep) -> Result<()> {
        self.interview_preps
            .write()
            .await
            .entry(prep.user_id.clone())
            .or_default()
            .push(prep.clone());
        Ok(())
    }

    async fn list_interview_preps(&self, user_id: &str) -> Result<Vec<InterviewPrep>> {
        let mut preps = self
            .interview_preps
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        // reverse first so the stable sort keeps later inserts ahead on ties
        preps.reverse();
        preps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(preps)
    }

    async fn get_interview_prep(
        &self,
        user_id: &str,
        prep_id: &str,
    ) -> Result<Option<InterviewPrep>> {
        Ok(self
            .interview_preps
            .read()
            .await
            .get(user_id)
            .and_then(|preps| preps.iter().find(|p| p.id == prep_id).cloned()))
    }

    async fn clear_user_data(&self, user_id: &str) -> Result<()> {
        self.resumes.write().await.remove(user_id);
        self.job_matches.write().await.remove(user_id);
        self.interview_preps.write().await.remove(user_id);
        Ok(())
    }
}
