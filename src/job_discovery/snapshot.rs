// src/job_discovery/snapshot.rs
//! Per-user JSON export of a discovery run

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::core::FsOps;
use crate::types::{JobMatch, JobStatus, ProfileSnapshot};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverySnapshot<'a> {
    user_id: &'a str,
    generated_at: DateTime<Utc>,
    resume_file_name: &'a str,
    user_profile: &'a ProfileSnapshot,
    total_jobs: usize,
    jobs: Vec<SnapshotJob<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotJob<'a> {
    id: &'a str,
    job_id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    description: Option<&'a str>,
    requirements: &'a [String],
    salary: Option<&'a str>,
    #[serde(rename = "type")]
    job_type: &'a str,
    posted: DateTime<Utc>,
    url: &'a str,
    source: &'a str,
    tags: &'a [String],
    match_score: u8,
    match_reasons: &'a [String],
    status: JobStatus,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a JobMatch> for SnapshotJob<'a> {
    fn from(m: &'a JobMatch) -> Self {
        Self {
            id: &m.id,
            job_id: &m.job_id,
            title: &m.job.title,
            company: &m.job.company,
            location: &m.job.location,
            description: m.job.description.as_deref(),
            requirements: &m.job.requirements,
            salary: m.job.salary.as_deref(),
            job_type: &m.job.job_type,
            posted: m.job.posted,
            url: &m.job.url,
            source: &m.job.source,
            tags: &m.job.tags,
            match_score: m.match_score,
            match_reasons: &m.match_reasons,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write `{root}/{user}/jobs-{millis}.json` and return its path
    pub async fn write(
        &self,
        user_id: &str,
        resume_file_name: &str,
        profile: &ProfileSnapshot,
        matches: &[JobMatch],
    ) -> Result<PathBuf> {
        let generated_at = Utc::now();
        let snapshot = DiscoverySnapshot {
            user_id,
            generated_at,
            resume_file_name,
            user_profile: profile,
            total_jobs: matches.len(),
            jobs: matches.iter().map(SnapshotJob::from).collect(),
        };

        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to encode jobs snapshot")?;
        let path = self
            .root
            .join(FsOps::safe_segment(user_id))
            .join(format!("jobs-{}.json", generated_at.timestamp_millis()));

        FsOps::write_file_safe(&path, &content).await?;
        Ok(path)
    }
}
