// src/job_discovery/assembler.rs
//! Merge matcher output onto postings and rank the result

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::store::sort_by_score;
use crate::types::{
    JobMatch, JobPosting, JobStatus, MatchResult, DEFAULT_MATCH_REASON, DEFAULT_MATCH_SCORE,
};

/// One `JobMatch` per posting, best score first.
///
/// Postings the matcher skipped get the neutral default score. All matches
/// of one batch share `created_at`.
pub fn assemble_matches(
    user_id: &str,
    jobs: Vec<JobPosting>,
    results: &[MatchResult],
    created_at: DateTime<Utc>,
) -> Vec<JobMatch> {
    let mut by_job: HashMap<&str, &MatchResult> = HashMap::with_capacity(results.len());
    for result in results {
        by_job.entry(result.job_id.as_str()).or_insert(result);
    }

    let mut matches: Vec<JobMatch> = jobs
        .into_iter()
        .map(|job| {
            let (match_score, match_reasons) = match by_job.get(job.id.as_str()) {
                Some(result) => (result.match_score, result.match_reasons.clone()),
                None => (
                    DEFAULT_MATCH_SCORE,
                    vec![DEFAULT_MATCH_REASON.to_string()],
                ),
            };

            JobMatch {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                job_id: job.id.clone(),
                job,
                match_score,
                match_reasons,
                created_at,
                status: JobStatus::New,
            }
        })
        .collect();

    sort_by_score(&mut matches);
    matches
}
