// src/job_discovery/matcher.rs
//! Profile-to-job scoring contract and its Gemini-backed implementation

use anyhow::{Context, Result};
use rocket::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::app_log;
use crate::core::error::PipelineError;
use crate::core::service_client::ReasoningClient;
use crate::types::{JobPosting, MatchResult, ProfileSnapshot, MAX_MATCH_SCORE, MIN_MATCH_SCORE};
use crate::utils::parse_model_json;

/// Scores postings against a profile. At most one result per input job.
///
/// Any failure, including a reply that does not fit the result shape, fails
/// the whole discovery request.
#[async_trait]
pub trait ProfileMatcher: Send + Sync {
    async fn match_jobs(
        &self,
        profile: &ProfileSnapshot,
        jobs: &[JobPosting],
    ) -> Result<Vec<MatchResult>>;
}

// ===== Boundary DTOs =====

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawJobId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScore {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchResult {
    job_id: RawJobId,
    match_score: RawScore,
    match_reasons: Vec<String>,
}

#[derive(Serialize)]
struct PromptJob<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    #[serde(rename = "type")]
    job_type: &'a str,
    requirements: &'a [String],
    description: &'a str,
}

impl RawJobId {
    fn into_string(self) -> String {
        match self {
            RawJobId::Text(s) => s,
            RawJobId::Number(n) => n.to_string(),
        }
    }
}

impl RawScore {
    fn to_score(&self) -> Result<u8, PipelineError> {
        let value = match *self {
            RawScore::Int(n) => n as f64,
            RawScore::Float(f) => f.round(),
        };
        if !value.is_finite()
            || value < f64::from(MIN_MATCH_SCORE)
            || value > f64::from(MAX_MATCH_SCORE)
        {
            return Err(PipelineError::UpstreamMalformed(format!(
                "match score out of range: {:?}",
                self
            )));
        }
        Ok(value as u8)
    }
}

/// Validate raw matcher results against the jobs that were sent
fn validate_results(raw: Vec<RawMatchResult>, jobs: &[JobPosting]) -> Result<Vec<MatchResult>> {
    let known: HashSet<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(raw.len());

    for item in raw {
        let match_score = item.match_score.to_score()?;
        let job_id = item.job_id.into_string();

        if !known.contains(job_id.as_str()) {
            app_log!(warn, "Matcher returned unknown job id {}, ignoring", job_id);
            continue;
        }
        if !seen.insert(job_id.clone()) {
            app_log!(warn, "Matcher returned job id {} twice, keeping the first", job_id);
            continue;
        }

        results.push(MatchResult {
            job_id,
            match_score,
            match_reasons: item.match_reasons,
        });
    }

    Ok(results)
}

// ===== Gemini matcher =====

pub struct GeminiMatcher {
    client: Arc<dyn ReasoningClient>,
}

impl GeminiMatcher {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }

    fn build_prompt(profile: &ProfileSnapshot, jobs: &[JobPosting]) -> Result<String> {
        let listing: Vec<PromptJob<'_>> = jobs
            .iter()
            .map(|job| PromptJob {
                id: &job.id,
                title: &job.title,
                company: &job.company,
                location: &job.location,
                job_type: &job.job_type,
                requirements: &job.requirements,
                description: job.trimmed_description(),
            })
            .collect();
        let listing =
            serde_json::to_string_pretty(&listing).context("Failed to encode job listing")?;

        Ok(format!(
            r#"Given a candidate profile:
- Skills: {skills}
- Years of Experience: {years}
- Proficiency Level: {level}

And these job listings:
{listing}

For each job, calculate a match score (0-100) and provide match reasons.
Return a JSON array with: [{{ "jobId": string, "matchScore": number, "matchReasons": [string] }}]

Consider:
- Skill overlap
- Experience level match
- Role seniority alignment
- Technology stack compatibility

Return ONLY a valid JSON array, no markdown or additional text."#,
            skills = profile.skills.join(", "),
            years = profile.years_of_experience,
            level = profile.proficiency_level,
            listing = listing,
        ))
    }
}

#[async_trait]
impl ProfileMatcher for GeminiMatcher {
    async fn match_jobs(
        &self,
        profile: &ProfileSnapshot,
        jobs: &[JobPosting],
    ) -> Result<Vec<MatchResult>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = Self::build_prompt(profile, jobs)?;
        app_log!(info, "Matching {} jobs with AI", jobs.len());

        let reply = self
            .client
            .generate(&prompt)
            .await
            .context("Failed to match jobs")?;
        let raw: Vec<RawMatchResult> = parse_model_json(&reply, "job match results")?;

        let results = validate_results(raw, jobs)?;
        app_log!(info, "AI matched {} of {} jobs", results.len(), jobs.len());
        Ok(results)
    }
}
