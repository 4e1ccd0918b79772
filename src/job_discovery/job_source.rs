// src/job_discovery/job_source.rs
//! Job search adapter: SERP API (Google Jobs engine) with a local fallback

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rocket::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::local_generator::LocalJobGenerator;
use super::requirements::{extract_requirements, parse_posted_date};
use crate::app_log;
use crate::core::config_manager::ServiceConfig;
use crate::types::JobPosting;

pub const SERP_SOURCE: &str = "Google Jobs (SERP API)";
const PLACEHOLDER_KEY: &str = "your-serp-api-key-here";
const SEARCH_SKILL_COUNT: usize = 3;
const TAG_COUNT: usize = 5;

/// Candidate postings for a skill set. Never fails: providers degrade instead.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, skills: &[String], location: &str, limit: usize) -> Vec<JobPosting>;
}

// ===== Raw provider payload =====

#[derive(Debug, Deserialize)]
struct SerpResponse {
    jobs_results: Option<Vec<SerpJob>>,
}

#[derive(Debug, Default, Deserialize)]
struct SerpJob {
    job_id: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    salary: Option<String>,
    share_link: Option<String>,
    apply_link: Option<String>,
    #[serde(default)]
    detected_extensions: DetectedExtensions,
}

#[derive(Debug, Default, Deserialize)]
struct DetectedExtensions {
    salary: Option<String>,
    schedule_type: Option<String>,
    posted_at: Option<String>,
}

// ===== SERP source =====

pub struct SerpJobSource {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl SerpJobSource {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let api_key = config
            .serp_api_key
            .clone()
            .filter(|k| !k.trim().is_empty() && k != PLACEHOLDER_KEY);

        Ok(Self {
            client,
            api_url: config.serp_api_url.clone(),
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(
        &self,
        api_key: &str,
        skills: &[String],
        location: &str,
        limit: usize,
    ) -> Result<Vec<SerpJob>> {
        let query = search_query(skills, location);
        let search_location = provider_location(location);
        app_log!(info, "Searching jobs with SERP API: \"{}\"", query);

        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("engine", "google_jobs"),
                ("q", query.as_str()),
                ("location", search_location),
                ("api_key", api_key),
                ("num", limit.as_str()),
            ])
            .send()
            .await
            .context("SERP API request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("SERP API returned status {}", status);
        }

        let body: SerpResponse = response
            .json()
            .await
            .context("Failed to parse SERP API response")?;

        body.jobs_results
            .context("SERP API response has no jobs_results")
    }
}

#[async_trait]
impl JobSource for SerpJobSource {
    async fn search(&self, skills: &[String], location: &str, limit: usize) -> Vec<JobPosting> {
        let now = Utc::now();
        let Some(api_key) = self.api_key.as_deref() else {
            app_log!(warn, "SERP_API_KEY not configured, using generated job listings");
            return LocalJobGenerator::generate(skills, location, limit, now);
        };

        match self.fetch(api_key, skills, location, limit).await {
            Ok(raw) => {
                let batch = now.timestamp_millis();
                let jobs: Vec<JobPosting> = raw
                    .into_iter()
                    .enumerate()
                    .map(|(i, job)| map_serp_job(job, i, batch, skills, location, now))
                    .collect();
                app_log!(info, "SERP API returned {} jobs", jobs.len());
                jobs
            }
            Err(e) => {
                app_log!(warn, "Job search unavailable ({:#}), using generated job listings", e);
                LocalJobGenerator::generate(skills, location, limit, now)
            }
        }
    }
}

/// Always serves generated postings. Used for offline runs and tests.
pub struct GeneratedJobSource;

#[async_trait]
impl JobSource for GeneratedJobSource {
    async fn search(&self, skills: &[String], location: &str, limit: usize) -> Vec<JobPosting> {
        LocalJobGenerator::generate(skills, location, limit, Utc::now())
    }
}

fn search_query(skills: &[String], location: &str) -> String {
    let top_skills = skills
        .iter()
        .take(SEARCH_SKILL_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} jobs {}", top_skills, location)
}

// Google Jobs has no "Remote" location
fn provider_location(location: &str) -> &str {
    if location == "Remote" {
        "United States"
    } else {
        location
    }
}

fn fallback_search_url(title: &str, company: &str) -> String {
    let query = format!("{} {}", title, company);
    reqwest::Url::parse_with_params("https://www.google.com/search", &[("q", query.as_str())])
        .map(String::from)
        .unwrap_or_else(|_| "https://www.google.com/search".to_string())
}

fn map_serp_job(
    raw: SerpJob,
    index: usize,
    batch: i64,
    skills: &[String],
    location: &str,
    now: DateTime<Utc>,
) -> JobPosting {
    let description = raw.description.map(|d| d.trim().to_string());
    let requirements = extract_requirements(description.as_deref().unwrap_or(""), skills);
    let title = raw.title.unwrap_or_else(|| "Untitled Position".to_string());
    let company = raw
        .company_name
        .unwrap_or_else(|| "Unknown Company".to_string());

    let url = raw
        .share_link
        .or(raw.apply_link)
        .unwrap_or_else(|| fallback_search_url(&title, &company));

    let extensions = raw.detected_extensions;
    JobPosting {
        id: raw
            .job_id
            .unwrap_or_else(|| format!("serp-job-{}-{}", batch, index)),
        location: raw.location.unwrap_or_else(|| location.to_string()),
        description,
        tags: requirements.iter().take(TAG_COUNT).cloned().collect(),
        requirements,
        salary: Some(
            extensions
                .salary
                .or(raw.salary)
                .unwrap_or_else(|| "Not specified".to_string()),
        ),
        job_type: extensions
            .schedule_type
            .unwrap_or_else(|| "Full-time".to_string()),
        posted: extensions
            .posted_at
            .map(|p| parse_posted_date(&p, now))
            .unwrap_or(now),
        url,
        source: SERP_SOURCE.to_string(),
        title,
        company,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_discovery::local_generator::GENERATOR_SOURCE;

    #[test]
    fn test_search_query_uses_top_three_skills() {
        let skills: Vec<String> = ["Rust", "Go", "SQL", "Kafka"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(search_query(&skills, "Pakistan"), "Rust Go SQL jobs Pakistan");
        assert_eq!(provider_location("Remote"), "United States");
        assert_eq!(provider_location("Lahore"), "Lahore");
    }

    #[test]
    fn test_map_serp_job_fallbacks() {
        let now = Utc::now();
        let raw: SerpJob = serde_json::from_value(serde_json::json!({
            "title": "Platform Engineer",
            "company_name": "Acme",
            "description": "  Run Kubernetes clusters on AWS and write tooling in Rust.  ",
            "detected_extensions": { "posted_at": "3 days ago" }
        }))
        .unwrap();

        let skills = vec!["Terraform".to_string()];
        let job = map_serp_job(raw, 2, 99, &skills, "Remote", now);

        assert_eq!(job.id, "serp-job-99-2");
        assert_eq!(job.location, "Remote");
        assert_eq!(job.salary.as_deref(), Some("Not specified"));
        assert_eq!(job.job_type, "Full-time");
        assert_eq!(job.posted, now - chrono::Duration::days(3));
        assert_eq!(job.source, SERP_SOURCE);
        assert!(job.url.starts_with("https://www.google.com/search?q=Platform"));
        assert_eq!(
            job.description.as_deref(),
            Some("Run Kubernetes clusters on AWS and write tooling in Rust.")
        );
        assert!(job.requirements.contains(&"Kubernetes".to_string()));
        assert!(job.tags.len() <= TAG_COUNT);
    }

    #[test]
    fn test_map_serp_job_prefers_extensions() {
        let raw: SerpJob = serde_json::from_value(serde_json::json!({
            "job_id": "abc",
            "salary": "$1",
            "share_link": "https://share",
            "apply_link": "https://apply",
            "detected_extensions": { "salary": "$2", "schedule_type": "Contractor" }
        }))
        .unwrap();

        let job = map_serp_job(raw, 0, 0, &[], "Lahore", Utc::now());
        assert_eq!(job.id, "abc");
        assert_eq!(job.salary.as_deref(), Some("$2"));
        assert_eq!(job.job_type, "Contractor");
        assert_eq!(job.url, "https://share");
        assert!(job.description.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_source_uses_generator() {
        let config = ServiceConfig {
            serp_api_key: Some(PLACEHOLDER_KEY.to_string()),
            ..ServiceConfig::default()
        };
        let source = SerpJobSource::new(&config).unwrap();
        assert!(!source.is_configured());

        let jobs = source.search(&["React".to_string()], "Remote", 5).await;
        assert!(!jobs.is_empty());
        assert!(jobs.iter().all(|j| j.source == GENERATOR_SOURCE));
    }

    #[tokio::test]
    async fn test_unreachable_provider_uses_generator() {
        let config = ServiceConfig {
            serp_api_key: Some("real-looking-key".to_string()),
            serp_api_url: "http://127.0.0.1:9/search.json".to_string(),
            search_timeout_seconds: 2,
            ..ServiceConfig::default()
        };
        let source = SerpJobSource::new(&config).unwrap();

        let jobs = source.search(&["Python".to_string()], "Remote", 4).await;
        assert!(!jobs.is_empty());
        assert!(jobs.iter().all(|j| j.source == GENERATOR_SOURCE));
    }
}
