// src/types/job.rs
//! Job postings, matcher results and the persisted job match

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_MATCH_SCORE: u8 = 0;
pub const MAX_MATCH_SCORE: u8 = 100;
pub const DEFAULT_MATCH_SCORE: u8 = 50;
pub const DEFAULT_MATCH_REASON: &str = "General match based on profile";

// ===== Job Posting =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: Option<String>,
    pub requirements: Vec<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: String,
    pub posted: DateTime<Utc>,
    pub url: String,
    pub source: String,
    pub tags: Vec<String>,
}

impl JobPosting {
    /// Description text with surrounding whitespace removed, empty when absent
    pub fn trimmed_description(&self) -> &str {
        self.description.as_deref().map(str::trim).unwrap_or("")
    }

    /// True when any tag or requirement overlaps the skill, ignoring case
    pub fn mentions_skill(&self, skill: &str) -> bool {
        let skill = skill.to_lowercase();
        if skill.is_empty() {
            return false;
        }

        self.tags
            .iter()
            .chain(self.requirements.iter())
            .any(|keyword| {
                let keyword = keyword.to_lowercase();
                !keyword.is_empty() && (keyword.contains(&skill) || skill.contains(&keyword))
            })
    }
}

// ===== Matcher Output =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub job_id: String,
    pub match_score: u8,
    pub match_reasons: Vec<String>,
}

// ===== Job Match =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    New,
    Viewed,
    Applied,
    Rejected,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Viewed => "viewed",
            JobStatus::Applied => "applied",
            JobStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(JobStatus::New),
            "viewed" => Ok(JobStatus::Viewed),
            "applied" => Ok(JobStatus::Applied),
            "rejected" => Ok(JobStatus::Rejected),
            other => anyhow::bail!(
                "Unknown job status: {}. Use new, viewed, applied or rejected",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub id: String,
    pub user_id: String,
    pub job_id: String,
    pub job: JobPosting,
    pub match_score: u8,
    pub match_reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl JobMatch {
    pub fn is_applied(&self) -> bool {
        self.status == JobStatus::Applied
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::posting;
    use super::*;

    #[test]
    fn test_job_status_parse() {
        assert_eq!("applied".parse::<JobStatus>().unwrap(), JobStatus::Applied);
        assert_eq!(" Viewed ".parse::<JobStatus>().unwrap(), JobStatus::Viewed);
        assert!("archived".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }

    #[test]
    fn test_mentions_skill_both_directions() {
        let job = posting("1", None);
        assert!(job.mentions_skill("rust"));
        assert!(job.mentions_skill("Postgres"));
        // tag inside skill
        assert!(job.mentions_skill("Rust programming"));
        assert!(!job.mentions_skill("Kotlin"));
        assert!(!job.mentions_skill(""));
    }

    #[test]
    fn test_posting_serializes_type_field() {
        let job = posting("1", Some("text"));
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], "Full-time");
        assert!(value.get("jobType").is_none());
    }
}
