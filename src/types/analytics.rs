// src/types/analytics.rs
//! Derived dashboard views. None of these are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCoverage {
    pub skill: String,
    pub current: f64,
    pub target: f64,
    pub jobs_requiring: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub action: String,
    pub item: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub week: String,
    pub jobs_viewed: usize,
    pub applications_submitted: usize,
    pub interviews_scheduled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

impl Insight {
    pub fn new(kind: InsightKind, title: &str, message: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub user_id: String,
    pub total_jobs_matched: usize,
    pub total_applications: usize,
    pub total_interviews: usize,
    pub skill_coverage: Vec<SkillCoverage>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub weekly_progress: Vec<WeeklyProgress>,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub jobs_matched: usize,
    pub applications: usize,
    pub interviews: usize,
    pub skill_score: u32,
}
