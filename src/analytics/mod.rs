// src/analytics/mod.rs
//! Per-user analytics: one concurrent read of the store, then pure aggregation

pub mod aggregate;
pub mod insights;
pub mod proficiency;

pub use proficiency::{FixedProficiency, ProficiencySource, RandomProficiency};

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::app_log;
use crate::core::error::require_user_id;
use crate::core::store::JobStore;
use crate::types::{DashboardStats, JobStatus, UserAnalytics};
use aggregate::{build_user_analytics, AnalyticsInputs, RECENT_MATCH_ACTIVITY};

pub struct AnalyticsService {
    store: Arc<dyn JobStore>,
    proficiency: Arc<dyn ProficiencySource>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn JobStore>, proficiency: Arc<dyn ProficiencySource>) -> Self {
        Self { store, proficiency }
    }

    pub async fn user_analytics(&self, user_id: &str) -> Result<UserAnalytics> {
        let user_id = require_user_id(user_id)?;

        let (resume, matches, recent_matches, preps) = tokio::try_join!(
            self.store.get_resume(user_id),
            self.store.list_job_matches(user_id),
            self.store.recent_job_matches(user_id, RECENT_MATCH_ACTIVITY),
            self.store.list_interview_preps(user_id),
        )
        .context("Failed to load analytics data")?;

        app_log!(
            debug,
            "Aggregating analytics for {}: {} matches, {} preps",
            user_id,
            matches.len(),
            preps.len()
        );

        let inputs = AnalyticsInputs {
            resume: resume.as_ref(),
            matches: &matches,
            recent_matches: &recent_matches,
            preps: &preps,
        };
        Ok(build_user_analytics(
            user_id,
            &inputs,
            self.proficiency.as_ref(),
            Utc::now(),
        ))
    }

    pub async fn dashboard_stats(&self, user_id: &str) -> Result<DashboardStats> {
        let user_id = require_user_id(user_id)?;

        let (resume, applications, matches, preps) = tokio::try_join!(
            self.store.get_resume(user_id),
            self.store
                .count_job_matches_with_status(user_id, JobStatus::Applied),
            self.store.list_job_matches(user_id),
            self.store.list_interview_preps(user_id),
        )
        .context("Failed to load dashboard stats")?;

        let has_skills = resume
            .as_ref()
            .is_some_and(|r| !r.analysis.skills.is_empty());

        Ok(DashboardStats {
            jobs_matched: matches.len(),
            applications,
            interviews: preps.len(),
            skill_score: if has_skills {
                self.proficiency.skill_score()
            } else {
                0
            },
        })
    }
}
