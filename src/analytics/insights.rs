// src/analytics/insights.rs
//! Rule-based dashboard insights

use crate::types::{Insight, InsightKind, SkillCoverage};

const LOW_APPLICATION_RATE: f64 = 0.10;
const HIGH_APPLICATION_RATE: f64 = 0.30;
const SKILL_GAP_MARGIN: f64 = 20.0;
const MAX_GAP_SKILLS: usize = 3;

/// Evaluate the insight rules in order. `coverage` must already be sorted
/// by demand, most requested skill first.
pub fn generate_insights(
    total_jobs: usize,
    total_applications: usize,
    total_interviews: usize,
    coverage: &[SkillCoverage],
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if total_jobs > 0 {
        let rate = total_applications as f64 / total_jobs as f64;
        let percent = (rate * 100.0).round() as u32;
        if rate < LOW_APPLICATION_RATE {
            insights.push(Insight::new(
                InsightKind::Warning,
                "Low Application Rate",
                format!(
                    "You've only applied to {}% of matched jobs. Consider applying to more opportunities to increase your chances.",
                    percent
                ),
            ));
        } else if rate > HIGH_APPLICATION_RATE {
            insights.push(Insight::new(
                InsightKind::Success,
                "Great Application Activity",
                format!(
                    "You're actively applying to {}% of matched jobs. Keep up the momentum!",
                    percent
                ),
            ));
        }
    }

    if total_interviews == 0 && total_applications > 0 {
        insights.push(Insight::new(
            InsightKind::Info,
            "Prepare for Interviews",
            "Start preparing for interviews using the AI-powered interview prep tool to boost your confidence."
                .to_string(),
        ));
    } else if total_interviews > 0 {
        let noun = if total_interviews == 1 { "interview" } else { "interviews" };
        insights.push(Insight::new(
            InsightKind::Success,
            "Interview Ready",
            format!(
                "You've prepared for {} {}. You're building strong preparation habits!",
                total_interviews, noun
            ),
        ));
    }

    if let Some(top) = coverage.first() {
        insights.push(Insight::new(
            InsightKind::Info,
            "Most In-Demand Skill",
            format!(
                "{} is required by {} of your matched jobs. Focus on strengthening this skill.",
                top.skill, top.jobs_requiring
            ),
        ));
    }

    let gaps: Vec<&str> = coverage
        .iter()
        .filter(|s| s.current < s.target - SKILL_GAP_MARGIN)
        .take(MAX_GAP_SKILLS)
        .map(|s| s.skill.as_str())
        .collect();
    if !gaps.is_empty() {
        insights.push(Insight::new(
            InsightKind::Warning,
            "Skill Development Opportunity",
            format!(
                "Consider improving: {}. These skills have room for growth.",
                gaps.join(", ")
            ),
        ));
    }

    insights
}
