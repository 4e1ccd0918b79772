// src/analytics/aggregate.rs
//! Pure aggregation over one user's stored records

use chrono::{DateTime, Duration, Utc};

use super::insights::generate_insights;
use super::proficiency::{ProficiencySource, PROFICIENCY_CEILING};
use crate::types::{
    ActivityLogEntry, InterviewPrep, JobMatch, ResumeRecord, SkillCoverage, UserAnalytics,
    WeeklyProgress,
};

pub const MAX_SKILL_COVERAGE: usize = 15;
pub const MAX_ACTIVITY_ENTRIES: usize = 20;
pub const RECENT_MATCH_ACTIVITY: usize = 10;
pub const RECENT_PREP_ACTIVITY: usize = 5;
pub const WEEKS: i64 = 4;

/// Everything the aggregator reads for one user
pub struct AnalyticsInputs<'a> {
    pub resume: Option<&'a ResumeRecord>,
    /// All matches, any order
    pub matches: &'a [JobMatch],
    /// Newest first
    pub recent_matches: &'a [JobMatch],
    /// Newest first
    pub preps: &'a [InterviewPrep],
}

pub fn build_user_analytics(
    user_id: &str,
    inputs: &AnalyticsInputs<'_>,
    scores: &dyn ProficiencySource,
    now: DateTime<Utc>,
) -> UserAnalytics {
    let total_jobs_matched = inputs.matches.len();
    let total_applications = inputs.matches.iter().filter(|m| m.is_applied()).count();
    let total_interviews = inputs.preps.len();

    let skills = inputs
        .resume
        .map(|r| r.analysis.skills.as_slice())
        .unwrap_or(&[]);
    let mut coverage = skill_coverage(skills, inputs.matches, scores);

    let insights = generate_insights(
        total_jobs_matched,
        total_applications,
        total_interviews,
        &coverage,
    );
    coverage.truncate(MAX_SKILL_COVERAGE);

    UserAnalytics {
        user_id: user_id.to_string(),
        total_jobs_matched,
        total_applications,
        total_interviews,
        skill_coverage: coverage,
        activity_log: activity_feed(inputs.resume, inputs.recent_matches, inputs.preps),
        weekly_progress: weekly_progress(inputs.matches, inputs.preps, now),
        insights,
    }
}

/// Demand for each resume skill across matched jobs, most requested first
pub fn skill_coverage(
    skills: &[String],
    matches: &[JobMatch],
    scores: &dyn ProficiencySource,
) -> Vec<SkillCoverage> {
    let mut coverage: Vec<SkillCoverage> = skills
        .iter()
        .map(|skill| SkillCoverage {
            skill: skill.clone(),
            current: scores.current_level(skill),
            target: PROFICIENCY_CEILING,
            jobs_requiring: matches
                .iter()
                .filter(|m| m.job.mentions_skill(skill))
                .count(),
        })
        .collect();

    coverage.sort_by(|a, b| b.jobs_requiring.cmp(&a.jobs_requiring));
    coverage
}

/// Four 7-day buckets ending at `now`, oldest first.
///
/// Each bucket is `[start, end)`, except the newest which also holds `now`.
pub fn weekly_progress(
    matches: &[JobMatch],
    preps: &[InterviewPrep],
    now: DateTime<Utc>,
) -> Vec<WeeklyProgress> {
    (0..WEEKS)
        .rev()
        .map(|weeks_back| {
            let end = now - Duration::days(weeks_back * 7);
            let start = end - Duration::days(7);
            let in_bucket = |t: DateTime<Utc>| {
                t >= start && (t < end || (weeks_back == 0 && t == end))
            };

            let week_jobs: Vec<&JobMatch> =
                matches.iter().filter(|m| in_bucket(m.created_at)).collect();

            WeeklyProgress {
                week: format!("Week {}", WEEKS - weeks_back),
                jobs_viewed: week_jobs.len(),
                applications_submitted: week_jobs.iter().filter(|m| m.is_applied()).count(),
                interviews_scheduled: preps.iter().filter(|p| in_bucket(p.created_at)).count(),
            }
        })
        .collect()
}

/// Merged feed, newest first. Equal timestamps keep source order:
/// resume, then matches, then preps.
pub fn activity_feed(
    resume: Option<&ResumeRecord>,
    recent_matches: &[JobMatch],
    recent_preps: &[InterviewPrep],
) -> Vec<ActivityLogEntry> {
    let mut feed: Vec<ActivityLogEntry> = Vec::new();

    if let Some(resume) = resume {
        feed.push(ActivityLogEntry {
            id: format!("resume-{}", resume.id),
            action: "Uploaded resume".to_string(),
            item: resume.file_name.clone(),
            timestamp: resume.uploaded_at,
        });
    }

    feed.extend(
        recent_matches
            .iter()
            .take(RECENT_MATCH_ACTIVITY)
            .map(|m| ActivityLogEntry {
                id: format!("job-{}", m.id),
                action: if m.is_applied() { "Applied to" } else { "Discovered" }.to_string(),
                item: m.job.title.clone(),
                timestamp: m.created_at,
            }),
    );

    feed.extend(
        recent_preps
            .iter()
            .take(RECENT_PREP_ACTIVITY)
            .map(|p| ActivityLogEntry {
                id: format!("prep-{}", p.id),
                action: "Generated interview prep for".to_string(),
                item: p.role.clone(),
                timestamp: p.created_at,
            }),
    );

    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(MAX_ACTIVITY_ENTRIES);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::proficiency::FixedProficiency;
    use crate::types::job::fixtures::{job_match, posting, prep, resume};
    use crate::types::JobStatus;

    const FIXED: FixedProficiency = FixedProficiency {
        level: 90.0,
        score: 80,
    };

    fn match_at(job_id: &str, created_at: DateTime<Utc>, status: JobStatus) -> JobMatch {
        let mut m = job_match("u1", job_id, 50);
        m.created_at = created_at;
        m.status = status;
        m
    }

    #[test]
    fn test_weekly_bucket_boundaries() {
        let now = Utc::now();
        let matches = vec![
            match_at("now", now, JobStatus::Applied),
            match_at("eight-days", now - Duration::days(8), JobStatus::New),
            match_at("exactly-seven", now - Duration::days(7), JobStatus::New),
            match_at("too-old", now - Duration::days(28) - Duration::seconds(1), JobStatus::New),
            match_at("future", now + Duration::seconds(5), JobStatus::New),
        ];
        let preps = vec![prep("u1", "SRE", now - Duration::days(22))];

        let weeks = weekly_progress(&matches, &preps, now);
        let labels: Vec<&str> = weeks.iter().map(|w| w.week.as_str()).collect();
        assert_eq!(labels, vec!["Week 1", "Week 2", "Week 3", "Week 4"]);

        // now and exactly seven days back share the newest bucket
        assert_eq!(weeks[3].jobs_viewed, 2);
        assert_eq!(weeks[3].applications_submitted, 1);
        assert_eq!(weeks[2].jobs_viewed, 1);
        assert_eq!(weeks[1].jobs_viewed, 0);
        assert_eq!(weeks[0].jobs_viewed, 0);
        assert_eq!(weeks[0].interviews_scheduled, 1);
    }

    #[test]
    fn test_activity_feed_order() {
        let t0 = Utc::now() - Duration::hours(3);
        let t1 = t0 + Duration::hours(1);
        let t2 = t1 + Duration::hours(1);

        let mut record = resume("u1", &["Rust"]);
        record.uploaded_at = t0;
        let matches = vec![match_at("j1", t1, JobStatus::Applied)];
        let preps = vec![prep("u1", "Backend Engineer", t2)];

        let feed = activity_feed(Some(&record), &matches, &preps);
        let stamps: Vec<DateTime<Utc>> = feed.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![t2, t1, t0]);
        assert_eq!(feed[0].action, "Generated interview prep for");
        assert_eq!(feed[0].item, "Backend Engineer");
        assert_eq!(feed[1].action, "Applied to");
        assert_eq!(feed[2].action, "Uploaded resume");
        assert_eq!(feed[2].id, format!("resume-{}", record.id));
    }

    #[test]
    fn test_activity_feed_caps() {
        let now = Utc::now();
        let matches: Vec<JobMatch> = (0..15)
            .map(|i| match_at(&format!("j{}", i), now - Duration::minutes(i), JobStatus::New))
            .collect();
        let preps: Vec<InterviewPrep> = (0..8)
            .map(|i| prep("u1", &format!("Role {}", i), now - Duration::minutes(i)))
            .collect();
        let record = resume("u1", &[]);

        let feed = activity_feed(Some(&record), &matches, &preps);
        assert_eq!(feed.len(), 16);
        assert_eq!(feed.iter().filter(|e| e.action == "Discovered").count(), 10);
        assert_eq!(
            feed.iter()
                .filter(|e| e.action == "Generated interview prep for")
                .count(),
            5
        );
        assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn test_skill_coverage_counts_both_directions() {
        let mut react = job_match("u1", "r", 60);
        react.job = posting("r", None);
        react.job.tags = vec!["React".to_string()];
        react.job.requirements = vec!["React Native".to_string()];

        let mut sql = job_match("u1", "s", 60);
        sql.job.tags = vec!["PostgreSQL".to_string()];
        sql.job.requirements = vec![];

        let skills = vec![
            "Kotlin".to_string(),
            "react".to_string(),
            "SQL".to_string(),
            "postgresql database".to_string(),
        ];
        let coverage = skill_coverage(&skills, &[react, sql], &FIXED);

        let pairs: Vec<(&str, usize)> = coverage
            .iter()
            .map(|c| (c.skill.as_str(), c.jobs_requiring))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("react", 1),
                ("SQL", 1),
                ("postgresql database", 1),
                ("Kotlin", 0)
            ]
        );
        assert!(coverage.iter().all(|c| c.target == 100.0 && c.current == 90.0));
    }

    #[test]
    fn test_build_user_analytics() {
        let now = Utc::now();
        let record = resume("u1", &["Rust", "Go"]);
        let matches = vec![
            match_at("a", now, JobStatus::Applied),
            match_at("b", now, JobStatus::New),
            match_at("c", now, JobStatus::Rejected),
        ];
        let preps = vec![prep("u1", "Backend Engineer", now)];
        let inputs = AnalyticsInputs {
            resume: Some(&record),
            matches: &matches,
            recent_matches: &matches,
            preps: &preps,
        };

        let analytics = build_user_analytics("u1", &inputs, &FIXED, now);
        assert_eq!(analytics.total_jobs_matched, 3);
        assert_eq!(analytics.total_applications, 1);
        assert_eq!(analytics.total_interviews, 1);
        assert_eq!(analytics.skill_coverage[0].skill, "Rust");
        assert_eq!(analytics.skill_coverage[0].jobs_requiring, 3);
        assert_eq!(analytics.weekly_progress[3].jobs_viewed, 3);
        assert_eq!(analytics.activity_log.len(), 5);
        let titles: Vec<&str> = analytics.insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Great Application Activity", "Interview Ready", "Most In-Demand Skill"]
        );
    }

    #[test]
    fn test_skill_coverage_truncated_to_fifteen() {
        let skills: Vec<String> = (0..20).map(|i| format!("Skill{}", i)).collect();
        let mut record = resume("u1", &[]);
        record.analysis.skills = skills;
        let inputs = AnalyticsInputs {
            resume: Some(&record),
            matches: &[],
            recent_matches: &[],
            preps: &[],
        };

        let analytics = build_user_analytics("u1", &inputs, &FIXED, Utc::now());
        assert_eq!(analytics.skill_coverage.len(), MAX_SKILL_COVERAGE);
        assert_eq!(analytics.insights.len(), 1);
        assert_eq!(analytics.insights[0].title, "Most In-Demand Skill");
    }
}
