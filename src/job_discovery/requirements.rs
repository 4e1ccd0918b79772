// src/job_discovery/requirements.rs
//! Keyword extraction and relative-date parsing for search results

use chrono::{DateTime, Duration, Utc};

pub const MAX_REQUIREMENTS: usize = 10;

const TECH_VOCABULARY: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "Ruby", "Go", "Rust", "PHP",
    "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask", "Spring", "Rails",
    "HTML", "CSS", "Tailwind", "Bootstrap", "SASS", "LESS",
    "MongoDB", "PostgreSQL", "MySQL", "Redis", "Elasticsearch",
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "CI/CD",
    "Git", "GitHub", "GitLab", "Jira", "Agile", "Scrum",
    "REST", "GraphQL", "API", "Microservices",
    "Machine Learning", "AI", "Data Science", "TensorFlow", "PyTorch",
];

/// Vocabulary terms and user skills that appear in the description.
///
/// Matching is a plain case-insensitive substring test, so short terms like
/// "Go" or "AI" also hit inside longer words. Vocabulary order comes first,
/// then the user's skills; duplicates are dropped and the list is capped.
pub fn extract_requirements(description: &str, user_skills: &[String]) -> Vec<String> {
    let haystack = description.to_lowercase();
    let mut found: Vec<String> = Vec::new();

    let candidates = TECH_VOCABULARY
        .iter()
        .copied()
        .chain(user_skills.iter().map(String::as_str));

    for term in candidates {
        let needle = term.trim();
        if needle.is_empty() || !haystack.contains(&needle.to_lowercase()) {
            continue;
        }
        if !found.iter().any(|f| f == needle) {
            found.push(needle.to_string());
        }
    }

    found.truncate(MAX_REQUIREMENTS);
    found
}

/// Turn "3 days ago" style text into a timestamp relative to `now`.
/// A missing count means one unit; unknown units and out-of-range
/// counts yield `now`.
pub fn parse_posted_date(posted: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let lower = posted.trim().to_lowercase();
    let count: i64 = lower
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(1);

    let offset = if lower.contains("hour") {
        Duration::try_hours(count)
    } else if lower.contains("day") {
        Duration::try_days(count)
    } else if lower.contains("week") {
        Duration::try_weeks(count)
    } else if lower.contains("month") {
        count.checked_mul(30).and_then(Duration::try_days)
    } else {
        None
    };

    offset
        .and_then(|offset| now.checked_sub_signed(offset))
        .unwrap_or(now)
}
