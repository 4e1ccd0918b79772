// src/job_discovery/filter.rs
use crate::app_log;
use crate::types::JobPosting;

pub const MIN_DESCRIPTION_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum FilteredJobs {
    Valid(Vec<JobPosting>),
    /// Every fetched posting lacked a usable description
    NoneSurvived { fetched: usize },
}

/// Keep postings whose trimmed description has at least `min_len` characters.
/// `min_len` can raise the bar but never lowers it below `MIN_DESCRIPTION_LEN`.
pub fn filter_valid_descriptions(jobs: Vec<JobPosting>, min_len: usize) -> FilteredJobs {
    let min_len = min_len.max(MIN_DESCRIPTION_LEN);
    let fetched = jobs.len();
    let valid: Vec<JobPosting> = jobs
        .into_iter()
        .filter(|job| {
            let keep = job.trimmed_description().chars().count() >= min_len;
            if !keep {
                app_log!(
                    info,
                    "Skipping job without usable description: {} at {}",
                    job.title,
                    job.company
                );
            }
            keep
        })
        .collect();

    app_log!(info, "{} of {} jobs have valid descriptions", valid.len(), fetched);

    if valid.is_empty() {
        FilteredJobs::NoneSurvived { fetched }
    } else {
        FilteredJobs::Valid(valid)
    }
}
