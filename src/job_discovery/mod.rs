// src/job_discovery/mod.rs
//! Job discovery pipeline: search, filter, match, assemble, persist

pub mod assembler;
pub mod filter;
pub mod job_source;
pub mod local_generator;
pub mod matcher;
pub mod requirements;
pub mod snapshot;

pub use job_source::{GeneratedJobSource, JobSource, SerpJobSource};
pub use matcher::{GeminiMatcher, ProfileMatcher};
pub use snapshot::SnapshotWriter;

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::app_log;
use crate::core::config_manager::DiscoveryConfig;
use crate::core::error::{require_user_id, PipelineError};
use crate::core::store::JobStore;
use crate::types::{JobMatch, JobStatus, ProfileSnapshot, ResumeAnalysis};
use assembler::assemble_matches;
use filter::{filter_valid_descriptions, FilteredJobs};

pub const MAX_DISCOVERY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryOutcome {
    /// Ranked matches, already persisted
    Matched(Vec<JobMatch>),
    /// The search returned postings but none had a usable description
    NoValidJobs { fetched: usize },
}

impl DiscoveryOutcome {
    pub fn message(&self) -> String {
        match self {
            DiscoveryOutcome::Matched(matches) => {
                format!("Discovered {} matching jobs", matches.len())
            }
            DiscoveryOutcome::NoValidJobs { fetched } => format!(
                "No jobs with valid descriptions found ({} fetched). Try a different location or update your skills.",
                fetched
            ),
        }
    }

    pub fn into_matches(self) -> Vec<JobMatch> {
        match self {
            DiscoveryOutcome::Matched(matches) => matches,
            DiscoveryOutcome::NoValidJobs { .. } => Vec::new(),
        }
    }
}

pub struct DiscoveryService {
    store: Arc<dyn JobStore>,
    source: Arc<dyn JobSource>,
    matcher: Arc<dyn ProfileMatcher>,
    snapshots: Option<SnapshotWriter>,
    settings: DiscoveryConfig,
}

impl DiscoveryService {
    pub fn new(
        store: Arc<dyn JobStore>,
        source: Arc<dyn JobSource>,
        matcher: Arc<dyn ProfileMatcher>,
        settings: DiscoveryConfig,
    ) -> Self {
        Self {
            store,
            source,
            matcher,
            snapshots: None,
            settings,
        }
    }

    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    /// Run discovery for a user with a stored resume
    pub async fn discover(
        &self,
        user_id: &str,
        location: Option<&str>,
        limit: Option<usize>,
    ) -> Result<DiscoveryOutcome> {
        let user_id = require_user_id(user_id)?;
        let location = self.resolve_location(location);
        let limit = self.resolve_limit(limit)?;

        let resume = self
            .store
            .get_resume(user_id)
            .await?
            .ok_or(PipelineError::MissingResume)?;

        self.run_pipeline(user_id, &resume.analysis.profile(), &location, limit)
            .await
    }

    /// Previously stored matches, best score first
    pub async fn current_jobs(&self, user_id: &str) -> Result<Vec<JobMatch>> {
        let user_id = require_user_id(user_id)?;
        self.store.list_job_matches(user_id).await
    }

    pub async fn update_status(
        &self,
        user_id: &str,
        match_id: &str,
        status: JobStatus,
    ) -> Result<bool> {
        let user_id = require_user_id(user_id)?;
        if match_id.trim().is_empty() {
            return Err(PipelineError::InvalidInput("job match id is required".to_string()).into());
        }
        self.store
            .update_job_status(user_id, match_id.trim(), status)
            .await
    }

    /// Discovery after a resume upload. Detached: errors are logged, never returned.
    ///
    /// The handle is only useful to tests; dropping it does not cancel the task.
    pub fn spawn_background_discovery(
        self: &Arc<Self>,
        user_id: String,
        analysis: ResumeAnalysis,
        resume_file_name: String,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            app_log!(info, "Background discovery started for user {}", user_id);
            if let Err(e) = service
                .background_discovery(&user_id, &analysis, &resume_file_name)
                .await
            {
                app_log!(error, "Background discovery failed for user {}: {:#}", user_id, e);
            }
        })
    }

    async fn background_discovery(
        &self,
        user_id: &str,
        analysis: &ResumeAnalysis,
        resume_file_name: &str,
    ) -> Result<()> {
        let profile = analysis.profile();
        let outcome = self
            .run_pipeline(
                user_id,
                &profile,
                &self.settings.default_location,
                self.settings.default_limit,
            )
            .await?;

        let DiscoveryOutcome::Matched(matches) = outcome else {
            app_log!(info, "Background discovery found no usable jobs for {}", user_id);
            return Ok(());
        };

        if let Some(writer) = &self.snapshots {
            match writer
                .write(user_id, resume_file_name, &profile, &matches)
                .await
            {
                Ok(path) => app_log!(info, "Jobs snapshot saved: {}", path.display()),
                Err(e) => app_log!(error, "Failed to save jobs snapshot: {:#}", e),
            }
        }
        Ok(())
    }

    async fn run_pipeline(
        &self,
        user_id: &str,
        profile: &ProfileSnapshot,
        location: &str,
        limit: usize,
    ) -> Result<DiscoveryOutcome> {
        app_log!(
            info,
            "Discovering jobs for {} in {} ({} skills, limit {})",
            user_id,
            location,
            profile.skills.len(),
            limit
        );

        let fetched = self.source.search(&profile.skills, location, limit).await;
        let jobs = match filter_valid_descriptions(fetched, self.settings.min_description_len) {
            FilteredJobs::Valid(jobs) => jobs,
            FilteredJobs::NoneSurvived { fetched } => {
                app_log!(warn, "No jobs with valid descriptions for {}", user_id);
                return Ok(DiscoveryOutcome::NoValidJobs { fetched });
            }
        };

        let results = self.matcher.match_jobs(profile, &jobs).await?;
        let matches = assemble_matches(user_id, jobs, &results, Utc::now());

        self.store
            .append_job_matches(user_id, &matches)
            .await
            .context("Failed to save job matches")?;

        app_log!(info, "Saved {} job matches for {}", matches.len(), user_id);
        Ok(DiscoveryOutcome::Matched(matches))
    }

    fn resolve_location(&self, location: Option<&str>) -> String {
        location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.settings.default_location.as_str())
            .to_string()
    }

    fn resolve_limit(&self, limit: Option<usize>) -> Result<usize> {
        match limit {
            None => Ok(self.settings.default_limit),
            Some(n) if (1..=MAX_DISCOVERY_LIMIT).contains(&n) => Ok(n),
            Some(n) => Err(PipelineError::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                MAX_DISCOVERY_LIMIT, n
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStore;
    use crate::test_support::{StubMatcher, StubSource};
    use crate::types::job::fixtures::{long_description, posting, resume};
    use crate::types::{DEFAULT_MATCH_REASON, DEFAULT_MATCH_SCORE};
    use std::sync::atomic::Ordering;

    fn postings() -> Vec<crate::types::JobPosting> {
        vec![
            posting("a", Some(long_description())),
            posting("short", Some("tiny")),
            posting("b", Some(long_description())),
            posting("c", Some(long_description())),
        ]
    }

    async fn service_with(
        matcher: StubMatcher,
        jobs: Vec<crate::types::JobPosting>,
    ) -> (Arc<MemoryStore>, Arc<StubSource>, DiscoveryService) {
        let store = Arc::new(MemoryStore::new());
        store.upsert_resume(&resume("u1", &["Rust"])).await.unwrap();
        let source = Arc::new(StubSource::new(jobs));
        let service = DiscoveryService::new(
            store.clone(),
            source.clone(),
            Arc::new(matcher),
            DiscoveryConfig::default(),
        );
        (store, source, service)
    }

    #[tokio::test]
    async fn test_discover_ranks_and_persists() {
        let (store, _, service) =
            service_with(StubMatcher::scores(&[("a", 40), ("c", 90)]), postings()).await;

        let matches = service
            .discover("u1", Some("Remote"), None)
            .await
            .unwrap()
            .into_matches();

        let order: Vec<&str> = matches.iter().map(|m| m.job_id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
        assert_eq!(matches[1].match_score, DEFAULT_MATCH_SCORE);
        assert_eq!(matches[1].match_reasons, vec![DEFAULT_MATCH_REASON]);

        let stored = store.list_job_matches("u1").await.unwrap();
        assert_eq!(stored, matches);
    }

    #[tokio::test]
    async fn test_repeated_discovery_appends_rows() {
        let (store, _, service) = service_with(StubMatcher::scores(&[]), postings()).await;
        service.discover("u1", None, None).await.unwrap();
        service.discover("u1", None, None).await.unwrap();
        assert_eq!(store.list_job_matches("u1").await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_missing_resume_is_precondition_error() {
        let (_, source, service) = service_with(StubMatcher::scores(&[]), postings()).await;
        let err = service.discover("nobody", None, None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::MissingResume)
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        let err = service.discover("  ", None, None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::MissingUserId)
        );
    }

    #[tokio::test]
    async fn test_invalid_limit() {
        let (_, _, service) = service_with(StubMatcher::scores(&[]), postings()).await;
        let err = service.discover("u1", None, Some(0)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_no_valid_descriptions() {
        let jobs = vec![posting("x", None), posting("y", Some("short"))];
        let (store, _, service) = service_with(StubMatcher::Malformed, jobs).await;

        let outcome = service.discover("u1", None, None).await.unwrap();
        assert_eq!(outcome, DiscoveryOutcome::NoValidJobs { fetched: 2 });
        assert!(outcome.message().contains("No jobs with valid descriptions"));
        assert!(store.list_job_matches("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_matcher_fails_whole_request() {
        let (store, _, service) = service_with(StubMatcher::Malformed, postings()).await;
        let err = service.discover("u1", None, None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UpstreamMalformed(_))
        ));
        assert!(store.list_job_matches("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let (_, _, service) = service_with(StubMatcher::scores(&[]), postings()).await;
        let matches = service.discover("u1", None, None).await.unwrap().into_matches();

        assert!(service
            .update_status("u1", &matches[0].id, JobStatus::Applied)
            .await
            .unwrap());
        assert!(!service
            .update_status("u1", "missing", JobStatus::Viewed)
            .await
            .unwrap());
        assert!(service
            .update_status("u1", " ", JobStatus::Viewed)
            .await
            .is_err());

        let current = service.current_jobs("u1").await.unwrap();
        assert_eq!(current.iter().filter(|m| m.is_applied()).count(), 1);
    }

    #[tokio::test]
    async fn test_background_discovery_writes_snapshot() {
        let root = std::env::temp_dir().join(format!("careerai-bg-{}", uuid::Uuid::new_v4()));
        let (store, _, service) = service_with(StubMatcher::scores(&[("b", 70)]), postings()).await;
        let service = Arc::new(service.with_snapshots(SnapshotWriter::new(&root)));

        let analysis = resume("u2", &["Rust"]).analysis;
        service
            .spawn_background_discovery("u2".to_string(), analysis, "cv.pdf".to_string())
            .await
            .unwrap();

        assert_eq!(store.list_job_matches("u2").await.unwrap().len(), 3);
        let files: Vec<_> = std::fs::read_dir(root.join("u2")).unwrap().collect();
        assert_eq!(files.len(), 1);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_background_discovery_swallows_errors() {
        let (store, _, service) = service_with(StubMatcher::Malformed, postings()).await;
        let service = Arc::new(service);

        let analysis = resume("u3", &["Rust"]).analysis;
        // the task itself completes normally
        service
            .spawn_background_discovery("u3".to_string(), analysis, "cv.pdf".to_string())
            .await
            .unwrap();
        assert!(store.list_job_matches("u3").await.unwrap().is_empty());
    }
}
