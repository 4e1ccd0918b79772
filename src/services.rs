// src/services.rs
//! Wires the configured store and outbound clients into the services the
//! HTTP layer and the CLI share.

use anyhow::Result;
use std::sync::Arc;

use crate::analytics::{AnalyticsService, ProficiencySource, RandomProficiency};
use crate::app_log;
use crate::core::config_manager::{ConfigManager, DiscoveryConfig, StorageBackend};
use crate::core::error::require_user_id;
use crate::core::{Database, GeminiClient, JobStore, MemoryStore, ReasoningClient};
use crate::interview_prep::InterviewPrepService;
use crate::job_discovery::{
    DiscoveryService, GeminiMatcher, JobSource, SerpJobSource, SnapshotWriter,
};
use crate::resume_analysis::ResumeService;

pub struct AppServices {
    store: Arc<dyn JobStore>,
    pub discovery: Arc<DiscoveryService>,
    pub analytics: AnalyticsService,
    pub resumes: ResumeService,
    pub interviews: InterviewPrepService,
}

impl AppServices {
    pub async fn from_config(config: &ConfigManager) -> Result<Self> {
        let store = open_store(config).await?;
        let reasoning: Arc<dyn ReasoningClient> = Arc::new(GeminiClient::new(&config.service)?);
        let source = Arc::new(SerpJobSource::new(&config.service)?);

        Ok(Self::new(
            store,
            reasoning,
            source,
            config.discovery.clone(),
            Arc::new(RandomProficiency),
            Some(SnapshotWriter::new(&config.environment.snapshot_path)),
        ))
    }

    pub fn new(
        store: Arc<dyn JobStore>,
        reasoning: Arc<dyn ReasoningClient>,
        source: Arc<dyn JobSource>,
        discovery_config: DiscoveryConfig,
        proficiency: Arc<dyn ProficiencySource>,
        snapshots: Option<SnapshotWriter>,
    ) -> Self {
        let matcher = Arc::new(GeminiMatcher::new(reasoning.clone()));
        let mut discovery = DiscoveryService::new(store.clone(), source, matcher, discovery_config);
        if let Some(writer) = snapshots {
            discovery = discovery.with_snapshots(writer);
        }

        Self {
            discovery: Arc::new(discovery),
            analytics: AnalyticsService::new(store.clone(), proficiency),
            resumes: ResumeService::new(store.clone(), reasoning.clone()),
            interviews: InterviewPrepService::new(store.clone(), reasoning),
            store,
        }
    }

    /// Drop the resume, job matches and interview preps stored for a user
    pub async fn clear_user(&self, user_id: &str) -> Result<()> {
        let user_id = require_user_id(user_id)?;
        self.store.clear_user_data(user_id).await?;
        app_log!(info, "Cleared stored data for {}", user_id);
        Ok(())
    }
}

pub async fn open_store(config: &ConfigManager) -> Result<Arc<dyn JobStore>> {
    match config.environment.storage {
        StorageBackend::Sqlite => {
            let db = Database::new(&config.environment.database_path).await?;
            Ok(Arc::new(db))
        }
        StorageBackend::Memory => {
            app_log!(warn, "Using in-memory storage, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
