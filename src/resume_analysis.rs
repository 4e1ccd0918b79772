// src/resume_analysis.rs
//! Resume intake: clean extracted text, ask the model for a structured
//! analysis, keep one record per user.

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use std::sync::Arc;

use crate::app_log;
use crate::core::error::{require_user_id, PipelineError};
use crate::core::service_client::ReasoningClient;
use crate::core::store::JobStore;
use crate::types::{ResumeAnalysis, ResumeRecord};
use crate::utils::parse_model_json;

pub const MIN_RESUME_TEXT_LEN: usize = 50;

/// Normalise text extracted from a resume before it goes into a prompt
pub fn clean_resume_text(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(PipelineError::InvalidInput("No text content to clean".to_string()).into());
    }

    let cleaned = Regex::new(r"[ \t]+")?.replace_all(text, " ");
    let cleaned = Regex::new(r"\n{3,}")?.replace_all(&cleaned, "\n\n");
    let cleaned = Regex::new(r#"[^A-Za-z0-9_\s@.,\-()/+#&:;'"]"#)?.replace_all(&cleaned, "");
    let cleaned = Regex::new(r"\s+")?.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim().to_string();

    if cleaned.chars().count() < MIN_RESUME_TEXT_LEN {
        return Err(PipelineError::InvalidInput(
            "Extracted text is too short to be a valid resume".to_string(),
        )
        .into());
    }
    Ok(cleaned)
}

pub struct ResumeAnalyzer {
    client: Arc<dyn ReasoningClient>,
}

impl ResumeAnalyzer {
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }

    /// `text` must already be cleaned
    pub async fn analyze(&self, text: &str) -> Result<ResumeAnalysis> {
        if text.trim().chars().count() < MIN_RESUME_TEXT_LEN {
            return Err(
                PipelineError::InvalidInput("Resume text is too short or empty".to_string()).into(),
            );
        }

        app_log!(info, "Analyzing resume ({} chars)", text.len());
        let reply = self
            .client
            .generate(&analysis_prompt(text))
            .await
            .context("Failed to analyze resume")?;

        let analysis: ResumeAnalysis = parse_model_json(&reply, "resume analysis")?;
        app_log!(
            info,
            "Resume analyzed: {} skills, {} years, {}",
            analysis.skills.len(),
            analysis.years_of_experience,
            analysis.proficiency_level
        );
        Ok(analysis)
    }
}

fn analysis_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following resume and extract structured information in JSON format.
Extract: name, email, phone, skills (array), experience (array with title, company, duration, description),
education (array with degree, school, year), projects (array with name, description, tech array),
summary, proficiencyLevel (Entry Level/Junior/Mid-Level/Senior/Lead), yearsOfExperience (number).

Resume text:
{}

Return ONLY valid JSON, no markdown or additional text. Ensure all arrays are properly formatted.
If a field is not found, use empty string for strings, empty array for arrays, or 0 for numbers."#,
        text
    )
}

/// A resume as submitted by the client, text already extracted
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub file_url: Option<String>,
    pub text: String,
}

pub struct ResumeService {
    store: Arc<dyn JobStore>,
    analyzer: ResumeAnalyzer,
}

impl ResumeService {
    pub fn new(store: Arc<dyn JobStore>, client: Arc<dyn ReasoningClient>) -> Self {
        Self {
            store,
            analyzer: ResumeAnalyzer::new(client),
        }
    }

    /// Clean, analyze and store. Replaces any earlier resume for the user.
    pub async fn ingest(&self, user_id: &str, upload: ResumeUpload) -> Result<ResumeRecord> {
        let user_id = require_user_id(user_id)?;
        let file_name = upload.file_name.trim();
        if file_name.is_empty() {
            return Err(PipelineError::InvalidInput("fileName is required".to_string()).into());
        }

        let text = clean_resume_text(&upload.text)?;
        let analysis = self.analyzer.analyze(&text).await?;

        let record = ResumeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            file_url: upload.file_url.filter(|u| !u.trim().is_empty()),
            uploaded_at: Utc::now(),
            analysis,
        };

        self.store
            .upsert_resume(&record)
            .await
            .context("Failed to save resume")?;
        app_log!(info, "Resume {} stored for {}", record.file_name, user_id);
        Ok(record)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
        let user_id = require_user_id(user_id)?;
        self.store.get_resume(user_id).await
    }
}
