// src/core/service_client.rs
//! HTTP client for the Gemini generateContent endpoint

use anyhow::{Context, Result};
use rocket::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::app_log;
use crate::core::config_manager::ServiceConfig;
use crate::core::error::PipelineError;

/// Text-in, text-out access to the reasoning model
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            app_log!(warn, "GEMINI_API_KEY not configured, AI features will fail");
        }

        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ReasoningClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("AI service is not properly configured: GEMINI_API_KEY is missing")?;

        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        app_log!(trace, "Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .context("Failed to call Gemini")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Gemini error response: {}", error_text);
            anyhow::bail!("Gemini returned error status {}: {}", status, error_text);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::UpstreamMalformed(format!("Gemini envelope: {}", e)))?;

        body.into_text().ok_or_else(|| {
            PipelineError::UpstreamMalformed("Gemini returned no candidate text".to_string())
                .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_text_is_joined() {
        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[{\"jobId\":" }, { "text": "\"1\"}]" }] }
            }]
        }))
        .unwrap();
        assert_eq!(body.into_text().unwrap(), "[{\"jobId\":\"1\"}]");
    }

    #[test]
    fn test_empty_candidates() {
        let body: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(body.into_text().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let config = ServiceConfig {
            gemini_api_key: Some("  ".to_string()),
            ..ServiceConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let err = client.generate("hello").await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
