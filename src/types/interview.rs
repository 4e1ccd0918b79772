// src/types/interview.rs
//! Interview preparation material

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GENERAL_COMPANY: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPrep {
    pub id: String,
    pub user_id: String,
    pub company: String,
    pub role: String,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub material: InterviewMaterial,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewMaterial {
    pub company_insights: CompanyInsights,
    pub technical_questions: Vec<TechnicalQuestion>,
    pub behavioral_questions: Vec<BehavioralQuestion>,
    pub study_guide: Vec<StudyGuideItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInsights {
    #[serde(default)]
    pub culture: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub interview_process: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalQuestion {
    pub question: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralQuestion {
    pub question: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGuideItem {
    pub topic: String,
    pub priority: Priority,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub time_estimate: String,
}

/// Question pool for the mock-interview feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Behavioral,
}

impl QuestionCategory {
    /// Unknown or missing names select the technical pool
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_lowercase()).as_deref() {
            Some("behavioral") => QuestionCategory::Behavioral,
            _ => QuestionCategory::Technical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockQuestion {
    pub id: String,
    pub question: String,
    pub category: QuestionCategory,
}
