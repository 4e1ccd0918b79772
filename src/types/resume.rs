// src/types/resume.rs
//! Resume analysis as extracted by the reasoning service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PROFICIENCY_LEVEL: &str = "Mid-Level";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub analysis: ResumeAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Option<String>,
    #[serde(
        default = "default_proficiency_level",
        deserialize_with = "proficiency_or_default"
    )]
    pub proficiency_level: String,
    #[serde(default, deserialize_with = "lenient_years")]
    pub years_of_experience: u32,
}

fn default_proficiency_level() -> String {
    DEFAULT_PROFICIENCY_LEVEL.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn proficiency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let level = Option::<String>::deserialize(deserializer)?;
    Ok(level
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(default_proficiency_level))
}

// Models answer with 3, 3.5, "4" or null here.
fn lenient_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let years = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(years
        .filter(|y| y.is_finite() && *y > 0.0)
        .map(|y| y.floor() as u32)
        .unwrap_or(0))
}

impl ResumeAnalysis {
    pub fn profile(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            skills: self.skills.clone(),
            years_of_experience: self.years_of_experience,
            proficiency_level: self.proficiency_level.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tech: Vec<String>,
}

/// The part of a resume analysis the matcher reasons over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub skills: Vec<String>,
    pub years_of_experience: u32,
    pub proficiency_level: String,
}
