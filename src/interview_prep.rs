// src/interview_prep.rs
//! General, role-level interview preparation generated by the reasoning model

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;

use crate::app_log;
use crate::core::error::{require_user_id, PipelineError};
use crate::core::service_client::ReasoningClient;
use crate::core::store::JobStore;
use crate::types::{
    InterviewMaterial, InterviewPrep, MockQuestion, QuestionCategory, GENERAL_COMPANY,
};
use crate::utils::{clean_list, parse_model_json};

/// Questions served per mock-interview session
pub const MAX_MOCK_QUESTIONS: usize = 5;

const TECHNICAL_BANK: &[(&str, &str)] = &[
    ("1", "Can you explain the difference between var, let, and const in JavaScript?"),
    ("2", "What is the virtual DOM and how does React use it?"),
    ("3", "Explain the concept of closures in JavaScript with an example."),
    ("4", "What are the main differences between SQL and NoSQL databases?"),
    ("5", "How would you optimize the performance of a web application?"),
];

const BEHAVIORAL_BANK: &[(&str, &str)] = &[
    ("6", "Tell me about a time when you had to work under pressure to meet a deadline."),
    ("7", "Describe a situation where you had to resolve a conflict with a team member."),
    ("8", "Can you share an example of a project where you took initiative?"),
    ("9", "Tell me about a time when you failed and what you learned from it."),
    ("10", "How do you handle feedback and criticism?"),
];

pub struct InterviewPrepService {
    store: Arc<dyn JobStore>,
    client: Arc<dyn ReasoningClient>,
}

impl InterviewPrepService {
    pub fn new(store: Arc<dyn JobStore>, client: Arc<dyn ReasoningClient>) -> Self {
        Self { store, client }
    }

    pub async fn generate(
        &self,
        user_id: &str,
        role: &str,
        technologies: &[String],
    ) -> Result<InterviewPrep> {
        let user_id = require_user_id(user_id)?;
        let role = role.trim();
        let technologies = clean_list(technologies);
        if role.is_empty() || technologies.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Role and technologies are required".to_string(),
            )
            .into());
        }

        app_log!(
            info,
            "Generating interview prep for {} ({})",
            role,
            technologies.join(", ")
        );
        let reply = self
            .client
            .generate(&prep_prompt(role, &technologies))
            .await
            .context("Failed to generate interview material")?;
        let material: InterviewMaterial = parse_model_json(&reply, "interview material")?;

        let prep = InterviewPrep {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            company: GENERAL_COMPANY.to_string(),
            role: role.to_string(),
            technologies,
            created_at: Utc::now(),
            material,
        };

        self.store
            .append_interview_prep(&prep)
            .await
            .context("Failed to save interview prep")?;

        app_log!(
            info,
            "Interview prep {} saved: {} technical, {} behavioral, {} study items",
            prep.id,
            prep.material.technical_questions.len(),
            prep.material.behavioral_questions.len(),
            prep.material.study_guide.len()
        );
        Ok(prep)
    }

    /// Newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<InterviewPrep>> {
        let user_id = require_user_id(user_id)?;
        self.store.list_interview_preps(user_id).await
    }

    pub async fn latest(&self, user_id: &str) -> Result<Option<InterviewPrep>> {
        Ok(self.list(user_id).await?.into_iter().next())
    }

    /// Questions for a mock interview session.
    ///
    /// Drawn from the user's stored prep when `prep_id` names one that has
    /// questions in `category`, otherwise from the built-in bank.
    pub async fn mock_questions(
        &self,
        user_id: &str,
        prep_id: Option<&str>,
        category: QuestionCategory,
    ) -> Result<Vec<MockQuestion>> {
        let user_id = require_user_id(user_id)?;

        if let Some(prep_id) = prep_id.map(str::trim).filter(|id| !id.is_empty()) {
            match self.store.get_interview_prep(user_id, prep_id).await? {
                Some(prep) => {
                    let questions = questions_from_material(&prep.material, category);
                    if !questions.is_empty() {
                        return Ok(questions);
                    }
                    app_log!(
                        info,
                        "Prep {} has no {:?} questions, using the default bank",
                        prep_id,
                        category
                    );
                }
                None => app_log!(warn, "Prep {} not found for {}", prep_id, user_id),
            }
        }

        Ok(default_questions(category))
    }
}

fn questions_from_material(
    material: &InterviewMaterial,
    category: QuestionCategory,
) -> Vec<MockQuestion> {
    let texts: Vec<&str> = match category {
        QuestionCategory::Technical => material
            .technical_questions
            .iter()
            .map(|q| q.question.as_str())
            .collect(),
        QuestionCategory::Behavioral => material
            .behavioral_questions
            .iter()
            .map(|q| q.question.as_str())
            .collect(),
    };
    let prefix = match category {
        QuestionCategory::Technical => "tech",
        QuestionCategory::Behavioral => "behavioral",
    };

    texts
        .into_iter()
        .take(MAX_MOCK_QUESTIONS)
        .enumerate()
        .map(|(index, question)| MockQuestion {
            id: format!("{}-{}", prefix, index),
            question: question.to_string(),
            category,
        })
        .collect()
}

fn default_questions(category: QuestionCategory) -> Vec<MockQuestion> {
    let bank = match category {
        QuestionCategory::Technical => TECHNICAL_BANK,
        QuestionCategory::Behavioral => BEHAVIORAL_BANK,
    };
    bank.iter()
        .take(MAX_MOCK_QUESTIONS)
        .map(|(id, question)| MockQuestion {
            id: id.to_string(),
            question: question.to_string(),
            category,
        })
        .collect()
}

fn prep_prompt(role: &str, technologies: &[String]) -> String {
    format!(
        r#"Generate comprehensive interview preparation material for:
Role: {role}
Technologies: {technologies}

This should be GENERAL interview prep for this role type, NOT company-specific.

Return a JSON object with:
1. companyInsights: {{
   culture: "General overview of what this role typically involves",
   techStack: array of key technologies for this role,
   interviewProcess: "Typical interview process for this role",
   tips: array of general preparation tips
}}
2. technicalQuestions: array of {{ question, difficulty (Easy/Medium/Hard), category, hints (array), answer }}
3. behavioralQuestions: array of {{ question, category, framework (STAR), tips (array) }}
4. studyGuide: array of {{ topic, priority (High/Medium/Low), resources (array of resource names/links), timeEstimate }}

Generate 8-10 technical questions, 5-6 behavioral questions, and 6-8 study guide items.
Make questions specific to the role and technologies mentioned.
Focus on general industry best practices, not company-specific information.

Return ONLY valid JSON, no markdown or additional text."#,
        role = role,
        technologies = technologies.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStore;
    use crate::test_support::CannedReasoning;
    use crate::types::job::fixtures::prep;
    use crate::types::{BehavioralQuestion, Difficulty, Priority, TechnicalQuestion};
    use chrono::Duration;

    const MATERIAL: &str = r#"```json
{
  "companyInsights": {
    "culture": "Backend teams own services end to end",
    "techStack": ["Rust", "PostgreSQL"],
    "interviewProcess": "Screen, system design, coding",
    "tips": ["Know your tradeoffs"]
  },
  "technicalQuestions": [
    {"question": "What is a lifetime?", "difficulty": "Medium", "category": "Rust", "hints": ["Borrows"], "answer": "A scope for references"}
  ],
  "behavioralQuestions": [
    {"question": "Tell me about an outage", "category": "Ownership", "framework": "STAR", "tips": ["Be specific"]}
  ],
  "studyGuide": [
    {"topic": "Async Rust", "priority": "High", "resources": ["The async book"], "timeEstimate": "2 days"}
  ]
}
```"#;

    #[tokio::test]
    async fn test_generate_stores_general_prep() {
        let client = Arc::new(CannedReasoning::new(MATERIAL));
        let store = Arc::new(MemoryStore::new());
        let service = InterviewPrepService::new(store.clone(), client.clone());

        let prep = service
            .generate(
                "u1",
                " Backend Engineer ",
                &["Rust".to_string(), " ".to_string(), "PostgreSQL".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(prep.company, GENERAL_COMPANY);
        assert_eq!(prep.role, "Backend Engineer");
        assert_eq!(prep.technologies, vec!["Rust", "PostgreSQL"]);
        assert_eq!(
            prep.material.technical_questions[0].difficulty,
            Difficulty::Medium
        );
        assert_eq!(prep.material.study_guide[0].priority, Priority::High);
        assert_eq!(service.list("u1").await.unwrap(), vec![prep]);

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Technologies: Rust, PostgreSQL"));
        assert!(prompts[0].contains("8-10 technical questions"));
    }

    #[tokio::test]
    async fn test_requires_role_and_technologies() {
        let client = Arc::new(CannedReasoning::new(MATERIAL));
        let service = InterviewPrepService::new(Arc::new(MemoryStore::new()), client.clone());

        assert!(service.generate("u1", "  ", &["Rust".to_string()]).await.is_err());
        let err = service
            .generate("u1", "SRE", &[" ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidInput(_))
        ));
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_material_is_not_stored() {
        let store = Arc::new(MemoryStore::new());
        let service = InterviewPrepService::new(
            store.clone(),
            Arc::new(CannedReasoning::new(r#"{"technicalQuestions": "none"}"#)),
        );

        let err = service
            .generate("u1", "SRE", &["Linux".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UpstreamMalformed(_))
        ));
        assert!(store.list_interview_preps("u1").await.unwrap().is_empty());
    }

    fn prep_with_questions(user_id: &str, technical: usize, behavioral: usize) -> InterviewPrep {
        let mut prep = prep(user_id, "Backend Engineer", Utc::now());
        prep.material.technical_questions = (0..technical)
            .map(|i| TechnicalQuestion {
                question: format!("Technical {}", i),
                difficulty: Difficulty::Easy,
                category: "Rust".to_string(),
                hints: Vec::new(),
                answer: String::new(),
            })
            .collect();
        prep.material.behavioral_questions = (0..behavioral)
            .map(|i| BehavioralQuestion {
                question: format!("Behavioral {}", i),
                category: "Teamwork".to_string(),
                framework: "STAR".to_string(),
                tips: Vec::new(),
            })
            .collect();
        prep
    }

    fn service_with(store: Arc<MemoryStore>) -> InterviewPrepService {
        InterviewPrepService::new(store, Arc::new(CannedReasoning::new(MATERIAL)))
    }

    #[tokio::test]
    async fn test_questions_come_from_stored_prep_by_category() {
        let store = Arc::new(MemoryStore::new());
        let stored = prep_with_questions("u1", 8, 2);
        store.append_interview_prep(&stored).await.unwrap();
        let service = service_with(store);

        let technical = service
            .mock_questions("u1", Some(&stored.id), QuestionCategory::Technical)
            .await
            .unwrap();
        assert_eq!(technical.len(), MAX_MOCK_QUESTIONS);
        assert_eq!(technical[0].id, "tech-0");
        assert_eq!(technical[4].question, "Technical 4");
        assert!(technical
            .iter()
            .all(|q| q.category == QuestionCategory::Technical));

        let behavioral = service
            .mock_questions("u1", Some(&stored.id), QuestionCategory::Behavioral)
            .await
            .unwrap();
        let ids: Vec<&str> = behavioral.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["behavioral-0", "behavioral-1"]);
    }

    #[tokio::test]
    async fn test_questions_fall_back_to_default_bank() {
        let store = Arc::new(MemoryStore::new());
        let no_behavioral = prep_with_questions("u1", 3, 0);
        store.append_interview_prep(&no_behavioral).await.unwrap();
        let service = service_with(store);

        let without_prep = service
            .mock_questions("u1", None, QuestionCategory::Technical)
            .await
            .unwrap();
        assert_eq!(without_prep.len(), MAX_MOCK_QUESTIONS);
        assert_eq!(without_prep[0].id, "1");

        let empty_category = service
            .mock_questions("u1", Some(&no_behavioral.id), QuestionCategory::Behavioral)
            .await
            .unwrap();
        assert_eq!(empty_category[0].id, "6");
        assert_eq!(empty_category.len(), MAX_MOCK_QUESTIONS);

        // another user's prep id is not visible
        let other_user = service
            .mock_questions("u2", Some(&no_behavioral.id), QuestionCategory::Technical)
            .await
            .unwrap();
        assert_eq!(other_user[0].id, "1");
    }

    #[tokio::test]
    async fn test_latest_prep() {
        let store = Arc::new(MemoryStore::new());
        let service = service_with(store.clone());
        assert!(service.latest("u1").await.unwrap().is_none());

        let older = prep("u1", "Backend Engineer", Utc::now() - Duration::days(1));
        let newer = prep("u1", "Data Engineer", Utc::now());
        store.append_interview_prep(&older).await.unwrap();
        store.append_interview_prep(&newer).await.unwrap();

        assert_eq!(service.latest("u1").await.unwrap(), Some(newer));
        assert!(service.latest(" ").await.is_err());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(
            QuestionCategory::from_name(Some(" Behavioral ")),
            QuestionCategory::Behavioral
        );
        assert_eq!(
            QuestionCategory::from_name(Some("system-design")),
            QuestionCategory::Technical
        );
        assert_eq!(QuestionCategory::from_name(None), QuestionCategory::Technical);
    }
}
