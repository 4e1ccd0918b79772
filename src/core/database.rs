// src/core/database.rs
//! SQLite persistence for resumes, job matches and interview preps

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rocket::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

use crate::app_log;
use crate::core::store::{JobStore, sort_by_score};
use crate::core::FsOps;
use crate::types::{
    InterviewMaterial, InterviewPrep, JobMatch, JobPosting, JobStatus, ResumeAnalysis,
    ResumeRecord,
};

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database. One connection, or every query sees a new empty db.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resumes (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                file_name TEXT NOT NULL,
                file_url TEXT,
                uploaded_at TEXT NOT NULL,
                analysis TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_applications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                job_id TEXT NOT NULL,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT,
                requirements TEXT NOT NULL,
                salary TEXT,
                job_type TEXT NOT NULL,
                posted TEXT NOT NULL,
                url TEXT NOT NULL,
                source TEXT NOT NULL,
                tags TEXT NOT NULL,
                match_score INTEGER NOT NULL CHECK (match_score BETWEEN 0 AND 100),
                match_reasons TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interview_preps (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                company TEXT NOT NULL,
                role TEXT NOT NULL,
                technologies TEXT NOT NULL,
                material TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_job_applications_user ON job_applications(user_id);",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_interview_preps_user ON interview_preps(user_id);",
        )
        .execute(&self.pool)
        .await?;

        app_log!(info, "Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, column: &str) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("Failed to encode {}", column))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt JSON in column {}", column))
}

// ===== Row Models =====

#[derive(Debug, sqlx::FromRow)]
struct ResumeRow {
    id: String,
    user_id: String,
    file_name: String,
    file_url: Option<String>,
    uploaded_at: DateTime<Utc>,
    analysis: String,
}

impl TryFrom<ResumeRow> for ResumeRecord {
    type Error = anyhow::Error;

    fn try_from(row: ResumeRow) -> Result<Self> {
        let analysis: ResumeAnalysis = from_json(&row.analysis, "resumes.analysis")?;
        Ok(ResumeRecord {
            id: row.id,
            user_id: row.user_id,
            file_name: row.file_name,
            file_url: row.file_url,
            uploaded_at: row.uploaded_at,
            analysis,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobApplicationRow {
    id: String,
    user_id: String,
    job_id: String,
    title: String,
    company: String,
    location: String,
    description: Option<String>,
    requirements: String,
    salary: Option<String>,
    job_type: String,
    posted: DateTime<Utc>,
    url: String,
    source: String,
    tags: String,
    match_score: i64,
    match_reasons: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobApplicationRow> for JobMatch {
    type Error = anyhow::Error;

    fn try_from(row: JobApplicationRow) -> Result<Self> {
        let match_score = u8::try_from(row.match_score)
            .with_context(|| format!("Stored match score out of range: {}", row.match_score))?;

        Ok(JobMatch {
            id: row.id,
            user_id: row.user_id,
            job: JobPosting {
                id: row.job_id.clone(),
                title: row.title,
                company: row.company,
                location: row.location,
                description: row.description,
                requirements: from_json(&row.requirements, "job_applications.requirements")?,
                salary: row.salary,
                job_type: row.job_type,
                posted: row.posted,
                url: row.url,
                source: row.source,
                tags: from_json(&row.tags, "job_applications.tags")?,
            },
            job_id: row.job_id,
            match_score,
            match_reasons: from_json(&row.match_reasons, "job_applications.match_reasons")?,
            created_at: row.created_at,
            status: row.status.parse()?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InterviewPrepRow {
    id: String,
    user_id: String,
    company: String,
    role: String,
    technologies: String,
    material: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InterviewPrepRow> for InterviewPrep {
    type Error = anyhow::Error;

    fn try_from(row: InterviewPrepRow) -> Result<Self> {
        let material: InterviewMaterial = from_json(&row.material, "interview_preps.material")?;
        Ok(InterviewPrep {
            id: row.id,
            user_id: row.user_id,
            company: row.company,
            role: row.role,
            technologies: from_json(&row.technologies, "interview_preps.technologies")?,
            created_at: row.created_at,
            material,
        })
    }
}

const JOB_APPLICATION_COLUMNS: &str = "id, user_id, job_id, title, company, location, \
     description, requirements, salary, job_type, posted, url, source, tags, match_score, \
     match_reasons, status, created_at";

// ===== Store Implementation =====

#[async_trait]
impl JobStore for Database {
    async fn upsert_resume(&self, resume: &ResumeRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO resumes (id, user_id, file_name, file_url, uploaded_at, analysis)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                id = excluded.id,
                file_name = excluded.file_name,
                file_url = excluded.file_url,
                uploaded_at = excluded.uploaded_at,
                analysis = excluded.analysis
            "#,
        )
        .bind(&resume.id)
        .bind(&resume.user_id)
        .bind(&resume.file_name)
        .bind(&resume.file_url)
        .bind(resume.uploaded_at)
        .bind(to_json(&resume.analysis, "resumes.analysis")?)
        .execute(&self.pool)
        .await
        .context("Failed to save resume")?;

        app_log!(info, "Saved resume {} for user {}", resume.file_name, resume.user_id);
        Ok(())
    }

    async fn get_resume(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, user_id, file_name, file_url, uploaded_at, analysis
            FROM resumes
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load resume")?;

        row.map(ResumeRecord::try_from).transpose()
    }

    async fn append_job_matches(&self, user_id: &str, matches: &[JobMatch]) -> Result<()> {
        let insert = format!(
            "INSERT INTO job_applications ({}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            JOB_APPLICATION_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        for job_match in matches {
            let job = &job_match.job;
            sqlx::query(&insert)
                .bind(&job_match.id)
                .bind(user_id)
                .bind(&job_match.job_id)
                .bind(&job.title)
                .bind(&job.company)
                .bind(&job.location)
                .bind(&job.description)
                .bind(to_json(&job.requirements, "requirements")?)
                .bind(&job.salary)
                .bind(&job.job_type)
                .bind(job.posted)
                .bind(&job.url)
                .bind(&job.source)
                .bind(to_json(&job.tags, "tags")?)
                .bind(i64::from(job_match.match_score))
                .bind(to_json(&job_match.match_reasons, "match_reasons")?)
                .bind(job_match.status.as_str())
                .bind(job_match.created_at)
                .execute(&mut *tx)
                .await
                .context("Failed to insert job match")?;
        }
        tx.commit().await?;

        app_log!(info, "Stored {} job matches for user {}", matches.len(), user_id);
        Ok(())
    }

    async fn list_job_matches(&self, user_id: &str) -> Result<Vec<JobMatch>> {
        let query = format!(
            "SELECT {} FROM job_applications WHERE user_id = ? ORDER BY rowid ASC",
            JOB_APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load job matches")?;

        let mut matches = rows
            .into_iter()
            .map(JobMatch::try_from)
            .collect::<Result<Vec<_>>>()?;
        sort_by_score(&mut matches);
        Ok(matches)
    }

    async fn recent_job_matches(&self, user_id: &str, limit: usize) -> Result<Vec<JobMatch>> {
        let query = format!(
            "SELECT {} FROM job_applications WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
            JOB_APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobApplicationRow>(&query)
            .bind(user_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .context("Failed to load recent job matches")?;

        rows.into_iter().map(JobMatch::try_from).collect()
    }

    async fn update_job_status(
        &self,
        user_id: &str,
        match_id: &str,
        status: JobStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE job_applications
            SET status = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(match_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update job status")?;

        let updated = result.rows_affected() > 0;
        if updated {
            app_log!(info, "Job match {} marked {}", match_id, status);
        }
        Ok(updated)
    }

    async fn count_job_matches_with_status(
        &self,
        user_id: &str,
        status: JobStatus,
    ) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM job_applications WHERE user_id = ? AND status = ?",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to count job matches")?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn append_interview_prep(&self, prep: &InterviewPrep) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interview_preps (id, user_id, company, role, technologies, material, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&prep.id)
        .bind(&prep.user_id)
        .bind(&prep.company)
        .bind(&prep.role)
        .bind(to_json(&prep.technologies, "technologies")?)
        .bind(to_json(&prep.material, "material")?)
        .bind(prep.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to save interview prep")?;

        app_log!(info, "Saved interview prep {} for user {}", prep.role, prep.user_id);
        Ok(())
    }

    async fn list_interview_preps(&self, user_id: &str) -> Result<Vec<InterviewPrep>> {
        let rows = sqlx::query_as::<_, InterviewPrepRow>(
            r#"
            SELECT id, user_id, company, role, technologies, material, created_at
            FROM interview_preps
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load interview preps")?;

        rows.into_iter().map(InterviewPrep::try_from).collect()
    }

    async fn get_interview_prep(
        &self,
        user_id: &str,
        prep_id: &str,
    ) -> Result<Option<InterviewPrep>> {
        let row = sqlx::query_as::<_, InterviewPrepRow>(
            r#"
            SELECT id, user_id, company, role, technologies, material, created_at
            FROM interview_preps
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(prep_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load interview prep")?;

        row.map(InterviewPrep::try_from).transpose()
    }

    async fn clear_user_data(&self, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for table in ["resumes", "job_applications", "interview_preps"] {
            sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to clear {}", table))?;
        }
        tx.commit().await?;

        app_log!(info, "Cleared stored data for user {}", user_id);
        Ok(())
    }
}
