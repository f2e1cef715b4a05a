//! Candidate Store — the only module that issues SQL against the `candidates` table.
//!
//! Every function is generic over a sqlx executor so callers can run it on the
//! pool directly or inside a transaction (`&mut *tx`).

use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};
use thiserror::Error;
use tracing::debug;

use crate::models::candidate::{
    Candidate, CandidateAnalysis, CandidateRow, CultureFit, CvFile, Recommendation,
    AWAITING_CV_FLAG,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write on this email lost to a concurrent writer: the unique index fired, or the
    /// database stayed locked past the busy timeout.
    #[error("candidate with email {email} already exists")]
    Conflict { email: String },
}

/// Ordering options for the full listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    #[default]
    ScoreDesc,
    NewestFirst,
}

impl ListOrder {
    fn order_by(&self) -> &'static str {
        match self {
            ListOrder::ScoreDesc => "score_global DESC, id ASC",
            ListOrder::NewestFirst => "created_at DESC, id DESC",
        }
    }
}

/// Fields for a placeholder row created from a CSV line.
#[derive(Debug, Clone, Default)]
pub struct NewPlaceholder {
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub source_row: Value,
}

/// Selective update applied by the CSV importer. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportMerge {
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
}

impl ImportMerge {
    pub fn is_noop(&self) -> bool {
        self.skills.is_none() && self.experience.is_none()
    }
}

/// SQLite primary result codes that mean another connection holds the write lock.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Maps a failed write on `email` to `Conflict` when it lost a race for that email:
/// the unique index fired, or a concurrent writer held the lock past the busy timeout.
fn map_write_error(err: sqlx::Error, email: &str) -> StoreError {
    let contended = err.as_database_error().is_some_and(|db| {
        db.is_unique_violation()
            || db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
    });
    if contended {
        StoreError::Conflict {
            email: email.to_string(),
        }
    } else {
        StoreError::Database(err)
    }
}

/// Exact, case-sensitive lookup. Email is the sole deduplication key.
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Candidate>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE email = ?")
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Candidate::from))
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Candidate>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(Candidate::from))
}

/// Inserts a fully analyzed candidate and returns its id.
pub async fn insert_analyzed<'e, E>(
    executor: E,
    email: &str,
    cv: &CvFile,
    analysis: &CandidateAnalysis,
) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO candidates
            (name, email, filename, stored_file, skills, experience, strengths, raw_profile,
             score_global, score_tech, score_experience, score_cloud, score_soft_skills,
             score_explanation, behavioral_analysis, gaps, matched_strengths, soft_skills,
             recommendation, culture_fit, flags, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&analysis.name)
    .bind(email)
    .bind(&cv.filename)
    .bind(&cv.stored_as)
    .bind(Json(&analysis.skills))
    .bind(&analysis.experience)
    .bind(Json(&analysis.strengths))
    .bind(Json(&analysis.raw_profile))
    .bind(i64::from(analysis.scores.global))
    .bind(i64::from(analysis.scores.tech))
    .bind(i64::from(analysis.scores.experience))
    .bind(i64::from(analysis.scores.cloud))
    .bind(i64::from(analysis.scores.soft_skills))
    .bind(&analysis.explanation)
    .bind(&analysis.behavioral_analysis)
    .bind(Json(&analysis.gaps))
    .bind(Json(&analysis.matched_strengths))
    .bind(Json(&analysis.soft_skills))
    .bind(analysis.recommendation.as_str())
    .bind(analysis.culture_fit.as_str())
    .bind(Json(&analysis.flags))
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|e| map_write_error(e, email))?;

    let id = result.last_insert_rowid();
    debug!("Inserted candidate {id} ({email})");
    Ok(id)
}

/// Overwrites every extracted and scoring field of the candidate holding `email` and
/// returns its id, or `None` when no such candidate exists. Email and creation
/// timestamp are never touched.
pub async fn update_analysis_by_email<'e, E>(
    executor: E,
    email: &str,
    cv: &CvFile,
    analysis: &CandidateAnalysis,
) -> Result<Option<i64>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE candidates SET
            name = ?, filename = ?, stored_file = ?, skills = ?, experience = ?, strengths = ?, raw_profile = ?,
            score_global = ?, score_tech = ?, score_experience = ?, score_cloud = ?,
            score_soft_skills = ?, score_explanation = ?, behavioral_analysis = ?,
            gaps = ?, matched_strengths = ?, soft_skills = ?,
            recommendation = ?, culture_fit = ?, flags = ?
        WHERE email = ?
        RETURNING id
        "#,
    )
    .bind(&analysis.name)
    .bind(&cv.filename)
    .bind(&cv.stored_as)
    .bind(Json(&analysis.skills))
    .bind(&analysis.experience)
    .bind(Json(&analysis.strengths))
    .bind(Json(&analysis.raw_profile))
    .bind(i64::from(analysis.scores.global))
    .bind(i64::from(analysis.scores.tech))
    .bind(i64::from(analysis.scores.experience))
    .bind(i64::from(analysis.scores.cloud))
    .bind(i64::from(analysis.scores.soft_skills))
    .bind(&analysis.explanation)
    .bind(&analysis.behavioral_analysis)
    .bind(Json(&analysis.gaps))
    .bind(Json(&analysis.matched_strengths))
    .bind(Json(&analysis.soft_skills))
    .bind(analysis.recommendation.as_str())
    .bind(analysis.culture_fit.as_str())
    .bind(Json(&analysis.flags))
    .bind(email)
    .fetch_optional(executor)
    .await
    .map_err(|e| map_write_error(e, email))?;

    if let Some(id) = id {
        debug!("Overwrote analysis of candidate {id} ({email})");
    }
    Ok(id)
}

/// Inserts a CSV placeholder: zero scores, A_VERIFIER, flagged as awaiting a CV.
pub async fn insert_placeholder<'e, E>(
    executor: E,
    placeholder: &NewPlaceholder,
) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO candidates
            (name, email, skills, experience, raw_profile, recommendation, culture_fit, flags, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&placeholder.name)
    .bind(&placeholder.email)
    .bind(Json(&placeholder.skills))
    .bind(&placeholder.experience)
    .bind(Json(&placeholder.source_row))
    .bind(Recommendation::AVerifier.as_str())
    .bind(CultureFit::Moyen.as_str())
    .bind(Json(vec![AWAITING_CV_FLAG]))
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|e| map_write_error(e, &placeholder.email))?;

    Ok(result.last_insert_rowid())
}

/// Partial update: only the fields set in `merge` are written.
pub async fn merge_from_import<'e, E>(
    executor: E,
    id: i64,
    merge: &ImportMerge,
) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "UPDATE candidates SET skills = COALESCE(?, skills), experience = COALESCE(?, experience) WHERE id = ?",
    )
    .bind(merge.skills.as_ref().map(Json))
    .bind(merge.experience.as_deref())
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Full table scan, no pagination.
pub async fn list_all<'e, E>(executor: E, order: ListOrder) -> Result<Vec<Candidate>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT * FROM candidates ORDER BY {}", order.order_by());
    let rows = sqlx::query_as::<_, CandidateRow>(&sql)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(Candidate::from).collect())
}

/// Case-insensitive containment match over name, email, experience text and each
/// skill, best score first. Matching runs in Rust because SQLite's `lower()` only
/// folds ASCII. Blank queries are the caller's concern.
pub async fn search<'e, E>(executor: E, query: &str) -> Result<Vec<Candidate>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let needle = query.trim().to_lowercase();
    let candidates = list_all(executor, ListOrder::ScoreDesc).await?;
    Ok(candidates
        .into_iter()
        .filter(|candidate| candidate.matches(&needle))
        .collect())
}

pub async fn filter_by_recommendation<'e, E>(
    executor: E,
    recommendation: Recommendation,
) -> Result<Vec<Candidate>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE recommendation = ? ORDER BY score_global DESC, id ASC",
    )
    .bind(recommendation.as_str())
    .fetch_all(executor)
    .await?;
    Ok(rows.into_iter().map(Candidate::from).collect())
}
