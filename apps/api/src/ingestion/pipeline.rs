//! Ingestion pipeline — one CV upload from raw bytes to a stored candidate.
//!
//! Flow: save file → extract text → analyze → load job requirements → score →
//!       upsert by email (single transaction) → return the candidate id.
//!
//! Nothing is written to the store unless every step before the upsert succeeded,
//! and a failed run leaves no file behind in the upload area.

use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::candidates::store::{self, StoreError};
use crate::ingestion::analyzer::{AnalysisError, AnalyzedCv, CvAnalyzer};
use crate::ingestion::extractor::{ExtractionError, TextExtractor};
use crate::ingestion::job_requirements::JobRequirementsSource;
use crate::ingestion::scorer::{CandidateScorer, ScoreReport, ScoringError};
use crate::ingestion::uploads::{StoredUpload, UploadArea, UploadedFile};
use crate::models::candidate::{CandidateAnalysis, CvFile};

/// External collaborators used by the pipeline, injected per request.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn TextExtractor>,
    pub analyzer: Arc<dyn CvAnalyzer>,
    pub scorer: Arc<dyn CandidateScorer>,
    pub requirements: Arc<dyn JobRequirementsSource>,
}

/// Failure classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    Storage,
    Extraction,
    Analysis,
    Scoring,
    Conflict,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not save the uploaded file: {0}")]
    Save(#[source] std::io::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// A concurrent upload for the same email held the database past the busy timeout.
    #[error("candidate {email} is being written by a concurrent upload, retry the upload")]
    Conflict { email: String },

    #[error("could not persist the candidate: {0}")]
    Store(#[from] sqlx::Error),
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::Save(_) | IngestError::Store(_) => IngestErrorKind::Storage,
            IngestError::Extraction(_) => IngestErrorKind::Extraction,
            IngestError::Analysis(_) => IngestErrorKind::Analysis,
            IngestError::Scoring(_) => IngestErrorKind::Scoring,
            IngestError::Conflict { .. } => IngestErrorKind::Conflict,
        }
    }

    /// Pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::Save(_) | IngestError::Extraction(_) => "save/extract",
            IngestError::Analysis(_) => "analysis",
            IngestError::Scoring(_) => "scoring",
            IngestError::Conflict { .. } | IngestError::Store(_) => "upsert",
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { email } => IngestError::Conflict { email },
            StoreError::Database(e) => IngestError::Store(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub candidate_id: i64,
    pub action: UpsertAction,
}

/// Runs the whole pipeline for one uploaded CV. On any failure the saved file is
/// removed again, so the upload area only holds files referenced by a candidate.
pub async fn ingest_cv(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    uploads: &UploadArea,
    file: UploadedFile,
) -> Result<IngestOutcome, IngestError> {
    // Step 1: Persist the raw file
    let stored = uploads.save(&file).await.map_err(IngestError::Save)?;

    match process_stored(pool, collaborators, &stored, file.filename).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            warn!("Ingestion failed at {}: {err}", err.stage());
            uploads.discard(&stored).await;
            Err(err)
        }
    }
}

async fn process_stored(
    pool: &SqlitePool,
    collaborators: &Collaborators,
    stored: &StoredUpload,
    filename: String,
) -> Result<IngestOutcome, IngestError> {
    // Step 2: Extract text
    let text = collaborators.extractor.extract(&stored.path).await?;
    info!("Extracted {} chars from '{filename}'", text.len());

    // Step 3: Analyze
    let analyzed = collaborators.analyzer.analyze(&text).await?;
    let email = analyzed.profile.email.trim().to_string();
    if email.is_empty() {
        warn!("Analysis of '{filename}' returned no email");
        return Err(AnalysisError::MissingEmail.into());
    }

    // Step 4: Load the reference job offer
    let job = collaborators
        .requirements
        .load()
        .await
        .map_err(ScoringError::from)?;

    // Step 5: Score
    let report = collaborators.scorer.score(&analyzed.profile, &job).await?;
    info!(
        "Scored {email}: {}/100, {}",
        report.score_total, report.recommendation
    );

    // Step 6: Upsert by email
    let cv = CvFile {
        filename,
        stored_as: stored.stored_name.clone(),
    };
    let analysis = merge_analysis(analyzed, report);
    let outcome = upsert_candidate(pool, &email, &cv, &analysis).await?;

    info!(
        "Candidate {} {:?} from '{}'",
        outcome.candidate_id, outcome.action, cv.filename
    );
    Ok(outcome)
}

/// Update-or-insert keyed on `email`, in one transaction.
///
/// The transaction opens with a write, so SQLite takes the write lock before
/// anything is read and a concurrent upsert for the same email waits (up to the
/// busy timeout) instead of acting on a stale lookup. The second writer then
/// sees the committed row and updates it.
async fn upsert_candidate(
    pool: &SqlitePool,
    email: &str,
    cv: &CvFile,
    analysis: &CandidateAnalysis,
) -> Result<IngestOutcome, IngestError> {
    let mut tx = pool.begin().await?;
    let outcome = match store::update_analysis_by_email(&mut *tx, email, cv, analysis).await? {
        Some(id) => IngestOutcome {
            candidate_id: id,
            action: UpsertAction::Updated,
        },
        None => IngestOutcome {
            candidate_id: store::insert_analyzed(&mut *tx, email, cv, analysis).await?,
            action: UpsertAction::Created,
        },
    };
    tx.commit().await?;
    Ok(outcome)
}

/// Combines the extracted profile and the score report into the stored field set.
fn merge_analysis(analyzed: AnalyzedCv, report: ScoreReport) -> CandidateAnalysis {
    let scores = report.scores();
    let AnalyzedCv { profile, raw } = analyzed;
    CandidateAnalysis {
        name: profile.name,
        skills: profile.skills,
        experience: profile.experience,
        strengths: profile.strengths,
        raw_profile: raw,
        scores,
        explanation: report.explanation,
        behavioral_analysis: report.behavioral_analysis,
        gaps: report.gaps,
        matched_strengths: report.matched_strengths,
        soft_skills: report.soft_skills,
        recommendation: report.recommendation,
        culture_fit: report.culture_fit,
        flags: report.flags,
    }
}
