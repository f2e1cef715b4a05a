//! In-memory collaborators for pipeline and router tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::ingestion::analyzer::{AnalysisError, AnalyzedCv, CandidateProfile, CvAnalyzer};
use crate::ingestion::extractor::{ExtractionError, TextExtractor};
use crate::ingestion::job_requirements::{
    JobRequirements, JobRequirementsSource, RequirementsError,
};
use crate::ingestion::scorer::{CandidateScorer, ScoreReport, ScoringError};
use crate::ingestion::Collaborators;
use crate::llm_client::LlmError;

/// Returns the given text for any file, or `NoText` when `None`.
pub struct FakeExtractor(pub Option<String>);

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        self.0.clone().ok_or_else(|| ExtractionError::NoText {
            path: path.to_path_buf(),
        })
    }
}

/// Replies with a fixed model payload.
pub struct FakeAnalyzer(pub Value);

#[async_trait]
impl CvAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _cv_text: &str) -> Result<AnalyzedCv, AnalysisError> {
        AnalyzedCv::from_raw(self.0.clone())
    }
}

/// Replies with a fixed model payload, or fails like an unreachable API.
pub enum FakeScorer {
    Reply(Value),
    Down,
}

#[async_trait]
impl CandidateScorer for FakeScorer {
    async fn score(
        &self,
        _profile: &CandidateProfile,
        _job: &JobRequirements,
    ) -> Result<ScoreReport, ScoringError> {
        match self {
            FakeScorer::Reply(raw) => ScoreReport::from_raw(raw),
            FakeScorer::Down => Err(LlmError::Api {
                status: 529,
                message: "overloaded".into(),
            }
            .into()),
        }
    }
}

pub struct StaticRequirements(pub JobRequirements);

#[async_trait]
impl JobRequirementsSource for StaticRequirements {
    async fn load(&self) -> Result<JobRequirements, RequirementsError> {
        Ok(self.0.clone())
    }
}

pub fn failing_scorer() -> Arc<dyn CandidateScorer> {
    Arc::new(FakeScorer::Down)
}

/// Collaborators whose analyzer and scorer return the given payloads.
pub fn collaborators(profile: Value, report: Value) -> Collaborators {
    Collaborators {
        extractor: Arc::new(FakeExtractor(Some("Ada Lovelace\nData Engineer".into()))),
        analyzer: Arc::new(FakeAnalyzer(profile)),
        scorer: Arc::new(FakeScorer::Reply(report)),
        requirements: Arc::new(StaticRequirements(JobRequirements {
            title: "Data Engineer".into(),
            required_skills: vec!["Python".into(), "SQL".into()],
            min_experience_years: 3,
            ..JobRequirements::default()
        })),
    }
}
