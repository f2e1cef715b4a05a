//! AI Scorer — compares a candidate profile with the job requirements.
//!
//! The scores, tags and lists are produced entirely by the model. Locally we only
//! enforce the schema and apply defaults; no relationship between the global score
//! and the sub-scores is checked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::ingestion::analyzer::CandidateProfile;
use crate::ingestion::job_requirements::{JobRequirements, RequirementsError};
use crate::ingestion::prompts::{SCORING_PROMPT, SCORING_SYSTEM};
use crate::ingestion::schema;
use crate::llm_client::prompts::{ANTI_BIAS_INSTRUCTION, FRENCH_OUTPUT_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::candidate::{CultureFit, Recommendation, Scores};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("response does not match the scoring schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error(transparent)]
    Requirements(#[from] RequirementsError),
}

/// Structured scoring breakdown.
///
/// Defaults: missing scores are 0, missing recommendation is A_VERIFIER,
/// missing culture fit is Moyen, missing lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(default, alias = "score_global", deserialize_with = "schema::score")]
    pub score_total: u8,
    #[serde(default, deserialize_with = "schema::score")]
    pub score_tech: u8,
    #[serde(default, deserialize_with = "schema::score")]
    pub score_experience: u8,
    #[serde(default, deserialize_with = "schema::score")]
    pub score_cloud: u8,
    #[serde(default, deserialize_with = "schema::score")]
    pub score_soft_skills: u8,
    #[serde(default, alias = "explication", deserialize_with = "schema::text")]
    pub explanation: String,
    #[serde(
        default,
        alias = "analyse_comportementale",
        deserialize_with = "schema::text"
    )]
    pub behavioral_analysis: String,
    #[serde(
        default,
        alias = "points_forts_match",
        deserialize_with = "schema::string_list"
    )]
    pub matched_strengths: Vec<String>,
    #[serde(default, deserialize_with = "schema::string_list")]
    pub gaps: Vec<String>,
    #[serde(
        default,
        alias = "soft_skills_detectes",
        deserialize_with = "schema::string_list"
    )]
    pub soft_skills: Vec<String>,
    #[serde(default, alias = "recommandation", deserialize_with = "schema::tag")]
    pub recommendation: Recommendation,
    #[serde(default, deserialize_with = "schema::tag")]
    pub culture_fit: CultureFit,
    #[serde(default, deserialize_with = "schema::string_list")]
    pub flags: Vec<String>,
}

impl ScoreReport {
    pub fn from_raw(raw: &Value) -> Result<Self, ScoringError> {
        Ok(ScoreReport::deserialize(raw)?)
    }

    pub fn scores(&self) -> Scores {
        Scores {
            global: self.score_total,
            tech: self.score_tech,
            experience: self.score_experience,
            cloud: self.score_cloud,
            soft_skills: self.score_soft_skills,
        }
    }
}

#[async_trait]
pub trait CandidateScorer: Send + Sync {
    async fn score(
        &self,
        profile: &CandidateProfile,
        job: &JobRequirements,
    ) -> Result<ScoreReport, ScoringError>;
}

pub struct LlmCandidateScorer(pub LlmClient);

#[async_trait]
impl CandidateScorer for LlmCandidateScorer {
    async fn score(
        &self,
        profile: &CandidateProfile,
        job: &JobRequirements,
    ) -> Result<ScoreReport, ScoringError> {
        let prompt = build_scoring_prompt(profile, job);
        let raw: Value = self.0.request_json(&prompt, SCORING_SYSTEM).await?;
        let report = ScoreReport::from_raw(&raw)?;
        info!(
            "Candidate scored {}/100 ({})",
            report.score_total, report.recommendation
        );
        Ok(report)
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn build_scoring_prompt(profile: &CandidateProfile, job: &JobRequirements) -> String {
    SCORING_PROMPT
        .replace("{anti_bias_instruction}", ANTI_BIAS_INSTRUCTION)
        .replace("{french_instruction}", FRENCH_OUTPUT_INSTRUCTION)
        .replace("{job_title}", &job.title)
        .replace("{required_skills}", &join_or_none(&job.required_skills))
        .replace("{bonus_skills}", &join_or_none(&job.bonus_skills))
        .replace("{min_experience}", &job.min_experience_years.to_string())
        .replace("{cloud_keywords}", &join_or_none(&job.cloud_keywords))
        .replace("{candidate_name}", &profile.name)
        .replace("{candidate_skills}", &join_or_none(&profile.skills))
        .replace("{candidate_experience}", &profile.experience)
        .replace("{candidate_strengths}", &join_or_none(&profile.strengths))
}
