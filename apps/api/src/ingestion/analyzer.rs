//! AI Analyzer — structured candidate profile extraction from CV text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::ingestion::prompts::{CV_ANALYSIS_PROMPT, CV_ANALYSIS_SYSTEM};
use crate::ingestion::schema;
use crate::llm_client::prompts::FRENCH_OUTPUT_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};

/// CV text beyond this many characters is not sent to the model.
const MAX_CV_CHARS: usize = 60_000;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("response does not match the profile schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("no email address found in the CV")]
    MissingEmail,
}

/// Candidate profile as extracted from a CV. French keys from earlier prompt
/// versions are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, alias = "nom", deserialize_with = "schema::text")]
    pub name: String,
    #[serde(default, deserialize_with = "schema::text")]
    pub email: String,
    #[serde(default, alias = "competences", deserialize_with = "schema::string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "schema::text")]
    pub experience: String,
    #[serde(default, alias = "points_forts", deserialize_with = "schema::string_list")]
    pub strengths: Vec<String>,
}

/// Validated profile plus the untouched model payload, kept as a backup on the record.
#[derive(Debug, Clone)]
pub struct AnalyzedCv {
    pub profile: CandidateProfile,
    pub raw: Value,
}

impl AnalyzedCv {
    /// Validates a raw model payload against the profile schema.
    pub fn from_raw(raw: Value) -> Result<Self, AnalysisError> {
        let profile = CandidateProfile::deserialize(&raw)?;
        Ok(Self { profile, raw })
    }
}

#[async_trait]
pub trait CvAnalyzer: Send + Sync {
    async fn analyze(&self, cv_text: &str) -> Result<AnalyzedCv, AnalysisError>;
}

pub struct LlmCvAnalyzer(pub LlmClient);

#[async_trait]
impl CvAnalyzer for LlmCvAnalyzer {
    async fn analyze(&self, cv_text: &str) -> Result<AnalyzedCv, AnalysisError> {
        let prompt = build_analysis_prompt(cv_text);
        let raw: Value = self.0.request_json(&prompt, CV_ANALYSIS_SYSTEM).await?;
        let analyzed = AnalyzedCv::from_raw(raw)?;
        info!(
            "CV analyzed: {} skills extracted",
            analyzed.profile.skills.len()
        );
        Ok(analyzed)
    }
}

fn build_analysis_prompt(cv_text: &str) -> String {
    let cv_text = truncate_chars(cv_text, MAX_CV_CHARS);
    CV_ANALYSIS_PROMPT
        .replace("{french_instruction}", FRENCH_OUTPUT_INSTRUCTION)
        .replace("{cv_text}", cv_text)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            warn!("CV text truncated to {max_chars} characters");
            &text[..byte_index]
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_reads_english_keys() {
        let raw = json!({
            "name": "Ada Lovelace",
            "email": "ada@x.com",
            "skills": ["Python", "Airflow"],
            "experience": "5 ans en data engineering",
            "strengths": ["Rigueur"]
        });
        let analyzed = AnalyzedCv::from_raw(raw.clone()).unwrap();
        assert_eq!(analyzed.profile.name, "Ada Lovelace");
        assert_eq!(analyzed.profile.skills, vec!["Python", "Airflow"]);
        assert_eq!(analyzed.raw, raw);
    }

    #[test]
    fn test_from_raw_accepts_french_aliases() {
        let raw = json!({
            "nom": "Ada Lovelace",
            "email": "ada@x.com",
            "competences": ["SQL"],
            "points_forts": ["Autonomie"],
            "score_data": 0
        });
        let profile = AnalyzedCv::from_raw(raw).unwrap().profile;
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.skills, vec!["SQL"]);
        assert_eq!(profile.strengths, vec!["Autonomie"]);
        assert_eq!(profile.experience, "");
    }

    #[test]
    fn test_from_raw_rejects_non_object() {
        let err = AnalyzedCv::from_raw(json!(["not", "a", "profile"])).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[test]
    fn test_prompt_embeds_cv_text() {
        let prompt = build_analysis_prompt("Jane Doe — Data Engineer");
        assert!(prompt.contains("Jane Doe — Data Engineer"));
        assert!(!prompt.contains("{cv_text}"));
        assert!(!prompt.contains("{french_instruction}"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("éééé", 2), "éé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
