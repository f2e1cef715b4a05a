//! Job Requirements source — the reference job offer candidates are scored against.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequirementsError {
    #[error("cannot read job description {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid job description {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Structured job offer. The French keys of the legacy `job_description.json`
/// are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default, alias = "titre")]
    pub title: String,
    #[serde(default, alias = "skills_requises")]
    pub required_skills: Vec<String>,
    #[serde(default, alias = "skills_bonus")]
    pub bonus_skills: Vec<String>,
    #[serde(default, alias = "experience_min")]
    pub min_experience_years: u32,
    #[serde(default, alias = "mots_cles_cloud")]
    pub cloud_keywords: Vec<String>,
}

#[async_trait]
pub trait JobRequirementsSource: Send + Sync {
    async fn load(&self) -> Result<JobRequirements, RequirementsError>;
}

/// Reads the JSON document from disk on every call, so edits apply to the next upload.
pub struct FileJobRequirements {
    pub path: PathBuf,
}

#[async_trait]
impl JobRequirementsSource for FileJobRequirements {
    async fn load(&self) -> Result<JobRequirements, RequirementsError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| RequirementsError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        serde_json::from_str(&content).map_err(|source| RequirementsError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_legacy_french_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_description.json");
        std::fs::write(
            &path,
            r#"{
                "titre": "Data Engineer",
                "skills_requises": ["Python", "SQL"],
                "skills_bonus": ["Kafka"],
                "experience_min": 3,
                "mots_cles_cloud": ["AWS", "Docker"]
            }"#,
        )
        .unwrap();

        let job = FileJobRequirements { path }.load().await.unwrap();
        assert_eq!(job.title, "Data Engineer");
        assert_eq!(job.required_skills, vec!["Python", "SQL"]);
        assert_eq!(job.bonus_skills, vec!["Kafka"]);
        assert_eq!(job.min_experience_years, 3);
        assert_eq!(job.cloud_keywords, vec!["AWS", "Docker"]);
    }

    #[tokio::test]
    async fn test_english_keys_and_missing_bonus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"title": "ML Engineer", "required_skills": ["PyTorch"], "min_experience_years": 2}"#,
        )
        .unwrap();

        let job = FileJobRequirements { path }.load().await.unwrap();
        assert_eq!(job.title, "ML Engineer");
        assert!(job.bonus_skills.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileJobRequirements {
            path: PathBuf::from("/definitely/not/here.json"),
        };
        assert!(matches!(
            source.load().await,
            Err(RequirementsError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileJobRequirements { path }.load().await,
            Err(RequirementsError::Parse { .. })
        ));
    }
}
