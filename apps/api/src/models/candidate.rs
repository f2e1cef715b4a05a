use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;

/// Flag attached to records created from a CSV row, before any CV was analyzed.
pub const AWAITING_CV_FLAG: &str = "awaiting CV";

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

/// Hiring disposition produced by the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "SHORTLIST")]
    Shortlist,
    #[default]
    #[serde(rename = "A_VERIFIER")]
    AVerifier,
    #[serde(rename = "NON_RETENU")]
    NonRetenu,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Shortlist => "SHORTLIST",
            Recommendation::AVerifier => "A_VERIFIER",
            Recommendation::NonRetenu => "NON_RETENU",
        }
    }
}

impl FromStr for Recommendation {
    type Err = UnknownTag;

    /// Accepts the canonical tags plus the spellings models tend to produce
    /// ("à vérifier", "non-retenu", "Shortlist").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                'À' => 'A',
                'É' => 'E',
                other => other,
            })
            .collect();
        match normalized.as_str() {
            "SHORTLIST" => Ok(Recommendation::Shortlist),
            "A_VERIFIER" => Ok(Recommendation::AVerifier),
            "NON_RETENU" => Ok(Recommendation::NonRetenu),
            _ => Err(UnknownTag {
                kind: "recommendation",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative soft-skill / organizational alignment rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CultureFit {
    Fort,
    #[default]
    Moyen,
    Faible,
}

impl CultureFit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CultureFit::Fort => "Fort",
            CultureFit::Moyen => "Moyen",
            CultureFit::Faible => "Faible",
        }
    }
}

impl FromStr for CultureFit {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fort" => Ok(CultureFit::Fort),
            "moyen" => Ok(CultureFit::Moyen),
            "faible" => Ok(CultureFit::Faible),
            _ => Err(UnknownTag {
                kind: "culture fit",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CultureFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five independent 0–100 scores. No relationship between them is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub global: u8,
    pub tech: u8,
    pub experience: u8,
    pub cloud: u8,
    pub soft_skills: u8,
}

/// The CV behind an analysis: the client's file name and the name it is stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CvFile {
    pub filename: String,
    pub stored_as: String,
}

/// Every extracted and scoring field written by a CV upload.
/// An upload overwrites all of them at once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateAnalysis {
    pub name: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub strengths: Vec<String>,
    pub raw_profile: Value,
    pub scores: Scores,
    pub explanation: String,
    pub behavioral_analysis: String,
    pub gaps: Vec<String>,
    pub matched_strengths: Vec<String>,
    pub soft_skills: Vec<String>,
    pub recommendation: Recommendation,
    pub culture_fit: CultureFit,
    pub flags: Vec<String>,
}

/// A candidate as presented to the rest of the application.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub filename: Option<String>,
    pub stored_file: Option<String>,
    pub skills: Vec<String>,
    pub experience: String,
    pub strengths: Vec<String>,
    pub raw_profile: Option<Value>,
    pub scores: Scores,
    pub explanation: String,
    pub behavioral_analysis: String,
    pub gaps: Vec<String>,
    pub matched_strengths: Vec<String>,
    pub soft_skills: Vec<String>,
    pub recommendation: Recommendation,
    pub culture_fit: CultureFit,
    pub flags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    /// True for records created by CSV import that never received a CV analysis.
    pub fn is_placeholder(&self) -> bool {
        self.filename.is_none()
    }

    /// Containment test over name, email, experience and each skill. `needle` must
    /// already be lowercased; both sides use full Unicode case folding, so accented
    /// capitals such as `É` match their lowercase form.
    pub fn matches(&self, needle: &str) -> bool {
        let hit = |text: &str| text.to_lowercase().contains(needle);
        hit(&self.name)
            || hit(&self.email)
            || hit(&self.experience)
            || self.skills.iter().any(|skill| hit(skill))
    }
}

/// Raw `candidates` row. JSON list columns may be NULL in rows written by older tooling.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub filename: Option<String>,
    pub stored_file: Option<String>,
    pub skills: Option<Json<Vec<String>>>,
    pub experience: Option<String>,
    pub strengths: Option<Json<Vec<String>>>,
    pub raw_profile: Option<Json<Value>>,
    pub score_global: i64,
    pub score_tech: i64,
    pub score_experience: i64,
    pub score_cloud: i64,
    pub score_soft_skills: i64,
    pub score_explanation: Option<String>,
    pub behavioral_analysis: Option<String>,
    pub gaps: Option<Json<Vec<String>>>,
    pub matched_strengths: Option<Json<Vec<String>>>,
    pub soft_skills: Option<Json<Vec<String>>>,
    pub recommendation: Option<String>,
    pub culture_fit: Option<String>,
    pub flags: Option<Json<Vec<String>>>,
    pub created_at: DateTime<Utc>,
}

fn list(column: Option<Json<Vec<String>>>) -> Vec<String> {
    column.map(|Json(items)| items).unwrap_or_default()
}

fn score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate {
            id: row.id,
            name: row.name.unwrap_or_default(),
            email: row.email,
            filename: row.filename,
            stored_file: row.stored_file,
            skills: list(row.skills),
            experience: row.experience.unwrap_or_default(),
            strengths: list(row.strengths),
            raw_profile: row.raw_profile.map(|Json(v)| v),
            scores: Scores {
                global: score(row.score_global),
                tech: score(row.score_tech),
                experience: score(row.score_experience),
                cloud: score(row.score_cloud),
                soft_skills: score(row.score_soft_skills),
            },
            explanation: row.score_explanation.unwrap_or_default(),
            behavioral_analysis: row.behavioral_analysis.unwrap_or_default(),
            gaps: list(row.gaps),
            matched_strengths: list(row.matched_strengths),
            soft_skills: list(row.soft_skills),
            recommendation: row
                .recommendation
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
            culture_fit: row
                .culture_fit
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
            flags: list(row.flags),
            created_at: row.created_at,
        }
    }
}
