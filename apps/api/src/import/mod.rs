//! Bulk Importer — reconciles a recruiter's CSV export with the candidate store.
//!
//! Unknown emails become placeholder records awaiting a CV; known emails only get
//! their empty skill list filled and their experience text refreshed when the row
//! names a position. Scoring fields are never touched.

pub mod handlers;

use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{info, warn};

use crate::candidates::store::{self, ImportMerge, NewPlaceholder, StoreError};
use crate::models::candidate::{Candidate, UnknownTag};

/// What to do when a single row cannot be imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Roll back the failing row only and keep going.
    #[default]
    BestEffort,
    /// Roll back the whole import on the first failing row.
    AllOrNothing,
}

impl FromStr for ImportPolicy {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(ImportPolicy::BestEffort),
            "all_or_nothing" => Ok(ImportPolicy::AllOrNothing),
            _ => Err(UnknownTag {
                kind: "import policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImportPolicy::BestEffort => "best_effort",
            ImportPolicy::AllOrNothing => "all_or_nothing",
        })
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("the CSV header has no Email column (found: {found})")]
    MissingEmailColumn { found: String },

    #[error("line {line} could not be imported, nothing was saved: {message}")]
    RowFailed { line: u64, message: String },

    #[error("could not save the import: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: Vec<RowFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Added,
    Updated,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Position,
    Skills,
    Experience,
    Source,
}

/// Maps a header cell to the field it feeds, ignoring case and accents on `é`.
fn field_for(header: &str) -> Option<Field> {
    let key = header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .replace('é', "e");
    match key.as_str() {
        "nom" | "name" => Some(Field::Name),
        "email" | "e-mail" => Some(Field::Email),
        "poste" | "position" => Some(Field::Position),
        "skills" | "competences" => Some(Field::Skills),
        "experience" => Some(Field::Experience),
        "source" => Some(Field::Source),
        _ => None,
    }
}

/// Column index of each recognized field. The first matching column wins.
#[derive(Debug)]
struct Columns {
    headers: Vec<String>,
    name: Option<usize>,
    email: usize,
    position: Option<usize>,
    skills: Option<usize>,
    experience: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let mut found: [Option<usize>; 6] = [None; 6];
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = field_for(header) {
                found[field as usize].get_or_insert(index);
            }
        }

        let email = found[Field::Email as usize].ok_or_else(|| ImportError::MissingEmailColumn {
            found: headers.iter().collect::<Vec<_>>().join(", "),
        })?;

        Ok(Columns {
            headers: headers.iter().map(str::to_string).collect(),
            name: found[Field::Name as usize],
            email,
            position: found[Field::Position as usize],
            skills: found[Field::Skills as usize],
            experience: found[Field::Experience as usize],
        })
    }

    fn row(&self, record: &StringRecord) -> CsvRow {
        let cell = |index: Option<usize>| -> String {
            index
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        // Keeps every column, Source included, as the placeholder's raw payload.
        let source_row: Map<String, Value> = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
            .collect();

        CsvRow {
            name: cell(self.name),
            email: cell(Some(self.email)),
            position: cell(self.position),
            skills: tokenize_skills(&cell(self.skills)),
            experience: cell(self.experience),
            source_row: Value::Object(source_row),
        }
    }
}

#[derive(Debug, Clone)]
struct CsvRow {
    name: String,
    email: String,
    position: String,
    skills: Vec<String>,
    experience: String,
    source_row: Value,
}

impl CsvRow {
    fn placeholder(&self) -> NewPlaceholder {
        let experience = if self.position.is_empty() {
            self.experience.clone()
        } else {
            compose_experience(&self.position, &self.experience)
        };
        NewPlaceholder {
            name: self.name.clone(),
            email: self.email.clone(),
            skills: self.skills.clone(),
            experience,
            source_row: self.source_row.clone(),
        }
    }
}

/// Splits on commas and semicolons, trims, drops empty tokens, keeps order.
pub fn tokenize_skills(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn compose_experience(position: &str, experience: &str) -> String {
    if experience.is_empty() {
        position.to_string()
    } else {
        format!("{position} | {experience}")
    }
}

/// Non-destructive merge: skills only fill an empty list, experience only changes
/// when the row names a position.
fn plan_merge(existing: &Candidate, row: &CsvRow) -> ImportMerge {
    ImportMerge {
        skills: (existing.skills.is_empty() && !row.skills.is_empty())
            .then(|| row.skills.clone()),
        experience: (!row.position.is_empty())
            .then(|| compose_experience(&row.position, &row.experience)),
    }
}

async fn apply_row(conn: &mut SqliteConnection, row: &CsvRow) -> Result<RowOutcome, StoreError> {
    if row.email.is_empty() {
        return Ok(RowOutcome::Skipped);
    }

    match store::find_by_email(&mut *conn, &row.email).await? {
        Some(existing) => {
            let merge = plan_merge(&existing, row);
            if !merge.is_noop() {
                store::merge_from_import(&mut *conn, existing.id, &merge).await?;
            }
            Ok(RowOutcome::Updated)
        }
        None => {
            store::insert_placeholder(&mut *conn, &row.placeholder()).await?;
            Ok(RowOutcome::Added)
        }
    }
}

/// Imports a CSV payload in a single transaction, one savepoint per row.
pub async fn import_csv(
    pool: &SqlitePool,
    payload: &[u8],
    policy: ImportPolicy,
) -> Result<ImportSummary, ImportError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(payload);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;
    let mut record = StringRecord::new();

    loop {
        let line = reader.position().line();
        let read = match reader.read_record(&mut record) {
            Ok(true) => Ok(columns.row(&record)),
            Ok(false) => break,
            Err(e) => Err(e.to_string()),
        };

        let result = match read {
            Ok(row) => {
                let mut savepoint = Connection::begin(&mut *tx).await?;
                match apply_row(&mut *savepoint, &row).await {
                    Ok(outcome) => {
                        savepoint.commit().await?;
                        Ok(outcome)
                    }
                    Err(e) => {
                        savepoint.rollback().await?;
                        Err(e.to_string())
                    }
                }
            }
            Err(message) => Err(message),
        };

        match result {
            Ok(RowOutcome::Added) => summary.added += 1,
            Ok(RowOutcome::Updated) => summary.updated += 1,
            Ok(RowOutcome::Skipped) => summary.skipped += 1,
            Err(message) => {
                warn!(line, "CSV row rejected: {message}");
                if policy == ImportPolicy::AllOrNothing {
                    return Err(ImportError::RowFailed { line, message });
                }
                summary.failed.push(RowFailure { line, message });
            }
        }
    }

    tx.commit().await?;
    info!(
        "CSV import ({policy}): {} added, {} updated, {} skipped, {} failed",
        summary.added,
        summary.updated,
        summary.skipped,
        summary.failed.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::store::{find_by_email, list_all, ListOrder};
    use crate::db::memory_pool;
    use crate::models::candidate::{Recommendation, AWAITING_CV_FLAG};

    async fn import(pool: &SqlitePool, csv: &str) -> ImportSummary {
        import_csv(pool, csv.as_bytes(), ImportPolicy::BestEffort)
            .await
            .unwrap()
    }

    #[test]
    fn test_tokenize_skills() {
        assert_eq!(
            tokenize_skills(" Python, SQL;;Spark ,"),
            vec!["Python", "SQL", "Spark"]
        );
        assert!(tokenize_skills(" ; , ").is_empty());
    }

    #[test]
    fn test_header_aliases() {
        assert_eq!(field_for("Nom"), Some(Field::Name));
        assert_eq!(field_for("NAME"), Some(Field::Name));
        assert_eq!(field_for("Compétences"), Some(Field::Skills));
        assert_eq!(field_for("Competences"), Some(Field::Skills));
        assert_eq!(field_for("\u{feff}Email"), Some(Field::Email));
        assert_eq!(field_for("Expérience"), Some(Field::Experience));
        assert_eq!(field_for("Téléphone"), None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "all-or-nothing".parse::<ImportPolicy>().unwrap(),
            ImportPolicy::AllOrNothing
        );
        assert_eq!(
            "BEST_EFFORT".parse::<ImportPolicy>().unwrap(),
            ImportPolicy::BestEffort
        );
        assert!("sometimes".parse::<ImportPolicy>().is_err());
    }

    #[tokio::test]
    async fn test_blank_email_is_skipped() {
        let pool = memory_pool().await;
        let summary = import(
            &pool,
            "Nom,Email,Skills\nAda,,Python\nBob,   ,SQL\nCid,c@x.com,Go\n",
        )
        .await;

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.added, 1);
        let all = list_all(&pool, ListOrder::ScoreDesc).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "c@x.com");
    }

    #[tokio::test]
    async fn test_new_email_creates_placeholder() {
        let pool = memory_pool().await;
        let summary = import(
            &pool,
            "Name,Email,Poste,Compétences,Experience,Source\n\
             Ada,a@x.com,Data Engineer,\"Python; SQL\",5 ans,LinkedIn\n",
        )
        .await;
        assert_eq!(summary.added, 1);

        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.skills, vec!["Python", "SQL"]);
        assert_eq!(ada.experience, "Data Engineer | 5 ans");
        assert_eq!(ada.scores.global, 0);
        assert_eq!(ada.recommendation, Recommendation::AVerifier);
        assert_eq!(ada.flags, vec![AWAITING_CV_FLAG]);
        assert!(ada.is_placeholder());
        assert_eq!(
            ada.raw_profile.unwrap()["Source"],
            Value::String("LinkedIn".into())
        );
    }

    #[tokio::test]
    async fn test_existing_skills_are_never_overwritten() {
        let pool = memory_pool().await;
        import(&pool, "Email,Skills\na@x.com,Python\n").await;

        let summary = import(&pool, "Email,Skills\na@x.com,Java\na@x.com,\n").await;
        assert_eq!(summary.updated, 2);

        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.skills, vec!["Python"]);
    }

    #[tokio::test]
    async fn test_empty_skills_are_filled_and_position_refreshes_experience() {
        let pool = memory_pool().await;
        import(&pool, "Email,Experience\na@x.com,3 ans\n").await;

        import(&pool, "Email,Skills\na@x.com,\"Rust, Go\"\n").await;
        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.skills, vec!["Rust", "Go"]);
        assert_eq!(ada.experience, "3 ans");

        import(&pool, "Email,Poste\na@x.com,Lead Dev\n").await;
        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.experience, "Lead Dev");
    }

    #[tokio::test]
    async fn test_update_keeps_scoring_fields() {
        let pool = memory_pool().await;
        import(&pool, "Email\na@x.com\n").await;
        sqlx::query("UPDATE candidates SET score_global = 88, recommendation = 'SHORTLIST'")
            .execute(&pool)
            .await
            .unwrap();

        import(&pool, "Email,Poste,Skills\na@x.com,Architect,AWS\n").await;
        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.scores.global, 88);
        assert_eq!(ada.recommendation, Recommendation::Shortlist);
    }

    #[tokio::test]
    async fn test_missing_email_column_fails_whole_import() {
        let pool = memory_pool().await;
        let err = import_csv(&pool, b"Nom,Skills\nAda,Python\n", ImportPolicy::BestEffort)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingEmailColumn { .. }));
    }

    #[tokio::test]
    async fn test_best_effort_keeps_good_rows_around_a_bad_one() {
        let pool = memory_pool().await;
        let mut payload = b"Email,Nom\na@x.com,Ada\nb@x.com,".to_vec();
        payload.extend_from_slice(&[0xff, 0xfe]);
        payload.extend_from_slice(b"\nc@x.com,Cid\n");

        let summary = import_csv(&pool, &payload, ImportPolicy::BestEffort)
            .await
            .unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].line, 3);
        assert!(find_by_email(&pool, "c@x.com").await.unwrap().is_some());
        assert!(find_by_email(&pool, "b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_all_or_nothing_rolls_back_everything() {
        let pool = memory_pool().await;
        let mut payload = b"Email,Nom\na@x.com,Ada\nb@x.com,".to_vec();
        payload.extend_from_slice(&[0xff, 0xfe]);
        payload.extend_from_slice(b"\n");

        let err = import_csv(&pool, &payload, ImportPolicy::AllOrNothing)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::RowFailed { line: 3, .. }));
        assert!(list_all(&pool, ListOrder::ScoreDesc)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_within_one_file_updates() {
        let pool = memory_pool().await;
        let summary = import(&pool, "Email,Skills\na@x.com,\na@x.com,Python\n").await;
        assert_eq!(summary.added, 1);
        assert_eq!(summary.updated, 1);
        let ada = find_by_email(&pool, "a@x.com").await.unwrap().unwrap();
        assert_eq!(ada.skills, vec!["Python"]);
    }
}
