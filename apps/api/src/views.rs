//! Askama page structs. Each one renders a template under `templates/`.

use askama::Template;
use axum::response::Html;

use crate::errors::AppError;
use crate::import::{ImportPolicy, ImportSummary};
use crate::models::candidate::Candidate;

/// Which listing the index page is showing, for the heading and nav state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingKind {
    All { recent_first: bool },
    Search { query: String },
    Shortlist,
}

/// Candidate listing with the upload form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub listing: ListingKind,
    pub candidates: Vec<Candidate>,
}

impl IndexPage {
    pub fn heading(&self) -> String {
        match &self.listing {
            ListingKind::All { recent_first: false } => "Candidates by score".to_string(),
            ListingKind::All { recent_first: true } => "Most recent candidates".to_string(),
            ListingKind::Search { query } => format!("Results for \"{query}\""),
            ListingKind::Shortlist => "Shortlist".to_string(),
        }
    }

    pub fn query(&self) -> &str {
        match &self.listing {
            ListingKind::Search { query } => query,
            _ => "",
        }
    }
}

#[derive(Template)]
#[template(path = "candidate.html")]
pub struct DetailPage {
    pub candidate: Candidate,
    pub raw_profile: String,
}

impl DetailPage {
    pub fn new(candidate: Candidate) -> Self {
        let raw_profile = candidate
            .raw_profile
            .as_ref()
            .and_then(|raw| serde_json::to_string_pretty(raw).ok())
            .unwrap_or_default();
        Self {
            candidate,
            raw_profile,
        }
    }
}

#[derive(Template)]
#[template(path = "import.html")]
pub struct ImportPage {
    pub policy: ImportPolicy,
}

#[derive(Template)]
#[template(path = "import_result.html")]
pub struct ImportResultPage {
    pub summary: ImportSummary,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub status: u16,
    pub code: &'a str,
    pub message: &'a str,
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}
