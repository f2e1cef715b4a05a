use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::candidates::store::{self, ListOrder};
use crate::errors::AppError;
use crate::models::candidate::Recommendation;
use crate::state::AppState;
use crate::views::{render, DetailPage, IndexPage, ListingKind};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// GET /
pub async fn handle_index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, AppError> {
    let recent_first = params.sort.as_deref() == Some("recent");
    let order = if recent_first {
        ListOrder::NewestFirst
    } else {
        ListOrder::ScoreDesc
    };
    let candidates = store::list_all(&state.db, order).await?;
    render(&IndexPage {
        listing: ListingKind::All { recent_first },
        candidates,
    })
}

/// GET /search?query=
/// A blank query sends the user back to the full listing.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let candidates = store::search(&state.db, query).await?;
    Ok(render(&IndexPage {
        listing: ListingKind::Search {
            query: query.to_string(),
        },
        candidates,
    })?
    .into_response())
}

/// GET /shortlist
pub async fn handle_shortlist(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let candidates = store::filter_by_recommendation(&state.db, Recommendation::Shortlist).await?;
    render(&IndexPage {
        listing: ListingKind::Shortlist,
        candidates,
    })
}

/// GET /candidat/:id
pub async fn handle_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let candidate = store::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    render(&DetailPage::new(candidate))
}
