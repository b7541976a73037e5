use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::reviewers::{self, merge_names, ReviewerLists, ReviewerType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddReviewerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// GET /api/reviewers-list
pub async fn handle_reviewers_list(
    State(state): State<AppState>,
) -> Result<Json<ReviewerLists>, AppError> {
    let rows = reviewers::all_reviewer_rows(&state.db).await?;
    Ok(Json(ReviewerLists::from_rows(&rows)))
}

/// GET /api/recuriter_reviewers-list
///
/// Recruiter choices are drawn from the primary-reviewer names.
pub async fn handle_recruiter_list(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let rows = reviewers::all_reviewer_rows(&state.db).await?;
    let names = merge_names(rows.iter().map(|r| r.primary_reviewer.as_deref()));
    Ok(Json(json!({ "recruiterReviewers": names })))
}

/// POST /api/admin-reviewers/add
pub async fn handle_add_reviewer(
    State(state): State<AppState>,
    body: Result<Json<AddReviewerRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (Some(name), Some(kind)) = (
        request.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        request.kind.as_deref().filter(|k| !k.is_empty()),
    ) else {
        return Err(AppError::Validation("Name and type are required".to_string()));
    };
    let kind = ReviewerType::parse(kind)
        .ok_or_else(|| AppError::Validation("Invalid reviewer type".to_string()))?;

    let row = reviewers::add_reviewer(&state.db, name, kind).await?;
    info!("Added {} reviewer '{name}' (id {})", kind.title(), row.id);

    Ok(Json(json!({
        "message": format!("{} reviewer added successfully", kind.title())
    })))
}
