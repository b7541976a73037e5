//! Axum route handlers for the review screens.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::description::DescriptionField;
use crate::review::store::{self, ReviewUpdate};
use crate::review::views::{self, ApprovalSummary, Listing};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub updated_data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterReviewRequest {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub updated_recruiter_description: Option<Map<String, Value>>,
}

/// Both parts are required and neither may be empty.
fn require_parts(
    profile: Option<String>,
    data: Option<Map<String, Value>>,
) -> Result<(String, Map<String, Value>), AppError> {
    match (profile, data) {
        (Some(p), Some(d)) if !p.trim().is_empty() && !d.is_empty() => Ok((p, d)),
        _ => Err(AppError::Validation(
            "Profile name and updated data are required".to_string(),
        )),
    }
}

async fn apply(state: &AppState, profile: &str, update: ReviewUpdate) -> Result<Json<Value>, AppError> {
    if !store::apply_update(&state.db, profile, &update).await? {
        return Err(AppError::NotFound("Job profile not found".to_string()));
    }
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

// ────────────────────────────────────────────────────────────────────────────
// Listings
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/all-job-profiles
pub async fn handle_all_profiles(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let profiles = store::list_profiles(&state.db).await?;
    Ok(Json(views::listing(&profiles, Listing::Overview)))
}

/// GET /api/internal/all-job-profiles
pub async fn handle_internal_profiles(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let profiles = store::list_profiles(&state.db).await?;
    Ok(Json(views::listing(&profiles, Listing::Internal)))
}

/// GET /api/external/all-job-profiles
pub async fn handle_external_profiles(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let profiles = store::list_profiles(&state.db).await?;
    Ok(Json(views::listing(&profiles, Listing::External)))
}

/// GET /api/job-profile/:name
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let profile = store::find_profile(&state.db, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Job Profile not found".to_string()))?;
    Ok(Json(views::detail(&profile)))
}

/// GET /api/job-profile-approvals
pub async fn handle_approvals(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApprovalSummary>>, AppError> {
    let profiles = store::list_profiles(&state.db).await?;
    Ok(Json(profiles.iter().map(ApprovalSummary::from).collect()))
}

// ────────────────────────────────────────────────────────────────────────────
// Save / approve
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/internal-review/save
pub async fn handle_internal_save(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (profile, data) = require_parts(request.profile, request.updated_data)?;

    let update = ReviewUpdate::new().saved_fields(DescriptionField::internal(), &data);
    apply(&state, &profile, update).await
}

/// POST /api/internal-review/approve
///
/// `updatedData.approved_internal` defaults to true when absent.
pub async fn handle_internal_approve(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (profile, data) = require_parts(request.profile, request.updated_data)?;
    let approved = data
        .get("approved_internal")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let update = ReviewUpdate::new()
        .saved_fields(DescriptionField::internal(), &data)
        .approve_internal(approved, Utc::now());
    let response = apply(&state, &profile, update).await?;

    info!("Internal review for '{profile}' approved={approved}");
    Ok(response)
}

/// POST /api/external-review/save
pub async fn handle_external_save(
    State(state): State<AppState>,
    body: Result<Json<RecruiterReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (profile, data) =
        require_parts(request.profile, request.updated_recruiter_description)?;

    let update = ReviewUpdate::new().saved_fields(DescriptionField::external(), &data);
    apply(&state, &profile, update).await
}

/// POST /api/external-review/approve
pub async fn handle_external_approve(
    State(state): State<AppState>,
    body: Result<Json<RecruiterReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (profile, data) =
        require_parts(request.profile, request.updated_recruiter_description)?;
    let approved = data
        .get("approved_external")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let update = ReviewUpdate::new()
        .saved_fields(DescriptionField::external(), &data)
        .approve_external(approved, Utc::now());
    let response = apply(&state, &profile, update).await?;

    info!("External review for '{profile}' approved={approved}");
    Ok(response)
}

/// POST /api/admin-review/update
pub async fn handle_admin_update(
    State(state): State<AppState>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    let (profile, data) = require_parts(request.profile, request.updated_data)?;

    let update = ReviewUpdate::new()
        .admin_details(&data)
        .saved_fields(DescriptionField::internal(), &data);
    apply(&state, &profile, update).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_parts_rejects_empty_data() {
        let err = require_parts(Some("Buyer".into()), Some(Map::new())).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_require_parts_rejects_blank_profile() {
        let mut data = Map::new();
        data.insert("purpose".into(), json!("x"));
        assert!(require_parts(Some("  ".into()), Some(data.clone())).is_err());
        assert!(require_parts(None, Some(data)).is_err());
    }

    #[test]
    fn test_request_uses_front_end_key_names() {
        let request: RecruiterReviewRequest = serde_json::from_value(json!({
            "profile": "Buyer",
            "updatedRecruiterDescription": { "whatYoullDo": "Lead" }
        }))
        .unwrap();
        assert_eq!(request.profile.as_deref(), Some("Buyer"));
        assert!(request.updated_recruiter_description.unwrap().contains_key("whatYoullDo"));
    }
}
