//! Axum route handlers for the description and approval-token API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::descriptions::store;
use crate::descriptions::workflow::{
    self, parse_payload, require_str, ApprovalSettings, PendingTicket, PROFILE_NOT_FOUND,
};
use crate::errors::AppError;
use crate::models::description::DescriptionPayload;
use crate::models::profile::ProfileSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendLinkResponse {
    pub message: String,
    #[serde(flatten)]
    pub ticket: PendingTicket,
}

/// GET /api/job-profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileSummary>>, AppError> {
    Ok(Json(store::list_profiles(&state.db).await?))
}

/// GET /api/job-description/:id
///
/// Returns the stored description, or drafts one without saving it.
pub async fn handle_get_description(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DescriptionPayload>, AppError> {
    let Path(id) = path?;
    let profile = store::find_profile(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(PROFILE_NOT_FOUND.to_string()))?;

    let payload = workflow::load_or_generate(&state.db, state.llm.as_ref(), &profile).await?;
    Ok(Json(payload))
}

/// POST /api/job-description/:id
pub async fn handle_save_description(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path?;
    let Json(body) = body?;
    let payload = parse_payload(&body)?;

    store::find_profile(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(PROFILE_NOT_FOUND.to_string()))?;

    store::save_description(&state.db, id, &payload).await?;
    Ok(MessageResponse::new("Job description saved successfully."))
}

/// POST /api/generate-job-description
///
/// Body: `{profileName}`. Unknown titles get a new profile first.
pub async fn handle_generate_or_fetch(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DescriptionPayload>, AppError> {
    let Json(body) = body?;
    let profile_name = require_str(&body, "profileName")
        .ok_or_else(|| AppError::Validation("profileName is required".to_string()))?;

    let payload = workflow::generate_or_fetch(&state.db, state.llm.as_ref(), profile_name).await?;
    Ok(Json(payload))
}

/// POST /api/job-description/by-title
pub async fn handle_save_by_title(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = body?;
    let profile_name = require_str(&body, "profileName")
        .ok_or_else(|| AppError::Validation("profileName is required".to_string()))?;
    let payload = parse_payload(&body)?;

    workflow::save_by_title(&state.db, profile_name, &payload).await?;
    Ok(MessageResponse::new("Job description saved successfully."))
}

/// POST /api/job-description/send-link
pub async fn handle_send_link(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SendLinkResponse>, AppError> {
    let Json(body) = body?;
    let settings = ApprovalSettings::from_config(&state.config);

    let ticket = workflow::send_for_approval(&state.db, &settings, &body).await?;
    Ok(Json(SendLinkResponse {
        message: "Approval link sent successfully.".to_string(),
        ticket,
    }))
}

/// GET /api/job-description/pending/:token
pub async fn handle_get_pending(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    let settings = ApprovalSettings::from_config(&state.config);
    Ok(Json(
        workflow::pending_payload(&state.db, &settings, &token).await?,
    ))
}

/// POST /api/job-description/approve/:token
///
/// The token is the approver's credential, so this route sits outside auth.
pub async fn handle_approve_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    let settings = ApprovalSettings::from_config(&state.config);
    let approved = workflow::approve_by_token(&state.db, &settings, &token).await?;

    Ok(Json(json!({
        "message": "Job description approved and saved successfully.",
        "profileName": approved.profile_name,
        "exported": approved.export_path.is_some(),
    })))
}
