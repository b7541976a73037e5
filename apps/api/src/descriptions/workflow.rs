//! Description lifecycle: lazy generation, saves, and token-based approval.
//!
//! Viewing never writes a description. Only explicit saves and approvals do,
//! and both go through the transactional replace in `store`.

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::descriptions::store::{self, ApprovalStamp};
use crate::errors::AppError;
use crate::export::{write_job_profile_xml, ExportReferences};
use crate::generation::generator::generate_description;
use crate::llm_client::TextCompleter;
use crate::models::description::DescriptionPayload;
use crate::models::profile::JobProfileRow;

pub const PROFILE_NOT_FOUND: &str = "Job profile not found.";

/// Settings the approval lifecycle needs from config.
#[derive(Debug, Clone)]
pub struct ApprovalSettings {
    pub pending_ttl: Duration,
    pub approval_base_url: String,
    pub export_dir: std::path::PathBuf,
    pub export_refs: ExportReferences,
}

impl ApprovalSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pending_ttl: Duration::days(config.pending_token_ttl_days),
            approval_base_url: config.approval_base_url.clone(),
            export_dir: config.export_dir.clone(),
            export_refs: ExportReferences {
                management_level_id: config.management_level_id.clone(),
                job_family_id: config.job_family_id.clone(),
            },
        }
    }
}

/// Reads a required, non-blank string key from a JSON body.
pub fn require_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parses the description part of a request body. Both sections are mandatory.
pub fn parse_payload(body: &Value) -> Result<DescriptionPayload, AppError> {
    if !body.get("internal").is_some_and(Value::is_object)
        || !body.get("external").is_some_and(Value::is_object)
    {
        return Err(AppError::Validation(
            "internal and external descriptions are required".to_string(),
        ));
    }
    serde_json::from_value(body.clone())
        .map_err(|e| AppError::Validation(format!("Invalid description payload: {e}")))
}

/// Stored description if there is one, otherwise a fresh (unsaved) draft.
pub async fn load_or_generate(
    pool: &PgPool,
    llm: &dyn TextCompleter,
    profile: &JobProfileRow,
) -> Result<DescriptionPayload, AppError> {
    match store::find_description(pool, profile.id).await? {
        Some(stored) => Ok(stored.payload),
        None => {
            info!("No stored description for profile {}, generating", profile.id);
            Ok(generate_description(llm, &profile.title, None).await)
        }
    }
}

/// Finds the profile by title (creating it when unseen), then loads or drafts.
pub async fn generate_or_fetch(
    pool: &PgPool,
    llm: &dyn TextCompleter,
    profile_name: &str,
) -> Result<DescriptionPayload, AppError> {
    let profile = match store::find_profile_by_title(pool, profile_name).await? {
        Some(profile) => profile,
        None => store::create_profile(pool, profile_name).await?,
    };
    load_or_generate(pool, llm, &profile).await
}

pub async fn save_by_title(
    pool: &PgPool,
    profile_name: &str,
    payload: &DescriptionPayload,
) -> Result<(), AppError> {
    let profile = store::find_profile_by_title(pool, profile_name)
        .await?
        .ok_or_else(|| AppError::NotFound(PROFILE_NOT_FOUND.to_string()))?;
    store::save_description(pool, profile.id, payload).await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Token approval
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTicket {
    pub token: String,
    pub approval_link: String,
}

/// Stores the full body under a fresh single-use token.
pub async fn send_for_approval(
    pool: &PgPool,
    settings: &ApprovalSettings,
    body: &Value,
) -> Result<PendingTicket, AppError> {
    let (Some(profile_name), Some(recipient)) = (
        require_str(body, "profileName"),
        require_str(body, "recipientEmail"),
    ) else {
        return Err(AppError::Validation(
            "profileName and recipientEmail are required".to_string(),
        ));
    };
    parse_payload(body)?;

    let purged = store::purge_expired_pending(pool, settings.pending_ttl).await?;
    if purged > 0 {
        info!("Purged {purged} expired pending approvals");
    }

    let token = Uuid::new_v4().to_string();
    store::create_pending(pool, &token, profile_name, body).await?;

    let approval_link = format!(
        "{}/{}",
        settings.approval_base_url.trim_end_matches('/'),
        token
    );
    info!("Approval requested for '{profile_name}' from {recipient}: {approval_link}");

    Ok(PendingTicket {
        token,
        approval_link,
    })
}

pub async fn pending_payload(
    pool: &PgPool,
    settings: &ApprovalSettings,
    token: &str,
) -> Result<Value, AppError> {
    store::find_pending(pool, token, settings.pending_ttl)
        .await?
        .map(|row| row.payload)
        .ok_or_else(|| AppError::NotFound("Invalid or expired token.".to_string()))
}

#[derive(Debug, Clone)]
pub struct ApprovedDescription {
    pub profile_name: String,
    pub export_path: Option<std::path::PathBuf>,
}

/// Promotes a pending payload to the profile's description and burns the token.
///
/// Lock, replace and delete share one transaction; a second redemption of the
/// same token finds nothing and fails with `NotFound`.
pub async fn approve_by_token(
    pool: &PgPool,
    settings: &ApprovalSettings,
    token: &str,
) -> Result<ApprovedDescription, AppError> {
    let mut tx = pool.begin().await?;

    let pending = store::lock_pending(&mut *tx, token, settings.pending_ttl)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid or expired approval link.".to_string()))?;

    let profile = store::find_profile_by_title(&mut *tx, &pending.profile_name)
        .await?
        .ok_or_else(|| AppError::NotFound(PROFILE_NOT_FOUND.to_string()))?;

    let payload = parse_payload(&pending.payload)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored pending payload is invalid: {e}")))?;

    let stamp = ApprovalStamp {
        approved_at: Utc::now(),
        approved_by: require_str(&pending.payload, "recipientEmail").map(str::to_string),
    };

    store::replace_description(&mut *tx, profile.id, &payload, Some(&stamp)).await?;
    store::delete_pending(&mut *tx, pending.id).await?;
    tx.commit().await?;

    info!(
        "Description for '{}' approved via token",
        pending.profile_name
    );

    let export_path = match write_job_profile_xml(
        &settings.export_dir,
        &pending.profile_name,
        &payload,
        &settings.export_refs,
    )
    .await
    {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Export for '{}' failed: {e:?}", pending.profile_name);
            None
        }
    };

    Ok(ApprovedDescription {
        profile_name: pending.profile_name,
        export_path,
    })
}
