use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::models::description::{DescriptionField, DescriptionPayload};

/// A named role that descriptions are generated for.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobProfileRow {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for `GET /api/job-profiles`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfileSummary {
    pub id: i32,
    pub title: String,
    pub approved: bool,
}

/// The persisted description of a profile. Approval columns are surfaced
/// through `ProfileSummary` instead.
#[derive(Debug, Clone)]
pub struct StoredDescription {
    pub payload: DescriptionPayload,
}

impl<'r> FromRow<'r, PgRow> for StoredDescription {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut payload = DescriptionPayload {
            vertical: row.try_get("vertical")?,
            division: row.try_get("division")?,
            subdivision: row.try_get("subdivision")?,
            ..Default::default()
        };
        for field in DescriptionField::ALL {
            payload.set(field, row.try_get(field.column())?);
        }

        Ok(Self { payload })
    }
}

/// A description waiting for sign-off through a single-use token.
#[derive(Debug, Clone, FromRow)]
pub struct PendingRow {
    pub id: i32,
    pub profile_name: String,
    pub payload: Value,
}

/// Wide review row: generated columns, their `saved_` overrides and approvals.
#[derive(Debug, Clone)]
pub struct ReviewProfile {
    pub id: i32,
    pub job_profile: String,
    pub job_code: Option<String>,
    pub job_category: Option<String>,
    pub job_profile_name: Option<String>,
    pub vertical: Option<String>,
    pub division: Option<String>,
    pub subdivision: Option<String>,
    pub primary_reviewer: Option<String>,
    pub hr_reviewer: Option<String>,
    pub hiring_manager: Option<String>,
    pub recruiter_reviewer: Option<String>,
    pub generated: BTreeMap<DescriptionField, Option<String>>,
    pub saved: BTreeMap<DescriptionField, Option<String>>,
    pub approved_internal: Option<bool>,
    pub approved_internal_time: Option<DateTime<Utc>>,
    pub approved_external: Option<bool>,
    pub approved_external_time: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for ReviewProfile {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let mut generated = BTreeMap::new();
        let mut saved = BTreeMap::new();
        for field in DescriptionField::ALL {
            generated.insert(field, row.try_get(field.column())?);
            saved.insert(field, row.try_get(field.saved_column().as_str())?);
        }

        Ok(Self {
            id: row.try_get("id")?,
            job_profile: row.try_get("job_profile")?,
            job_code: row.try_get("job_code")?,
            job_category: row.try_get("job_category")?,
            job_profile_name: row.try_get("job_profile_name")?,
            vertical: row.try_get("vertical")?,
            division: row.try_get("division")?,
            subdivision: row.try_get("subdivision")?,
            primary_reviewer: row.try_get("primary_reviewer")?,
            hr_reviewer: row.try_get("hr_reviewer")?,
            hiring_manager: row.try_get("hiring_manager")?,
            recruiter_reviewer: row.try_get("recruiter_reviewer")?,
            generated,
            saved,
            approved_internal: row.try_get("approved_internal")?,
            approved_internal_time: row.try_get("approved_internal_time")?,
            approved_external: row.try_get("approved_external")?,
            approved_external_time: row.try_get("approved_external_time")?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewerRow {
    pub id: i32,
    pub primary_reviewer: Option<String>,
    pub hr_reviewer: Option<String>,
    pub hiring_manager: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub name: Option<String>,
}
