//! JSON views over review rows. All field values are resolved first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::models::description::{Category, DescriptionField};
use crate::models::profile::ReviewProfile;

/// Which review screen a listing is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Internal description only.
    Overview,
    /// Internal description plus the internal approval flag.
    Internal,
    /// All fields, recruiter reviewer and both approval flags.
    External,
}

/// Resolved fields keyed by their wire key.
fn description(profile: &ReviewProfile, fields: impl Iterator<Item = DescriptionField>) -> Value {
    let map: Map<String, Value> = fields
        .map(|field| (field.key().to_string(), json!(profile.effective(field))))
        .collect();
    Value::Object(map)
}

pub fn listing_entry(profile: &ReviewProfile, listing: Listing) -> Value {
    let mut entry = json!({
        "primaryReviewer": profile.primary_reviewer,
        "hrReviewer": profile.hr_reviewer,
        "hiringManager": profile.hiring_manager,
        "vertical": profile.vertical,
        "division": profile.division,
        "subdivision": profile.subdivision,
    });

    let extra = match listing {
        Listing::Overview => json!({
            "description": description(profile, DescriptionField::internal()),
        }),
        Listing::Internal => json!({
            "description": description(profile, DescriptionField::internal()),
            "approved_internal": profile.approved_internal,
        }),
        Listing::External => json!({
            "recruiterReviewer": profile.recruiter_reviewer,
            "description": description(profile, DescriptionField::ALL.into_iter()),
            "approved_internal": profile.approved_internal,
            "approved_external": profile.approved_external,
        }),
    };

    if let (Some(entry), Value::Object(extra)) = (entry.as_object_mut(), extra) {
        entry.extend(extra);
    }
    entry
}

/// Listing keyed by `job_profile`.
pub fn listing(profiles: &[ReviewProfile], listing: Listing) -> Map<String, Value> {
    profiles
        .iter()
        .map(|p| (p.job_profile.clone(), listing_entry(p, listing)))
        .collect()
}

/// Identity columns plus every resolved field, keyed by storage column name.
pub fn detail(profile: &ReviewProfile) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), json!(profile.id));
    map.insert("job_profile".into(), json!(profile.job_profile));
    map.insert("job_code".into(), json!(profile.job_code));
    map.insert("job_category".into(), json!(profile.job_category));
    map.insert("job_profile_name".into(), json!(profile.job_profile_name));
    map.insert("vertical".into(), json!(profile.vertical));
    map.insert("division".into(), json!(profile.division));
    map.insert("subdivision".into(), json!(profile.subdivision));
    map.insert("primary_reviewer".into(), json!(profile.primary_reviewer));
    map.insert("hr_reviewer".into(), json!(profile.hr_reviewer));
    map.insert("hiring_manager".into(), json!(profile.hiring_manager));
    for field in DescriptionField::ALL {
        map.insert(field.column().to_string(), json!(profile.effective(field)));
    }
    Value::Object(map)
}

/// Where one category of a profile sits in the review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalStatus {
    NotGenerated,
    Generated,
    Approved,
}

pub fn approval_status(profile: &ReviewProfile, category: Category) -> ApprovalStatus {
    let approved = match category {
        Category::Internal => profile.approved_internal,
        Category::External => profile.approved_external,
    };
    if approved == Some(true) {
        return ApprovalStatus::Approved;
    }

    let has_text = DescriptionField::ALL
        .into_iter()
        .filter(|f| f.category() == category)
        .any(|f| profile.effective(f).is_some_and(|v| !v.trim().is_empty()));

    if has_text {
        ApprovalStatus::Generated
    } else {
        ApprovalStatus::NotGenerated
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalSummary {
    pub id: i32,
    pub job_profile: String,
    pub job_profile_name: Option<String>,
    pub approval_internal: Option<bool>,
    pub approval_internal_time: Option<DateTime<Utc>>,
    pub approval_external: Option<bool>,
    pub approval_external_time: Option<DateTime<Utc>>,
    pub primary_reviewer: Option<String>,
    pub hr_reviewer: Option<String>,
    pub hiring_manager: Option<String>,
    pub recruiter_reviewer: Option<String>,
    pub internal_status: ApprovalStatus,
    pub external_status: ApprovalStatus,
}

impl From<&ReviewProfile> for ApprovalSummary {
    fn from(p: &ReviewProfile) -> Self {
        Self {
            id: p.id,
            job_profile: p.job_profile.clone(),
            job_profile_name: p.job_profile_name.clone(),
            approval_internal: p.approved_internal,
            approval_internal_time: p.approved_internal_time,
            approval_external: p.approved_external,
            approval_external_time: p.approved_external_time,
            primary_reviewer: p.primary_reviewer.clone(),
            hr_reviewer: p.hr_reviewer.clone(),
            hiring_manager: p.hiring_manager.clone(),
            recruiter_reviewer: p.recruiter_reviewer.clone(),
            internal_status: approval_status(p, Category::Internal),
            external_status: approval_status(p, Category::External),
        }
    }
}
