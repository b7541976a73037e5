//! Reviewer name registry.
//!
//! Dropdown lists are the union of names already assigned on review profiles
//! and names added through the admin screen.

pub mod handlers;

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::PgPool;

use crate::models::profile::ReviewerRow;

/// The column a registry entry fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewerType {
    Primary,
    Hr,
    Manager,
}

impl ReviewerType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "primary" => Some(Self::Primary),
            "hr" => Some(Self::Hr),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Primary => "primary_reviewer",
            Self::Hr => "hr_reviewer",
            Self::Manager => "hiring_manager",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Hr => "Hr",
            Self::Manager => "Manager",
        }
    }
}

/// Sorted, de-duplicated, non-blank names from every source.
pub fn merge_names<'a>(sources: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    sources
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerLists {
    pub primary_reviewers: Vec<String>,
    pub hr_reviewers: Vec<String>,
    pub managers: Vec<String>,
}

impl ReviewerLists {
    pub fn from_rows(rows: &[ReviewerRow]) -> Self {
        Self {
            primary_reviewers: merge_names(rows.iter().map(|r| r.primary_reviewer.as_deref())),
            hr_reviewers: merge_names(rows.iter().map(|r| r.hr_reviewer.as_deref())),
            managers: merge_names(rows.iter().map(|r| r.hiring_manager.as_deref())),
        }
    }
}

/// Reviewer columns from both review profiles and the registry.
pub async fn all_reviewer_rows(pool: &PgPool) -> Result<Vec<ReviewerRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewerRow>(
        r#"
        SELECT id, primary_reviewer, hr_reviewer, hiring_manager FROM review_job_profiles
        UNION ALL
        SELECT id, primary_reviewer, hr_reviewer, hiring_manager FROM reviewers_list
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn add_reviewer(
    pool: &PgPool,
    name: &str,
    kind: ReviewerType,
) -> Result<ReviewerRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO reviewers_list ({}) VALUES ($1) RETURNING *",
        kind.column()
    );
    sqlx::query_as::<_, ReviewerRow>(&sql)
        .bind(name)
        .fetch_one(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(primary: Option<&str>, hr: Option<&str>, manager: Option<&str>) -> ReviewerRow {
        ReviewerRow {
            id: 0,
            primary_reviewer: primary.map(str::to_string),
            hr_reviewer: hr.map(str::to_string),
            hiring_manager: manager.map(str::to_string),
        }
    }

    #[test]
    fn test_merge_sorts_and_dedupes() {
        let names = merge_names([Some("Zoe"), None, Some("Ana"), Some("Zoe"), Some("  ")]);
        assert_eq!(names, vec!["Ana", "Zoe"]);
    }

    #[test]
    fn test_lists_union_profiles_and_registry() {
        let rows = [
            row(Some("Ana"), Some("Ben"), None),
            row(Some("Ana"), None, Some("Cy")),
            row(None, Some("Abe"), None),
        ];
        let lists = ReviewerLists::from_rows(&rows);
        assert_eq!(lists.primary_reviewers, vec!["Ana"]);
        assert_eq!(lists.hr_reviewers, vec!["Abe", "Ben"]);
        assert_eq!(lists.managers, vec!["Cy"]);
    }

    #[test]
    fn test_reviewer_type_parsing() {
        assert_eq!(ReviewerType::parse("hr"), Some(ReviewerType::Hr));
        assert_eq!(ReviewerType::parse("HR"), None);
        assert_eq!(ReviewerType::parse("recruiter"), None);
        assert_eq!(ReviewerType::Manager.title(), "Manager");
    }
}
