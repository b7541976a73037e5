//! Queries over the wide review table.
//!
//! Review saves only touch `saved_` overrides, reviewer names, labels and
//! approval flags. The generated columns are never written from here.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::description::DescriptionField;
use crate::models::profile::ReviewProfile;

pub async fn list_profiles(pool: &PgPool) -> Result<Vec<ReviewProfile>, sqlx::Error> {
    sqlx::query_as::<_, ReviewProfile>("SELECT * FROM review_job_profiles ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_profile(
    pool: &PgPool,
    job_profile: &str,
) -> Result<Option<ReviewProfile>, sqlx::Error> {
    sqlx::query_as::<_, ReviewProfile>("SELECT * FROM review_job_profiles WHERE job_profile = $1")
        .bind(job_profile)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnValue {
    Text(Option<String>),
    Flag(bool),
    Time(DateTime<Utc>),
}

/// A set of column assignments applied with one `UPDATE`.
///
/// Column names only ever come from `DescriptionField` or the fixed setters
/// below, never from request data.
#[derive(Debug, Default, Clone)]
pub struct ReviewUpdate {
    assignments: Vec<(String, ColumnValue)>,
}

fn text_of(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

impl ReviewUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `saved_` overrides for `fields`, read from `data` by wire key. A key
    /// missing from `data` clears its override.
    pub fn saved_fields(
        mut self,
        fields: impl Iterator<Item = DescriptionField>,
        data: &Map<String, Value>,
    ) -> Self {
        for field in fields {
            self.assignments.push((
                field.saved_column(),
                ColumnValue::Text(text_of(data, field.key())),
            ));
        }
        self
    }

    /// Reviewer names and vertical labels, as edited on the admin screen.
    pub fn admin_details(mut self, data: &Map<String, Value>) -> Self {
        for (column, key) in [
            ("primary_reviewer", "primaryReviewer"),
            ("hr_reviewer", "hrReviewer"),
            ("hiring_manager", "hiringManager"),
            ("vertical", "vertical"),
            ("division", "division"),
            ("subdivision", "subdivision"),
        ] {
            self.assignments
                .push((column.to_string(), ColumnValue::Text(text_of(data, key))));
        }
        self
    }

    pub fn approve_internal(mut self, approved: bool, at: DateTime<Utc>) -> Self {
        self.assignments.push((
            "approved_internal".to_string(),
            ColumnValue::Flag(approved),
        ));
        self.assignments
            .push(("approved_internal_time".to_string(), ColumnValue::Time(at)));
        self
    }

    pub fn approve_external(mut self, approved: bool, at: DateTime<Utc>) -> Self {
        self.assignments.push((
            "approved_external".to_string(),
            ColumnValue::Flag(approved),
        ));
        self.assignments
            .push(("approved_external_time".to_string(), ColumnValue::Time(at)));
        self
    }

    #[cfg(test)]
    fn columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(c, _)| c.as_str())
    }

    fn query<'a>(&self, job_profile: &'a str) -> QueryBuilder<'a, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE review_job_profiles SET ");
        let mut set = qb.separated(", ");
        for (column, value) in &self.assignments {
            set.push(format!("{column} = "));
            match value {
                ColumnValue::Text(v) => set.push_bind_unseparated(v.clone()),
                ColumnValue::Flag(v) => set.push_bind_unseparated(*v),
                ColumnValue::Time(v) => set.push_bind_unseparated(*v),
            };
        }
        qb.push(" WHERE job_profile = ").push_bind(job_profile);
        qb
    }
}

/// Applies `update` to the row for `job_profile`. `false` when no row matched.
pub async fn apply_update(
    pool: &PgPool,
    job_profile: &str,
    update: &ReviewUpdate,
) -> Result<bool, sqlx::Error> {
    let result = update.query(job_profile).build().execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_internal_save_touches_only_internal_overrides() {
        let update = ReviewUpdate::new().saved_fields(
            DescriptionField::internal(),
            &data(json!({ "purpose": "p", "whatYoullDo": "ignored" })),
        );
        let columns: Vec<&str> = update.columns().collect();

        assert_eq!(columns.len(), 13);
        assert!(columns.iter().all(|c| c.starts_with("saved_")));
        assert!(!columns.contains(&"saved_what_you_will_do"));
    }

    #[test]
    fn test_missing_key_clears_override() {
        let update = ReviewUpdate::new().saved_fields(
            DescriptionField::external(),
            &data(json!({ "whatYoullDo": "Lead the team" })),
        );
        assert_eq!(
            update.assignments[0],
            (
                "saved_what_you_will_do".to_string(),
                ColumnValue::Text(Some("Lead the team".to_string()))
            )
        );
        assert_eq!(update.assignments[1].1, ColumnValue::Text(None));
    }

    #[test]
    fn test_generated_columns_are_never_assigned() {
        let all = data(json!({}));
        let update = ReviewUpdate::new()
            .admin_details(&all)
            .saved_fields(DescriptionField::ALL.into_iter(), &all)
            .approve_internal(true, Utc::now())
            .approve_external(false, Utc::now());

        for field in DescriptionField::ALL {
            assert!(!update.columns().any(|c| c == field.column()), "{}", field.column());
        }
    }

    #[test]
    fn test_query_is_a_single_keyed_update() {
        let update = ReviewUpdate::new()
            .saved_fields(DescriptionField::external(), &data(json!({})))
            .approve_external(true, Utc::now());
        let sql = update.query("Buyer").into_sql();

        assert!(sql.starts_with("UPDATE review_job_profiles SET saved_what_you_will_do = $1, "));
        assert!(sql.contains("approved_external = $4, approved_external_time = $5"));
        assert!(sql.ends_with(" WHERE job_profile = $6"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_override_shadows_generated_value(pool: PgPool) {
        sqlx::query(
            "INSERT INTO review_job_profiles (job_profile, position_purpose) VALUES ($1, $2)",
        )
        .bind("Buyer")
        .bind("A")
        .execute(&pool)
        .await
        .unwrap();

        let edited = ReviewUpdate::new()
            .saved_fields(DescriptionField::internal(), &data(json!({ "purpose": "B" })));
        assert!(apply_update(&pool, "Buyer", &edited).await.unwrap());

        let row = find_profile(&pool, "Buyer").await.unwrap().unwrap();
        assert_eq!(row.effective(DescriptionField::Purpose).as_deref(), Some("B"));
        assert_eq!(row.generated_value(DescriptionField::Purpose), Some("A"));

        let cleared = ReviewUpdate::new()
            .saved_fields(DescriptionField::internal(), &data(json!({ "purpose": "" })));
        apply_update(&pool, "Buyer", &cleared).await.unwrap();
        let rows = list_profiles(&pool).await.unwrap();
        assert_eq!(rows[0].effective(DescriptionField::Purpose).as_deref(), Some("A"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_update_for_unknown_profile_matches_nothing(pool: PgPool) {
        let update = ReviewUpdate::new().approve_internal(true, Utc::now());
        assert!(!apply_update(&pool, "Nobody", &update).await.unwrap());
    }
}
