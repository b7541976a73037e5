//! Persistence for generation profiles, their descriptions and pending approvals.
//!
//! A profile has at most one description row. Replacing it is always
//! delete-then-insert inside one transaction, never two independent calls.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::info;

use crate::models::description::{DescriptionField, DescriptionPayload};
use crate::models::profile::{JobProfileRow, PendingRow, ProfileSummary, StoredDescription};

/// Who signed off a description, and when.
#[derive(Debug, Clone)]
pub struct ApprovalStamp {
    pub approved_at: DateTime<Utc>,
    pub approved_by: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_profiles(pool: &PgPool) -> Result<Vec<ProfileSummary>, sqlx::Error> {
    sqlx::query_as::<_, ProfileSummary>(
        r#"
        SELECT p.id, p.title, COALESCE(d.approved_at IS NOT NULL, FALSE) AS approved
        FROM job_profiles p
        LEFT JOIN job_descriptions d ON d.job_profile_id = p.id
        ORDER BY p.id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_profile(pool: &PgPool, id: i32) -> Result<Option<JobProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, JobProfileRow>("SELECT * FROM job_profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive title lookup. The oldest matching profile wins.
pub async fn find_profile_by_title<'e, E>(
    executor: E,
    title: &str,
) -> Result<Option<JobProfileRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, JobProfileRow>(
        "SELECT * FROM job_profiles WHERE lower(title) = lower($1) ORDER BY id LIMIT 1",
    )
    .bind(title.trim())
    .fetch_optional(executor)
    .await
}

pub async fn create_profile(pool: &PgPool, title: &str) -> Result<JobProfileRow, sqlx::Error> {
    let profile = sqlx::query_as::<_, JobProfileRow>(
        "INSERT INTO job_profiles (title) VALUES ($1) RETURNING *",
    )
    .bind(title.trim())
    .fetch_one(pool)
    .await?;

    info!("Created job profile {} '{}'", profile.id, profile.title);
    Ok(profile)
}

// ────────────────────────────────────────────────────────────────────────────
// Descriptions
// ────────────────────────────────────────────────────────────────────────────

pub async fn find_description(
    pool: &PgPool,
    job_profile_id: i32,
) -> Result<Option<StoredDescription>, sqlx::Error> {
    sqlx::query_as::<_, StoredDescription>(
        "SELECT * FROM job_descriptions WHERE job_profile_id = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(job_profile_id)
    .fetch_optional(pool)
    .await
}

fn insert_description_sql() -> String {
    let columns: Vec<&str> = DescriptionField::ALL.iter().map(|f| f.column()).collect();
    // $1..$4 are profile id and the three labels, $5/$6 the approval stamp.
    let placeholders: Vec<String> = (7..7 + columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO job_descriptions \
         (job_profile_id, vertical, division, subdivision, approved_at, approved_by, {}) \
         VALUES ($1, $2, $3, $4, $5, $6, {})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Deletes the current description (if any) and inserts `payload` in its place.
/// Callers own the transaction.
///
/// The parent profile row stays locked until that transaction ends, so
/// overlapping replaces for one profile run one after the other.
pub async fn replace_description(
    conn: &mut PgConnection,
    job_profile_id: i32,
    payload: &DescriptionPayload,
    stamp: Option<&ApprovalStamp>,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM job_profiles WHERE id = $1 FOR UPDATE")
        .bind(job_profile_id)
        .fetch_optional(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM job_descriptions WHERE job_profile_id = $1")
        .bind(job_profile_id)
        .execute(&mut *conn)
        .await?;

    let sql = insert_description_sql();
    let mut query = sqlx::query(&sql)
        .bind(job_profile_id)
        .bind(&payload.vertical)
        .bind(&payload.division)
        .bind(&payload.subdivision)
        .bind(stamp.map(|s| s.approved_at))
        .bind(stamp.and_then(|s| s.approved_by.clone()));
    for field in DescriptionField::ALL {
        query = query.bind(payload.get(field));
    }
    query.execute(&mut *conn).await?;

    Ok(())
}

/// Transactional replace for plain saves.
pub async fn save_description(
    pool: &PgPool,
    job_profile_id: i32,
    payload: &DescriptionPayload,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    replace_description(&mut *tx, job_profile_id, payload, None).await?;
    tx.commit().await?;

    info!("Saved description for job profile {job_profile_id}");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Pending approvals
// ────────────────────────────────────────────────────────────────────────────

pub async fn create_pending(
    pool: &PgPool,
    token: &str,
    profile_name: &str,
    payload: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO pending_job_descriptions (token, profile_name, payload) VALUES ($1, $2, $3)",
    )
    .bind(token)
    .bind(profile_name)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(())
}

/// Drops pending rows older than `ttl`. Returns how many were removed.
pub async fn purge_expired_pending(pool: &PgPool, ttl: Duration) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pending_job_descriptions WHERE created_at < $1")
        .bind(Utc::now() - ttl)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Live pending row for `token`; expired rows are invisible.
pub async fn find_pending(
    pool: &PgPool,
    token: &str,
    ttl: Duration,
) -> Result<Option<PendingRow>, sqlx::Error> {
    sqlx::query_as::<_, PendingRow>(
        "SELECT * FROM pending_job_descriptions WHERE token = $1 AND created_at >= $2",
    )
    .bind(token)
    .bind(Utc::now() - ttl)
    .fetch_optional(pool)
    .await
}

/// Same as `find_pending` but row-locked for the rest of the transaction, so
/// two concurrent redemptions cannot both succeed.
pub async fn lock_pending(
    conn: &mut PgConnection,
    token: &str,
    ttl: Duration,
) -> Result<Option<PendingRow>, sqlx::Error> {
    sqlx::query_as::<_, PendingRow>(
        "SELECT * FROM pending_job_descriptions WHERE token = $1 AND created_at >= $2 FOR UPDATE",
    )
    .bind(token)
    .bind(Utc::now() - ttl)
    .fetch_optional(conn)
    .await
}

pub async fn delete_pending(conn: &mut PgConnection, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM pending_job_descriptions WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_binds_every_field_once() {
        let sql = insert_description_sql();
        for field in DescriptionField::ALL {
            assert_eq!(sql.matches(field.column()).count(), 1, "{}", field.column());
        }
        assert!(sql.contains("$22"));
        assert!(!sql.contains("$23"));
    }

    async fn description_rows(pool: &PgPool, job_profile_id: i32) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM job_descriptions WHERE job_profile_id = $1")
            .bind(job_profile_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_overlapping_replaces_keep_one_description(pool: PgPool) {
        let profile = create_profile(&pool, "Buyer").await.unwrap();
        let mut first = DescriptionPayload::default();
        first.set(DescriptionField::Purpose, Some("first".to_string()));
        let mut second = DescriptionPayload::default();
        second.set(DescriptionField::Purpose, Some("second".to_string()));
        save_description(&pool, profile.id, &first).await.unwrap();

        let mut tx_a = pool.begin().await.unwrap();
        replace_description(&mut *tx_a, profile.id, &first, None).await.unwrap();

        let other = pool.clone();
        let id = profile.id;
        let writer = tokio::spawn(async move {
            let mut tx_b = other.begin().await.unwrap();
            replace_description(&mut *tx_b, id, &second, None).await.unwrap();
            tx_b.commit().await.unwrap();
        });

        // Give the second writer time to queue behind the profile lock.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        tx_a.commit().await.unwrap();
        writer.await.unwrap();

        assert_eq!(description_rows(&pool, profile.id).await, 1);
        assert_eq!(list_profiles(&pool).await.unwrap().len(), 1);
        let stored = find_description(&pool, profile.id).await.unwrap().unwrap();
        assert_eq!(stored.payload.get(DescriptionField::Purpose), Some("second"));
    }
}
