use sqlx::{Executor, Postgres, types::Json};

use lsr_srs::ProblemRecord;

/// Every stored record as `(key, raw JSON)`, in key order.
///
/// Records are decoded by the caller so a single malformed row can be reported
/// with its key.
pub async fn fetch_all_problems<'e, E>(
    executor: E,
) -> Result<Vec<(String, Json<serde_json::Value>)>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT key, record
            FROM problems
            ORDER BY key
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn insert_problem<'e, E>(
    executor: E,
    key: &str,
    record: &ProblemRecord,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO problems (key, record)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET
                record = $2,
                updated_at = NOW()
        "#,
    )
    .bind(key)
    .bind(Json(record))
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove every record. Returns how many rows were deleted.
pub async fn delete_all_problems<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM problems
        "#,
    )
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
