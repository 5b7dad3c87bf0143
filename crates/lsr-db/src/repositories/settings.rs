use sqlx::{Executor, Postgres};

use crate::models::StudySettings;

pub async fn fetch_study_settings<'e, E>(executor: E) -> Result<Option<StudySettings>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT end_date, start_date
            FROM study_settings
            WHERE id = 1
        "#,
    )
    .fetch_optional(executor)
    .await
}

pub async fn upsert_study_settings<'e, E>(
    executor: E,
    settings: &StudySettings,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO study_settings (id, end_date, start_date)
            VALUES (1, $1, $2)
            ON CONFLICT (id)
            DO UPDATE SET
                end_date = $1,
                start_date = $2,
                updated_at = NOW()
        "#,
    )
    .bind(settings.end_date.as_deref())
    .bind(settings.start_date.as_deref())
    .execute(executor)
    .await?;
    Ok(())
}
