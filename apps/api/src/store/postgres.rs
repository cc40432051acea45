use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    full_patch, normalized_query, sanitize_patch, DocumentPatch, DocumentStore, ResumeSummary,
    StoreError,
};
use crate::document::ResumeDocument;
use crate::models::resume::ResumeRow;

/// Postgres-backed store: one row per resume, content in a JSONB column.
/// Merges use `data || patch`, so only top-level keys are replaced.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create_document(
        &self,
        owner: &str,
        initial: &ResumeDocument,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let data = Value::Object(full_patch(initial)?);

        sqlx::query("INSERT INTO resumes (id, owner_uid, data) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(owner)
            .bind(&data)
            .execute(&self.pool)
            .await?;

        debug!("Created resume {id} for {owner}");
        Ok(id)
    }

    async fn get_document(
        &self,
        owner: &str,
        id: Uuid,
    ) -> Result<Option<ResumeDocument>, StoreError> {
        let row: Option<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND owner_uid = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_document().map_err(StoreError::from))
            .transpose()
    }

    async fn update_document(
        &self,
        owner: &str,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<ResumeDocument, StoreError> {
        let patch = Value::Object(sanitize_patch(patch));

        // The merge is only committed once the merged row hydrates; dropping the
        // transaction on any error rolls it back.
        let mut tx = self.pool.begin().await?;
        let row: Option<ResumeRow> = sqlx::query_as(
            r#"
            UPDATE resumes
            SET data = data || $3, updated_at = NOW()
            WHERE id = $1 AND owner_uid = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&patch)
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(StoreError::NotFound)?;
        let doc = row.into_document().map_err(|e| {
            warn!("Rejected update of resume {id}: merged document does not hydrate: {e}");
            StoreError::from(e)
        })?;
        tx.commit().await?;
        Ok(doc)
    }

    async fn delete_document(&self, owner: &str, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND owner_uid = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_documents(
        &self,
        owner: &str,
        query: Option<&str>,
    ) -> Result<Vec<ResumeSummary>, StoreError> {
        let summaries: Vec<ResumeSummary> = sqlx::query_as(
            r#"
            SELECT id,
                   COALESCE(data->>'title', '') AS title,
                   COALESCE(data->>'templateId', '') AS template_id,
                   updated_at
            FROM resumes
            WHERE owner_uid = $1
              AND ($2::text IS NULL
                   OR strpos(lower(COALESCE(data->>'title', '')), lower($2)) > 0)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner)
        .bind(normalized_query(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries
            .into_iter()
            .map(ResumeSummary::with_default_title)
            .collect())
    }
}
