use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    full_patch, normalized_query, sanitize_patch, DocumentPatch, DocumentStore, ResumeSummary,
    StoreError,
};
use crate::document::ResumeDocument;
use crate::models::resume::ResumeRow;

struct Stored {
    row: ResumeRow,
    /// Write sequence number; orders writes that land within the same clock tick.
    revision: u64,
}

/// In-process store with the same semantics as the Postgres one. Used when no
/// `DATABASE_URL` is configured and in tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    rows: RwLock<HashMap<Uuid, Stored>>,
    revision: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn owned<'a>(rows: &'a HashMap<Uuid, Stored>, owner: &str, id: Uuid) -> Option<&'a Stored> {
    rows.get(&id).filter(|s| s.row.owner_uid == owner)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create_document(
        &self,
        owner: &str,
        initial: &ResumeDocument,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let row = ResumeRow {
            id,
            owner_uid: owner.to_string(),
            data: Value::Object(full_patch(initial)?),
            created_at: now,
            updated_at: now,
        };
        let revision = self.next_revision();
        self.rows.write().await.insert(id, Stored { row, revision });
        Ok(id)
    }

    async fn get_document(
        &self,
        owner: &str,
        id: Uuid,
    ) -> Result<Option<ResumeDocument>, StoreError> {
        let rows = self.rows.read().await;
        owned(&rows, owner, id)
            .map(|s| s.row.clone().into_document().map_err(StoreError::from))
            .transpose()
    }

    async fn update_document(
        &self,
        owner: &str,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<ResumeDocument, StoreError> {
        let revision = self.next_revision();
        let mut rows = self.rows.write().await;
        let stored = rows
            .get_mut(&id)
            .filter(|s| s.row.owner_uid == owner)
            .ok_or(StoreError::NotFound)?;

        let Value::Object(data) = &stored.row.data else {
            return Err(StoreError::Malformed(format!("document {id} is not an object")));
        };
        let mut merged = data.clone();
        for (key, value) in sanitize_patch(patch) {
            merged.insert(key, value);
        }

        // Commit only a merge that still hydrates.
        let candidate = ResumeRow {
            data: Value::Object(merged),
            updated_at: Utc::now().max(stored.row.updated_at),
            ..stored.row.clone()
        };
        let doc = candidate.clone().into_document()?;
        stored.row = candidate;
        stored.revision = revision;
        Ok(doc)
    }

    async fn delete_document(&self, owner: &str, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if owned(&rows, owner, id).is_none() {
            return Err(StoreError::NotFound);
        }
        rows.remove(&id);
        Ok(())
    }

    async fn list_documents(
        &self,
        owner: &str,
        query: Option<&str>,
    ) -> Result<Vec<ResumeSummary>, StoreError> {
        let query = normalized_query(query);
        let rows = self.rows.read().await;

        let mut listed: Vec<(DateTime<Utc>, u64, ResumeSummary)> = Vec::new();
        for stored in rows.values().filter(|s| s.row.owner_uid == owner) {
            let doc = match stored.row.clone().into_document() {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping unreadable resume {} in listing: {e}", stored.row.id);
                    continue;
                }
            };
            let summary =
                ResumeSummary::new(stored.row.id, &doc, stored.row.updated_at).with_default_title();
            if query.map_or(true, |q| summary.matches(q)) {
                listed.push((stored.row.updated_at, stored.revision, summary));
            }
        }

        listed.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        Ok(listed.into_iter().map(|(_, _, s)| s).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::TemplateId;

    fn make_patch(value: Value) -> DocumentPatch {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryDocumentStore::new();
        let doc = ResumeDocument::seeded(TemplateId::Classic);
        let id = store.create_document("u1", &doc).await.unwrap();

        let loaded = store.get_document("u1", id).await.unwrap().unwrap();
        assert_eq!(loaded.template(), TemplateId::Classic);
        assert_eq!(loaded.experience.len(), 1);
        assert!(loaded.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_foreign_owner_sees_nothing() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create_document("u1", &ResumeDocument::default())
            .await
            .unwrap();

        assert!(store.get_document("u2", id).await.unwrap().is_none());
        assert!(matches!(
            store.update_document("u2", id, DocumentPatch::new()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_document("u2", id).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.list_documents("u2", None).await.unwrap().is_empty());
        assert!(store.get_document("u1", id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_merges_top_level_keys() {
        let store = MemoryDocumentStore::new();
        let mut doc = ResumeDocument::quick(TemplateId::Modern);
        doc.personal_info.full_name = "Ada".to_string();
        let id = store.create_document("u1", &doc).await.unwrap();

        let merged = store
            .update_document(
                "u1",
                id,
                make_patch(json!({ "title": "Renamed", "updatedAt": "1999-01-01T00:00:00Z" })),
            )
            .await
            .unwrap();
        assert_eq!(merged.title, "Renamed");
        assert_eq!(merged.personal_info.full_name, "Ada");
        assert_ne!(
            merged.updated_at.unwrap().to_rfc3339(),
            "1999-01-01T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_document_readable() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create_document("u1", &ResumeDocument::quick(TemplateId::Modern))
            .await
            .unwrap();

        let result = store
            .update_document("u1", id, make_patch(json!({ "title": 5 })))
            .await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));

        let loaded = store.get_document("u1", id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Untitled Resume");
        assert_eq!(store.list_documents("u1", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_rows() {
        let store = MemoryDocumentStore::new();
        let good = store
            .create_document("u1", &ResumeDocument::default())
            .await
            .unwrap();
        let bad = store
            .create_document("u1", &ResumeDocument::default())
            .await
            .unwrap();
        store.rows.write().await.get_mut(&bad).unwrap().row.data = json!({ "title": [] });

        let listed = store.list_documents("u1", None).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![good]);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let result = store
            .update_document("u1", Uuid::new_v4(), DocumentPatch::new())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let store = MemoryDocumentStore::new();
        let id = store
            .create_document("u1", &ResumeDocument::default())
            .await
            .unwrap();
        store.delete_document("u1", id).await.unwrap();
        assert!(store.get_document("u1", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_most_recent_update_and_searches() {
        let store = MemoryDocumentStore::new();
        let mut first = ResumeDocument::default();
        first.title = "Backend CV".to_string();
        let mut second = ResumeDocument::default();
        second.title = "Design Portfolio".to_string();

        let a = store.create_document("u1", &first).await.unwrap();
        let b = store.create_document("u1", &second).await.unwrap();
        store
            .update_document("u1", a, make_patch(json!({ "templateId": "classic" })))
            .await
            .unwrap();

        let listed = store.list_documents("u1", None).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, b]);

        let found = store.list_documents("u1", Some("DESIGN")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b);
    }
}
