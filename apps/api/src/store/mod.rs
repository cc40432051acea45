// Document Store: resumes persisted per owner uid. Nothing outside an owner's namespace is
// ever visible: foreign ids read as missing.
// Last write wins; the store stamps updatedAt, callers never do.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::document::ResumeDocument;
pub use crate::models::resume::ResumeSummary;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Keys managed by the store; stripped from anything a caller writes.
const STORE_MANAGED_KEYS: [&str; 2] = ["createdAt", "updatedAt"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Stored document is malformed: {0}")]
    Malformed(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            // insufficient_privilege
            sqlx::Error::Database(db) if db.code().as_deref() == Some("42501") => {
                StoreError::PermissionDenied
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

/// A partial document: top-level keys replace the stored ones, everything else is kept.
pub type DocumentPatch = Map<String, Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        owner: &str,
        initial: &ResumeDocument,
    ) -> Result<Uuid, StoreError>;

    /// `Ok(None)` when the id does not exist under `owner`.
    async fn get_document(
        &self,
        owner: &str,
        id: Uuid,
    ) -> Result<Option<ResumeDocument>, StoreError>;

    /// Shallow-merges `patch` into the stored document and returns the merged result.
    async fn update_document(
        &self,
        owner: &str,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<ResumeDocument, StoreError>;

    /// Removes the whole document in one step.
    async fn delete_document(&self, owner: &str, id: Uuid) -> Result<(), StoreError>;

    /// Most recently updated first, optionally filtered by a case-insensitive title search.
    async fn list_documents(
        &self,
        owner: &str,
        query: Option<&str>,
    ) -> Result<Vec<ResumeSummary>, StoreError>;
}

/// The full document as a patch: every content key, no store-managed timestamps.
pub fn full_patch(doc: &ResumeDocument) -> Result<DocumentPatch, StoreError> {
    match serde_json::to_value(doc)? {
        Value::Object(map) => Ok(sanitize_patch(map)),
        other => Err(StoreError::Malformed(format!(
            "document serialised to {other}, expected an object"
        ))),
    }
}

/// Drops store-managed keys from a caller-supplied patch.
pub fn sanitize_patch(mut patch: DocumentPatch) -> DocumentPatch {
    for key in STORE_MANAGED_KEYS {
        patch.remove(key);
    }
    patch
}

fn normalized_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}
