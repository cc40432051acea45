use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::document::model::{ResumeDocument, DEFAULT_TITLE};

/// One stored resume. `data` holds the document JSON without its timestamps,
/// which live in their own columns and are assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub owner_uid: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Hydrates the stored JSON into a document, filling in the column timestamps.
    pub fn into_document(self) -> Result<ResumeDocument, serde_json::Error> {
        let mut doc: ResumeDocument = serde_json::from_value(self.data)?;
        doc.created_at = Some(self.created_at);
        doc.updated_at = Some(self.updated_at);
        Ok(doc)
    }
}

/// Dashboard card: enough to list, search and open a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub title: String,
    pub template_id: String,
    pub updated_at: DateTime<Utc>,
}

impl ResumeSummary {
    pub fn new(id: Uuid, doc: &ResumeDocument, updated_at: DateTime<Utc>) -> Self {
        ResumeSummary {
            id,
            title: doc.title.clone(),
            template_id: doc.template_id.clone(),
            updated_at,
        }
    }

    pub fn with_default_title(mut self) -> Self {
        if self.title.trim().is_empty() {
            self.title = DEFAULT_TITLE.to_string();
        }
        self
    }

    /// Case-insensitive substring match on the title; an empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }
}
