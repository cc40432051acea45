//! One open resume: a `ResumeEditor` bound to its stored document.
//!
//! All I/O (load, save, export) goes through here and every failure ends up as status
//! text. Nothing is retried; a failed save keeps the in-memory edits so the user can try again.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::context::AppContext;
use crate::document::{EditError, EditOp, ResumeDocument, ResumeEditor, TemplateId};
use crate::export::{ExportArtifact, ExportError, ExportPipeline, RegionCapture};
use crate::identity::Identity;
use crate::render::{render_document, render_with_selector, RenderedResume};
use crate::store::{full_patch, DocumentPatch, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Sign in to continue")]
    SignedOut,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Save indicator shown next to the save button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

impl SaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved!",
            SaveStatus::Failed => "Error saving",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of opening a document id.
pub enum OpenOutcome {
    Ready(EditorSession),
    NotFound,
}

pub struct EditorSession {
    store: Arc<dyn DocumentStore>,
    owner: Identity,
    id: Uuid,
    editor: ResumeEditor,
    status: SaveStatus,
    notice: Option<String>,
}

impl EditorSession {
    /// Opens `id` for the context's signed-in identity.
    pub async fn open(ctx: &AppContext, id: Uuid) -> Result<OpenOutcome, SessionError> {
        let owner = ctx.current_identity().ok_or(SessionError::SignedOut)?;
        Self::open_as(Arc::clone(ctx.store()), owner, id).await
    }

    pub async fn open_as(
        store: Arc<dyn DocumentStore>,
        owner: Identity,
        id: Uuid,
    ) -> Result<OpenOutcome, SessionError> {
        let doc = store.get_document(&owner.uid, id).await.map_err(|e| {
            error!("Loading resume {id} failed: {e}");
            e
        })?;

        Ok(match doc {
            Some(doc) => OpenOutcome::Ready(EditorSession {
                store,
                owner,
                id,
                editor: ResumeEditor::new(doc),
                status: SaveStatus::Idle,
                notice: None,
            }),
            None => OpenOutcome::NotFound,
        })
    }

    /// Creates a new document for the signed-in identity and returns its id.
    /// `quick` starts every section empty; otherwise each section gets one blank entry.
    pub async fn create(
        ctx: &AppContext,
        template: TemplateId,
        title: Option<&str>,
        quick: bool,
    ) -> Result<Uuid, SessionError> {
        let owner = ctx.current_identity().ok_or(SessionError::SignedOut)?;
        let mut doc = if quick {
            ResumeDocument::quick(template)
        } else {
            ResumeDocument::seeded(template)
        };
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            doc.title = title.to_string();
        }

        let id = ctx.store().create_document(&owner.uid, &doc).await?;
        info!("Created {template} resume {id} for {}", owner.uid);
        Ok(id)
    }

    /// Dashboard quick-create: empty document with the default title.
    pub async fn quick_create(ctx: &AppContext, template: TemplateId) -> Result<Uuid, SessionError> {
        Self::create(ctx, template, None, true).await
    }

    pub fn document(&self) -> &ResumeDocument {
        self.editor.document()
    }

    #[allow(dead_code)]
    pub fn editor_mut(&mut self) -> &mut ResumeEditor {
        &mut self.editor
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Last user-visible message from a failed operation.
    #[allow(dead_code)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Applies a batch of edits atomically.
    pub fn apply(&mut self, ops: Vec<EditOp>) -> Result<(), SessionError> {
        Ok(self.editor.apply_all(ops)?)
    }

    /// Persists the whole in-memory document. On failure the edits stay in memory.
    pub async fn save(&mut self) -> Result<&ResumeDocument, SessionError> {
        let patch = match full_patch(&self.editor.to_persistable()) {
            Ok(patch) => patch,
            Err(e) => return Err(self.fail_save(e)),
        };
        self.write(patch, false).await
    }

    /// Persists a partial state; the merged document from the store becomes the new state.
    pub async fn update(&mut self, patch: DocumentPatch) -> Result<&ResumeDocument, SessionError> {
        self.write(patch, true).await
    }

    async fn write(
        &mut self,
        patch: DocumentPatch,
        reload: bool,
    ) -> Result<&ResumeDocument, SessionError> {
        self.status = SaveStatus::Saving;
        let merged = match self
            .store
            .update_document(&self.owner.uid, self.id, patch)
            .await
        {
            Ok(merged) => merged,
            Err(e) => return Err(self.fail_save(e)),
        };

        if reload {
            self.editor.load(merged);
        } else {
            let mut doc = self.editor.document().clone();
            doc.updated_at = merged.updated_at;
            doc.created_at = merged.created_at;
            self.editor.load(doc);
        }
        self.status = SaveStatus::Saved;
        self.notice = None;
        Ok(self.editor.document())
    }

    fn fail_save(&mut self, e: StoreError) -> SessionError {
        error!("Saving resume {} failed: {e}", self.id);
        self.status = SaveStatus::Failed;
        self.notice = Some(format!("{}: {e}", SaveStatus::Failed));
        SessionError::Store(e)
    }

    /// Renders with the document's own template, or `template_override` when given.
    pub fn preview(&self, template_override: Option<&str>) -> RenderedResume {
        match template_override {
            Some(selector) => render_with_selector(self.editor.document(), selector),
            None => render_document(self.editor.document()),
        }
    }

    pub async fn export(
        &mut self,
        pipeline: &ExportPipeline,
        capture: &dyn RegionCapture,
    ) -> Result<ExportArtifact, ExportError> {
        match pipeline.run(capture, &self.editor.document().title).await {
            Ok(artifact) => {
                self.notice = None;
                Ok(artifact)
            }
            Err(e) => {
                warn!("Export of resume {} failed: {e}", self.id);
                self.notice = Some(format!("Error exporting PDF: {e}"));
                Err(e)
            }
        }
    }

    /// Deletes the document. The session is consumed either way.
    pub async fn delete(self) -> Result<(), SessionError> {
        self.store
            .delete_document(&self.owner.uid, self.id)
            .await
            .map_err(|e| {
                error!("Deleting resume {} failed: {e}", self.id);
                SessionError::from(e)
            })?;
        info!("Deleted resume {} for {}", self.id, self.owner.uid);
        Ok(())
    }
}
