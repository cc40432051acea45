use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{EditorSession, OpenOutcome, SaveStatus};
use crate::document::{EditOp, ResumeDocument, TemplateId};
use crate::errors::AppError;
use crate::export::{UploadedCapture, PDF_CONTENT_TYPE};
use crate::identity::AuthUser;
use crate::render::{to_html, RenderedResume, Theme};
use crate::state::AppState;
use crate::store::ResumeSummary;

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Start with empty sections instead of one blank entry each.
    #[serde(default)]
    pub quick: bool,
}

#[derive(Serialize)]
pub struct CreateResumeResponse {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub status: SaveStatus,
    pub message: &'static str,
    pub document: ResumeDocument,
}

/// Either a bare list of edits or `{ "ops": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum EditBatch {
    Ops(Vec<EditOp>),
    Wrapped { ops: Vec<EditOp> },
}

impl EditBatch {
    fn into_ops(self) -> Vec<EditOp> {
        match self {
            EditBatch::Ops(ops) | EditBatch::Wrapped { ops } => ops,
        }
    }
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub template: Option<String>,
    pub format: Option<String>,
    pub theme: Option<String>,
}

async fn open(state: &AppState, user: AuthUser, id: Uuid, theme: Theme) -> Result<EditorSession, AppError> {
    let ctx = state.context_for(user.identity, theme);
    match EditorSession::open(&ctx, id).await? {
        OpenOutcome::Ready(session) => Ok(session),
        OpenOutcome::NotFound => Err(AppError::NotFound(format!("Resume {id} not found"))),
    }
}

fn save_response(session: &EditorSession) -> Json<SaveResponse> {
    Json(SaveResponse {
        status: session.status(),
        message: session.status().as_str(),
        document: session.document().clone(),
    })
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let summaries = state
        .store
        .list_documents(&user.identity.uid, params.q.as_deref())
        .await?;
    Ok(Json(summaries))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<CreateResumeResponse>), AppError> {
    let template = req
        .template_id
        .as_deref()
        .map(TemplateId::resolve)
        .unwrap_or_default();
    let ctx = state.context_for(user.identity, Theme::default());
    let id = match (req.quick, req.title.as_deref()) {
        (true, None) => EditorSession::quick_create(&ctx, template).await?,
        (quick, title) => EditorSession::create(&ctx, template, title, quick).await?,
    };
    Ok((StatusCode::CREATED, Json(CreateResumeResponse { id })))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    let session = open(&state, user, id, Theme::default()).await?;
    Ok(Json(session.document().clone()))
}

/// PUT /api/v1/resumes/:id
/// Saves a full or partial document state; top-level keys replace the stored ones.
pub async fn handle_save_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<SaveResponse>, AppError> {
    let Value::Object(patch) = body else {
        return Err(AppError::Validation(
            "request body must be a JSON object".to_string(),
        ));
    };
    // Reject shapes that could never hydrate before they reach the store.
    serde_json::from_value::<ResumeDocument>(Value::Object(patch.clone()))
        .map_err(|e| AppError::Validation(format!("invalid resume state: {e}")))?;

    let mut session = open(&state, user, id, Theme::default()).await?;
    session.update(patch).await?;
    Ok(save_response(&session))
}

/// PATCH /api/v1/resumes/:id
/// Applies a batch of edits atomically, then saves.
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(batch): Json<EditBatch>,
) -> Result<Json<SaveResponse>, AppError> {
    let mut session = open(&state, user, id, Theme::default()).await?;
    session.apply(batch.into_ops())?;
    session.save().await?;
    Ok(save_response(&session))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = open(&state, user, id, Theme::default()).await?;
    session.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/preview?template=&format=html|json&theme=
pub async fn handle_preview_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Response, AppError> {
    let theme = params.theme.as_deref().map(Theme::resolve).unwrap_or_default();
    let session = open(&state, user, id, theme).await?;
    let rendered: RenderedResume = session.preview(params.template.as_deref());

    match params.format.as_deref().unwrap_or("html") {
        "json" => Ok(Json(rendered).into_response()),
        "html" => Ok(Html(to_html(&rendered, theme)).into_response()),
        other => Err(AppError::Validation(format!(
            "unknown preview format '{other}', expected html or json"
        ))),
    }
}

/// POST /api/v1/resumes/:id/export
/// Body is the PNG/JPEG capture of `#resume-container`; responds with the PDF.
pub async fn handle_export_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, AppError> {
    let mut session = open(&state, user, id, Theme::default()).await?;
    let capture = UploadedCapture::new(body);
    let artifact = session.export(&state.export, &capture).await?;

    let disposition = content_disposition(&artifact.filename);
    let page_count = HeaderValue::from(artifact.page_count as u64);
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
            (header::HeaderName::from_static("x-page-count"), page_count),
        ],
        artifact.bytes,
    )
        .into_response())
}

/// `attachment; filename="..."` with non-ASCII characters replaced, since header values
/// must be visible ASCII.
fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .filter(|c| *c != '"')
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{ascii}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"resume.pdf\""))
}
