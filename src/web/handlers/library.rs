//! Listing and download handlers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use tokio_util::io::ReaderStream;

use crate::context::RequestContext;
use crate::library::{
    list_records, open_blob, AssignmentRecord, Category, NoteRecord, QuestionPaperRecord, Record,
    RecordFilter, UploadRecord,
};
use crate::web::dto::{QuestionPaperQuery, SubjectUnitQuery, UploadQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// ASCII names are sent as a quoted `filename`; anything else also gets an
/// RFC 5987 `filename*` parameter with a sanitized ASCII fallback.
fn content_disposition_header(filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .map(|c| match c {
            c if c.is_control() || !c.is_ascii() => '_',
            '"' | '\\' => '_',
            c => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

async fn list(
    state: &AppState,
    ctx: &RequestContext,
    category: Category,
    filter: RecordFilter,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = list_records(state.db.pool(), category, &filter).await?;
    tracing::debug!(
        request_id = %ctx.request_id,
        category = %category,
        conditions = filter.conditions().len(),
        results = records.len(),
        "Listed records"
    );
    Ok(Json(records))
}

/// GET /api/uploads - List general uploads.
#[utoipa::path(
    get,
    path = "/api/uploads",
    tag = "uploads",
    params(UploadQuery),
    responses(
        (status = 200, description = "Matching uploads in insertion order", body = Vec<UploadRecord>),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<UploadQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list(&state, &ctx, Category::Upload, query.into()).await
}

/// GET /api/assignments - List assignments.
#[utoipa::path(
    get,
    path = "/api/assignments",
    tag = "assignments",
    params(SubjectUnitQuery),
    responses(
        (status = 200, description = "Matching assignments in insertion order", body = Vec<AssignmentRecord>),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<SubjectUnitQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list(&state, &ctx, Category::Assignment, query.into()).await
}

/// GET /api/notes - List notes.
#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "notes",
    params(SubjectUnitQuery),
    responses(
        (status = 200, description = "Matching notes in insertion order", body = Vec<NoteRecord>),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<SubjectUnitQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list(&state, &ctx, Category::Note, query.into()).await
}

/// GET /api/qpapers - List question papers.
#[utoipa::path(
    get,
    path = "/api/qpapers",
    tag = "qpapers",
    params(QuestionPaperQuery),
    responses(
        (status = 200, description = "Matching question papers in insertion order", body = Vec<QuestionPaperRecord>),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_question_papers(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Query(query): Query<QuestionPaperQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    list(&state, &ctx, Category::QuestionPaper, query.into()).await
}

async fn download(
    state: &AppState,
    ctx: &RequestContext,
    category: Category,
    filename: &str,
) -> Result<Response<Body>, ApiError> {
    let handle = open_blob(state.storage(), category, filename).await?;

    let content_type = mime_guess::from_path(&handle.filename)
        .first_or_octet_stream()
        .to_string();

    tracing::info!(
        request_id = %ctx.request_id,
        category = %category,
        filename = %handle.filename,
        size = handle.size,
        "Serving download"
    );

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&handle.filename),
        )
        .header(header::CONTENT_LENGTH, handle.size)
        .body(Body::from_stream(ReaderStream::new(handle.file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /downloadUpload/:filename - Download a general upload.
#[utoipa::path(
    get,
    path = "/downloadUpload/{filename}",
    tag = "uploads",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_upload(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    download(&state, &ctx, Category::Upload, &filename).await
}

/// GET /downloadAssignment/:filename - Download an assignment.
#[utoipa::path(
    get,
    path = "/downloadAssignment/{filename}",
    tag = "assignments",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_assignment(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    download(&state, &ctx, Category::Assignment, &filename).await
}

/// GET /downloadNotes/:filename - Download notes.
#[utoipa::path(
    get,
    path = "/downloadNotes/{filename}",
    tag = "notes",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_notes(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    download(&state, &ctx, Category::Note, &filename).await
}

/// GET /downloadQPaper/:filename - Download a question paper.
#[utoipa::path(
    get,
    path = "/downloadQPaper/{filename}",
    tag = "qpapers",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_question_paper(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    download(&state, &ctx, Category::QuestionPaper, &filename).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("calc.pdf"),
            "attachment; filename=\"calc.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_unicode() {
        let value = content_disposition_header("微積分.pdf");
        assert!(value.starts_with("attachment; filename=\"___.pdf\""));
        assert!(value.contains("filename*=UTF-8''%E5%BE%AE%E7%A9%8D%E5%88%86.pdf"));
    }

    #[test]
    fn test_content_disposition_quotes() {
        let value = content_disposition_header("say \"hi\".txt");
        assert!(value.starts_with("attachment; filename=\"say _hi_.txt\""));
        assert!(value.contains("filename*=UTF-8''say%20%22hi%22.txt"));
    }
}
