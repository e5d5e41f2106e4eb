//! Upload handlers for the four document categories.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, State};

use crate::context::RequestContext;
use crate::library::{Category, IncomingFile, RecordFields, UploadRequest, FILE_FIELD};
use crate::web::error::ApiError;
use crate::web::handlers::account::notice_or_error;
use crate::web::handlers::AppState;
use crate::web::notice::Notice;

/// Notice text and redirect targets of a category's upload form.
struct UploadPages {
    success_message: &'static str,
    success_page: &'static str,
    failure_page: &'static str,
}

fn pages(category: Category) -> UploadPages {
    match category {
        Category::Upload => UploadPages {
            success_message: "Upload successful!",
            success_page: "index.html",
            failure_page: "upload.html",
        },
        Category::Assignment => UploadPages {
            success_message: "Assignment uploaded successfully!",
            success_page: "assignments.html",
            failure_page: "assignments.html",
        },
        Category::Note => UploadPages {
            success_message: "Notes uploaded successfully!",
            success_page: "notes.html",
            failure_page: "notes.html",
        },
        Category::QuestionPaper => UploadPages {
            success_message: "Question Paper uploaded successfully!",
            success_page: "qpapers.html",
            failure_page: "qpapers.html",
        },
    }
}

/// Text fields and the file part of a multipart upload form.
#[derive(Debug, Default)]
struct UploadForm {
    text: HashMap<String, String>,
    file: Option<IncomingFile>,
}

impl UploadForm {
    /// Take a text field; absent fields are empty, like an empty input.
    fn take(&mut self, name: &str) -> String {
        self.text.remove(name).unwrap_or_default()
    }

    fn into_request(mut self, category: Category) -> UploadRequest {
        let fields = match category {
            Category::Upload => RecordFields::Upload {
                email: self.take("email"),
                sem: self.take("sem"),
                subject: self.take("subject"),
                unit: self.take("unit"),
            },
            Category::Assignment => RecordFields::Assignment {
                subject: self.take("subject"),
                unit: self.take("unit"),
            },
            Category::Note => RecordFields::Note {
                subject: self.take("subject"),
                unit: self.take("unit"),
            },
            Category::QuestionPaper => RecordFields::QuestionPaper {
                subject: self.take("subject"),
                exam_name: self.take("exam_name"),
                year: self.take("year"),
            },
        };
        UploadRequest::new(fields, self.file)
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    tracing::warn!(error = %e, "Failed to read multipart upload");
    if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Request body too large")
    } else {
        ApiError::bad_request("Invalid multipart data")
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD {
            // A file input left empty arrives as a part with no filename.
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if !filename.is_empty() && form.file.is_none() {
                form.file = Some(IncomingFile::new(filename, bytes.to_vec()));
            }
        } else if !name.is_empty() {
            let value = field.text().await.map_err(multipart_error)?;
            form.text.entry(name).or_insert(value);
        }
    }

    Ok(form)
}

async fn handle_upload(
    state: &AppState,
    ctx: &RequestContext,
    category: Category,
    multipart: Multipart,
) -> Result<Notice, ApiError> {
    let pages = pages(category);
    let request = read_form(multipart).await?.into_request(category);

    match state.uploads.upload(ctx, request).await {
        Ok(_) => Ok(Notice::new(pages.success_message, pages.success_page)),
        Err(e) => notice_or_error(e, pages.failure_page),
    }
}

/// POST /upload - General upload tied to a registered email.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "email, sem, subject, unit and fileUpload"),
    responses(
        (status = 200, description = "Notice page", content_type = "text/html"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn upload_general(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Notice, ApiError> {
    handle_upload(&state, &ctx, Category::Upload, multipart).await
}

/// POST /uploadAssignment - Upload an assignment.
#[utoipa::path(
    post,
    path = "/uploadAssignment",
    tag = "assignments",
    request_body(content = String, content_type = "multipart/form-data", description = "subject, unit and fileUpload"),
    responses(
        (status = 200, description = "Notice page", content_type = "text/html"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn upload_assignment(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Notice, ApiError> {
    handle_upload(&state, &ctx, Category::Assignment, multipart).await
}

/// POST /uploadNotes - Upload notes.
#[utoipa::path(
    post,
    path = "/uploadNotes",
    tag = "notes",
    request_body(content = String, content_type = "multipart/form-data", description = "subject, unit and fileUpload"),
    responses(
        (status = 200, description = "Notice page", content_type = "text/html"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn upload_notes(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Notice, ApiError> {
    handle_upload(&state, &ctx, Category::Note, multipart).await
}

/// POST /uploadQPaper - Upload a question paper.
#[utoipa::path(
    post,
    path = "/uploadQPaper",
    tag = "qpapers",
    request_body(content = String, content_type = "multipart/form-data", description = "subject, exam_name, year and fileUpload"),
    responses(
        (status = 200, description = "Notice page", content_type = "text/html"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn upload_question_paper(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<Notice, ApiError> {
    handle_upload(&state, &ctx, Category::QuestionPaper, multipart).await
}
