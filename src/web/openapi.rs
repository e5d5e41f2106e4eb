//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::Identity;
use crate::library::{AssignmentRecord, NoteRecord, QuestionPaperRecord, UploadRecord};
use crate::web::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::current_session,
        handlers::upload_general,
        handlers::upload_assignment,
        handlers::upload_notes,
        handlers::upload_question_paper,
        handlers::list_uploads,
        handlers::list_assignments,
        handlers::list_notes,
        handlers::list_question_papers,
        handlers::download_upload,
        handlers::download_assignment,
        handlers::download_notes,
        handlers::download_question_paper,
    ),
    components(schemas(
        Identity,
        UploadRecord,
        AssignmentRecord,
        NoteRecord,
        QuestionPaperRecord
    )),
    tags(
        (name = "account", description = "Session lookup"),
        (name = "uploads", description = "General uploads"),
        (name = "assignments", description = "Assignments"),
        (name = "notes", description = "Notes"),
        (name = "qpapers", description = "Question papers")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/notes".to_string()));
        assert!(paths.contains(&"/downloadQPaper/{filename}".to_string()));
        assert!(paths.contains(&"/uploadNotes".to_string()));
    }
}
