//! Request DTOs for the web layer.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use super::validation::not_empty_trimmed;
use crate::library::RecordFilter;

/// Signup form.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    /// Display name.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub username: String,
    /// Email.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub password: String,
}

/// Login form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    /// Email.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub password: String,
}

/// Filters for `GET /api/uploads`. Empty values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Uploader email.
    pub email: Option<String>,
    /// Semester.
    pub sem: Option<String>,
    /// Subject.
    pub subject: Option<String>,
    /// Unit.
    pub unit: Option<String>,
}

impl From<UploadQuery> for RecordFilter {
    fn from(q: UploadQuery) -> Self {
        RecordFilter::new()
            .eq_opt("email", q.email)
            .eq_opt("sem", q.sem)
            .eq_opt("subject", q.subject)
            .eq_opt("unit", q.unit)
    }
}

/// Filters for `GET /api/assignments` and `GET /api/notes`. Empty values
/// are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubjectUnitQuery {
    /// Subject.
    pub subject: Option<String>,
    /// Unit.
    pub unit: Option<String>,
}

impl From<SubjectUnitQuery> for RecordFilter {
    fn from(q: SubjectUnitQuery) -> Self {
        RecordFilter::new()
            .eq_opt("subject", q.subject)
            .eq_opt("unit", q.unit)
    }
}

/// Filters for `GET /api/qpapers`. Empty values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionPaperQuery {
    /// Subject.
    pub subject: Option<String>,
    /// Exam name.
    pub exam_name: Option<String>,
    /// Exam year.
    pub year: Option<String>,
}

impl From<QuestionPaperQuery> for RecordFilter {
    fn from(q: QuestionPaperQuery) -> Self {
        RecordFilter::new()
            .eq_opt("subject", q.subject)
            .eq_opt("exam_name", q.exam_name)
            .eq_opt("year", q.year)
    }
}
