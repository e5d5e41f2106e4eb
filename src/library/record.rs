//! Metadata record types.

use serde::Serialize;
use utoipa::ToSchema;

use super::Category;

/// A general upload, owned by a registered email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct UploadRecord {
    /// Record ID.
    pub id: i64,
    /// Email of the uploading account.
    pub email: String,
    /// Semester.
    pub sem: String,
    /// Subject.
    pub subject: String,
    /// Unit.
    pub unit: String,
    /// Stored filename.
    pub file: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// An assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct AssignmentRecord {
    /// Record ID.
    pub id: i64,
    /// Subject.
    pub subject: String,
    /// Unit.
    pub unit: String,
    /// Stored filename.
    pub file: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A set of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct NoteRecord {
    /// Record ID.
    pub id: i64,
    /// Subject.
    pub subject: String,
    /// Unit.
    pub unit: String,
    /// Stored filename.
    pub file: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A past question paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct QuestionPaperRecord {
    /// Record ID.
    pub id: i64,
    /// Subject.
    pub subject: String,
    /// Exam name (e.g. "Midterm").
    pub exam_name: String,
    /// Exam year.
    pub year: String,
    /// Stored filename.
    pub file: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A record of any category. Serializes as the inner record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Upload(UploadRecord),
    Assignment(AssignmentRecord),
    Note(NoteRecord),
    QuestionPaper(QuestionPaperRecord),
}

impl Record {
    /// Category of the record.
    pub fn category(&self) -> Category {
        match self {
            Record::Upload(_) => Category::Upload,
            Record::Assignment(_) => Category::Assignment,
            Record::Note(_) => Category::Note,
            Record::QuestionPaper(_) => Category::QuestionPaper,
        }
    }

    /// Stored filename the record points at.
    pub fn file(&self) -> &str {
        match self {
            Record::Upload(r) => &r.file,
            Record::Assignment(r) => &r.file,
            Record::Note(r) => &r.file,
            Record::QuestionPaper(r) => &r.file,
        }
    }

    /// Record ID within its category.
    pub fn id(&self) -> i64 {
        match self {
            Record::Upload(r) => r.id,
            Record::Assignment(r) => r.id,
            Record::Note(r) => r.id,
            Record::QuestionPaper(r) => r.id,
        }
    }
}

/// Descriptive form fields of an upload, by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFields {
    Upload {
        email: String,
        sem: String,
        subject: String,
        unit: String,
    },
    Assignment {
        subject: String,
        unit: String,
    },
    Note {
        subject: String,
        unit: String,
    },
    QuestionPaper {
        subject: String,
        exam_name: String,
        year: String,
    },
}

impl RecordFields {
    /// Category these fields belong to.
    pub fn category(&self) -> Category {
        match self {
            RecordFields::Upload { .. } => Category::Upload,
            RecordFields::Assignment { .. } => Category::Assignment,
            RecordFields::Note { .. } => Category::Note,
            RecordFields::QuestionPaper { .. } => Category::QuestionPaper,
        }
    }

    /// Values in the order of [`Category::columns`].
    pub fn values(&self) -> Vec<&str> {
        match self {
            RecordFields::Upload {
                email,
                sem,
                subject,
                unit,
            } => vec![email, sem, subject, unit],
            RecordFields::Assignment { subject, unit } | RecordFields::Note { subject, unit } => {
                vec![subject, unit]
            }
            RecordFields::QuestionPaper {
                subject,
                exam_name,
                year,
            } => vec![subject, exam_name, year],
        }
    }
}

/// A record to insert: descriptive fields plus the stored filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Descriptive fields.
    pub fields: RecordFields,
    /// Stored filename.
    pub file: String,
}

impl NewRecord {
    /// Create a new record description.
    pub fn new(fields: RecordFields, file: impl Into<String>) -> Self {
        Self {
            fields,
            file: file.into(),
        }
    }

    /// Category of the record.
    pub fn category(&self) -> Category {
        self.fields.category()
    }
}

/// Equality filter for listing records.
///
/// Conditions are ANDed; an empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    conditions: Vec<(String, String)>,
}

impl RecordFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value` exactly.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// Like [`RecordFilter::eq`], skipping absent and empty values.
    pub fn eq_opt(self, column: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.eq(column, v),
            _ => self,
        }
    }

    /// Whether the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The (column, value) conditions.
    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }
}
