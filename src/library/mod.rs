//! Document library for StudySync.
//!
//! Documents are split into four categories. Each category owns one metadata
//! table and one blob directory, and a record always points at a blob of its
//! own category by filename.

mod filename;
mod gateway;
mod journal;
mod record;
mod repository;
mod storage;
mod upload;

pub use filename::{canonical_filename, FilenameError, MAX_FILENAME_BYTES};
pub use gateway::{list_records, open_blob, BlobHandle};
pub use journal::{sweep_orphans, PendingBlob, PendingBlobRepository, SweepReport};
pub use record::{
    AssignmentRecord, NewRecord, NoteRecord, QuestionPaperRecord, Record, RecordFields,
    RecordFilter, UploadRecord,
};
pub use repository::RecordRepository;
pub use storage::BlobStore;
pub use upload::{IncomingFile, UploadRequest, UploadService};

use std::fmt;
use std::str::FromStr;

/// Form field that carries the uploaded file.
pub const FILE_FIELD: &str = "fileUpload";

/// A document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// General uploads tied to a registered email.
    Upload,
    /// Assignments.
    Assignment,
    /// Lecture notes.
    Note,
    /// Past question papers.
    QuestionPaper,
}

impl Category {
    /// All categories.
    pub const ALL: [Category; 4] = [
        Category::Upload,
        Category::Assignment,
        Category::Note,
        Category::QuestionPaper,
    ];

    /// Stable identifier, used in the pending blob journal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Upload => "upload",
            Category::Assignment => "assignment",
            Category::Note => "note",
            Category::QuestionPaper => "qpaper",
        }
    }

    /// Metadata table name.
    pub fn table(&self) -> &'static str {
        match self {
            Category::Upload => "uploads",
            Category::Assignment => "assignments",
            Category::Note => "notes",
            Category::QuestionPaper => "qpapers",
        }
    }

    /// Blob directory name under the storage root.
    pub fn partition(&self) -> &'static str {
        match self {
            Category::Upload => "uploads",
            Category::Assignment => "assignments",
            Category::Note => "notes",
            Category::QuestionPaper => "qpapers",
        }
    }

    /// Descriptive columns of the category, excluding `file`.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Category::Upload => &["email", "sem", "subject", "unit"],
            Category::Assignment | Category::Note => &["subject", "unit"],
            Category::QuestionPaper => &["subject", "exam_name", "year"],
        }
    }

    /// Columns that may appear in a filter.
    pub fn filterable(&self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().copied().chain(std::iter::once("file"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Category::Upload),
            "assignment" => Ok(Category::Assignment),
            "note" => Ok(Category::Note),
            "qpaper" => Ok(Category::QuestionPaper),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}
