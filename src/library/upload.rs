//! Upload workflow: validate, write the blob, commit the record.

use tracing::{error, info, warn};

use super::filename::canonical_filename;
use super::journal::PendingBlobRepository;
use super::record::{NewRecord, Record, RecordFields};
use super::repository::RecordRepository;
use super::storage::BlobStore;
use crate::config::CollisionPolicy;
use crate::context::RequestContext;
use crate::db::{Database, UserRepository};
use crate::error::Rejection;
use crate::Result;

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename as sent by the client.
    pub filename: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    /// Create a new incoming file.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// One upload: category fields plus the file, if the form had one.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Category fields.
    pub fields: RecordFields,
    /// The uploaded file.
    pub file: Option<IncomingFile>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(fields: RecordFields, file: Option<IncomingFile>) -> Self {
        Self { fields, file }
    }
}

/// Runs uploads for every category.
#[derive(Debug, Clone)]
pub struct UploadService {
    db: Database,
    storage: BlobStore,
    on_collision: CollisionPolicy,
    max_bytes: u64,
}

impl UploadService {
    /// Create a new UploadService.
    pub fn new(
        db: Database,
        storage: BlobStore,
        on_collision: CollisionPolicy,
        max_bytes: u64,
    ) -> Self {
        Self {
            db,
            storage,
            on_collision,
            max_bytes,
        }
    }

    /// Blob store used by this service.
    pub fn storage(&self) -> &BlobStore {
        &self.storage
    }

    /// Validate an upload, store its blob and create its record.
    ///
    /// Checks run in this order: file present, filename safe, size within
    /// limit, email registered (general uploads only), collision policy.
    /// Any refusal leaves both stores untouched.
    ///
    /// The blob is written under a pending marker which is deleted in the
    /// same transaction that inserts the record. If that transaction fails
    /// the blob keeps its marker and is collected by
    /// [`sweep_orphans`](super::sweep_orphans).
    pub async fn upload(&self, ctx: &RequestContext, req: UploadRequest) -> Result<Record> {
        let category = req.fields.category();

        let file = match req.file {
            Some(file) if !file.filename.is_empty() => file,
            _ => return Err(Rejection::FileMissing.into()),
        };

        let name = match canonical_filename(&file.filename) {
            Ok(name) => name.to_string(),
            Err(e) => {
                info!(
                    request_id = %ctx.request_id,
                    category = %category,
                    filename = %file.filename.escape_debug(),
                    reason = %e,
                    "Upload refused: invalid filename"
                );
                return Err(Rejection::InvalidFilename.into());
            }
        };

        if file.bytes.len() as u64 > self.max_bytes {
            info!(
                request_id = %ctx.request_id,
                category = %category,
                filename = %name,
                size = file.bytes.len(),
                "Upload refused: file too large"
            );
            return Err(Rejection::FileTooLarge.into());
        }

        let pool = self.db.pool();

        if let RecordFields::Upload { email, .. } = &req.fields {
            if !UserRepository::new(pool).email_exists(email).await? {
                info!(
                    request_id = %ctx.request_id,
                    email = %email,
                    "Upload refused: email not registered"
                );
                return Err(Rejection::IdentityNotFound.into());
            }
        }

        if self.on_collision == CollisionPolicy::Reject
            && self.storage.exists(category, &name).await?
        {
            info!(
                request_id = %ctx.request_id,
                category = %category,
                filename = %name,
                "Upload refused: file already exists"
            );
            return Err(Rejection::FileExists.into());
        }

        let journal = PendingBlobRepository::new(pool);
        let marker = journal.begin(category, &name).await?;

        if let Err(e) = self.storage.write(category, &name, &file.bytes).await {
            error!(
                request_id = %ctx.request_id,
                category = %category,
                filename = %name,
                error = %e,
                "Blob write failed"
            );
            if let Err(discard_err) = journal.discard(marker).await {
                warn!(marker_id = marker, error = %discard_err, "Could not discard pending marker");
            }
            return Err(e);
        }

        // The blob now holds these bytes, so any earlier record for the name is stale.
        let mut tx = pool.begin().await?;
        let replaced = RecordRepository::remove_by_file(&mut tx, category, &name).await?;
        let record = RecordRepository::insert(&mut tx, &NewRecord::new(req.fields, name)).await?;
        PendingBlobRepository::clear(&mut tx, marker).await?;
        tx.commit().await?;

        info!(
            request_id = %ctx.request_id,
            actor = %ctx.actor(),
            category = %category,
            record_id = record.id(),
            filename = %record.file(),
            size = file.bytes.len(),
            replaced,
            "Upload stored"
        );

        Ok(record)
    }
}
