//! File store: uploads, listings and downloads over the blob namespace.

use std::path::PathBuf;

use super::ledger::{LedgerEntry, MetadataLedger};
use super::name::{normalize, CanonicalPath};
use super::storage::{BlobReader, BlobWriter, FileStorage};
use super::DEFAULT_MAX_FILE_SIZE;
use crate::{DriveError, Result};

/// A stored file as reported by [`FileStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Canonical path.
    pub path: CanonicalPath,
    /// Size in bytes, read live from storage.
    pub size: u64,
    /// Provenance, if the ledger has any.
    pub provenance: Option<LedgerEntry>,
}

impl FileEntry {
    /// Upload timestamp, 0 when unknown.
    pub fn ts(&self) -> u64 {
        self.provenance.as_ref().map_or(0, |p| p.ts)
    }

    /// Uploader label, empty when unknown.
    pub fn uploader(&self) -> &str {
        self.provenance.as_ref().map_or("", |p| p.uploader.as_str())
    }
}

/// Out-of-band fields sent once per upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMeta {
    /// Logical file name, normalized to pick the ledger key.
    pub name: Option<String>,
    /// Uploader label.
    pub uploader: String,
    /// Upload timestamp, 0 when unknown.
    pub ts: u64,
}

impl UploadMeta {
    /// Parse the `ts` form field. Anything that isn't a decimal u64 is 0.
    pub fn parse_ts(raw: &str) -> u64 {
        raw.trim().parse().unwrap_or(0)
    }
}

/// Outcome of [`FileStore::complete_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Ledger key the provenance was recorded under, if a name was given.
    pub path: Option<CanonicalPath>,
    /// Whether the provenance actually reached the ledger.
    pub metadata_recorded: bool,
}

/// An in-flight upload of one blob.
///
/// Chunks must be fed in arrival order. The size bound is enforced on every
/// chunk, so nothing past the limit is ever written.
#[derive(Debug)]
pub struct UploadSession {
    path: CanonicalPath,
    writer: BlobWriter,
    limit: u64,
}

impl UploadSession {
    /// Target of this upload.
    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.writer.written()
    }

    /// Append one chunk.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let total = self.writer.written() + chunk.len() as u64;
        if total > self.limit {
            tracing::warn!(
                path = %self.path,
                limit = self.limit,
                attempted = total,
                "upload exceeded maximum size mid-stream"
            );
            return Err(DriveError::SizeLimitExceeded { limit: self.limit });
        }
        self.writer.write(chunk).await
    }

    /// Close the blob, flushing it to durable storage.
    pub async fn finish(self) -> Result<u64> {
        let size = self.writer.finish().await?;
        tracing::info!(path = %self.path, size, "upload stored");
        Ok(size)
    }
}

/// A blob opened for download.
#[derive(Debug)]
pub struct Download {
    /// Canonical path that was resolved.
    pub path: CanonicalPath,
    /// Open read handle.
    pub reader: BlobReader,
}

impl Download {
    /// Name to offer the client when saving.
    pub fn file_name(&self) -> &str {
        self.path.basename()
    }
}

/// The metadata-tracked file store.
#[derive(Debug)]
pub struct FileStore {
    storage: FileStorage,
    ledger: MetadataLedger,
    max_upload_size: u64,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the namespace directory and
    /// an empty ledger if needed.
    pub async fn open(root: impl Into<PathBuf>, max_upload_size: u64) -> Result<Self> {
        let storage = FileStorage::new(root)?;
        let ledger = MetadataLedger::new(storage.clone());
        ledger.init().await?;

        tracing::info!(
            root = %storage.root().display(),
            max_upload_size,
            "file store opened"
        );

        Ok(Self {
            storage,
            ledger,
            max_upload_size,
        })
    }

    /// Open a store with the default 10 MiB upload bound.
    pub async fn open_default(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open(root, DEFAULT_MAX_FILE_SIZE).await
    }

    /// Underlying storage backend.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Metadata ledger.
    pub fn ledger(&self) -> &MetadataLedger {
        &self.ledger
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Reject a request whose announced length is over the bound.
    pub fn check_declared_size(&self, declared_len: Option<u64>) -> Result<()> {
        match declared_len {
            Some(len) if len > self.max_upload_size => {
                tracing::warn!(
                    declared = len,
                    limit = self.max_upload_size,
                    "rejecting oversized upload"
                );
                Err(DriveError::SizeLimitExceeded {
                    limit: self.max_upload_size,
                })
            }
            _ => Ok(()),
        }
    }

    /// Start an upload of `raw_name`.
    ///
    /// `declared_len` is the length the client announced for the request, if
    /// any. An announcement over the bound is rejected before the blob is
    /// opened. Otherwise the blob is opened and truncated.
    pub async fn begin_upload(
        &self,
        raw_name: &str,
        declared_len: Option<u64>,
    ) -> Result<UploadSession> {
        self.check_declared_size(declared_len)?;

        let path = normalize(raw_name)?;
        let writer = self.storage.create(&path).await?;
        tracing::debug!(path = %path, "upload started");

        Ok(UploadSession {
            path,
            writer,
            limit: self.max_upload_size,
        })
    }

    /// Finish an upload request by recording its provenance.
    ///
    /// Without a usable name nothing is recorded. A rejected name or a
    /// ledger write failure is logged and reported in the receipt but is not
    /// an error: the blob is already stored.
    pub async fn complete_upload(&self, meta: &UploadMeta) -> Result<UploadReceipt> {
        let name = match meta.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Ok(UploadReceipt {
                    path: None,
                    metadata_recorded: false,
                })
            }
        };

        let path = match normalize(name) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "upload stored without provenance");
                return Ok(UploadReceipt {
                    path: None,
                    metadata_recorded: false,
                });
            }
        };
        let metadata_recorded = match self.ledger.record(&path, meta.ts, &meta.uploader).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "upload stored without provenance");
                false
            }
        };

        Ok(UploadReceipt {
            path: Some(path),
            metadata_recorded,
        })
    }

    /// Store a complete blob in one call. Convenience for callers that
    /// already hold the whole body.
    pub async fn upload(
        &self,
        raw_name: &str,
        content: &[u8],
        meta: &UploadMeta,
    ) -> Result<UploadReceipt> {
        let mut session = self
            .begin_upload(raw_name, Some(content.len() as u64))
            .await?;
        session.write_chunk(content).await?;
        session.finish().await?;
        self.complete_upload(meta).await
    }

    /// List every blob with its provenance.
    ///
    /// Enumeration decides what exists; the ledger only annotates. Stored
    /// basenames are reported as they are on disk. Order is whatever the
    /// backend yields.
    pub async fn list(&self) -> Result<Vec<FileEntry>> {
        let blobs = self.storage.list().await?;
        let ledger = self.ledger.load().await;

        let entries = blobs
            .into_iter()
            .map(|blob| {
                let path = CanonicalPath::from_stored(&blob.basename);
                let provenance = ledger.get(&path).cloned();
                FileEntry {
                    path,
                    size: blob.size,
                    provenance,
                }
            })
            .collect();

        Ok(entries)
    }

    /// Resolve `raw_path` and open it for download.
    pub async fn open_download(&self, raw_path: &str) -> Result<Download> {
        let path = normalize(raw_path)?;
        match self.storage.open(&path).await {
            Ok(reader) => Ok(Download { path, reader }),
            Err(DriveError::NotFound(p)) => {
                tracing::debug!(path = %p, "download of missing file");
                Err(DriveError::NotFound(p))
            }
            Err(e) => Err(e),
        }
    }
}
