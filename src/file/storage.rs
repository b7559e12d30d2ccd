//! Blob storage for NexoDrive.
//!
//! The storage root holds two kinds of things:
//!
//! ```text
//! {root}/
//! ├── meta.json          <- documents, written atomically
//! └── u/                 <- blob namespace, flat, basenames only
//!     ├── report.pdf
//!     └── photo.jpg
//! ```
//!
//! Blobs are addressed by [`CanonicalPath`], which guarantees a single path
//! segment, so nothing here can reach outside `{root}/u`.

use std::io;
use std::path::{Path, PathBuf};

use futures::Stream;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use super::name::CanonicalPath;
use super::NAMESPACE_DIR;
use crate::{DriveError, Result};

/// Read size used when streaming a blob back to a client.
const READ_CHUNK_SIZE: usize = 16 * 1024;

/// A blob as seen by directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// File name inside the namespace directory.
    pub basename: String,
    /// Size in bytes at the time of enumeration.
    pub size: u64,
}

/// Storage backend for blobs and small documents.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    blob_dir: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage rooted at `root`.
    ///
    /// The root and the blob namespace directory are created if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let blob_dir = root.join(NAMESPACE_DIR);
        std::fs::create_dir_all(&blob_dir)?;

        Ok(Self { root, blob_dir })
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the blobs.
    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }

    /// Filesystem location of a blob.
    pub fn blob_path(&self, path: &CanonicalPath) -> PathBuf {
        self.blob_dir.join(path.basename())
    }

    /// Open a blob for writing, truncating any previous content.
    pub async fn create(&self, path: &CanonicalPath) -> Result<BlobWriter> {
        let file = File::create(self.blob_path(path)).await?;
        Ok(BlobWriter { file, written: 0 })
    }

    /// Open a blob for reading.
    pub async fn open(&self, path: &CanonicalPath) -> Result<BlobReader> {
        let not_found = || DriveError::NotFound(path.to_string());

        let file = match File::open(self.blob_path(path)).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(not_found());
        }

        Ok(BlobReader {
            file,
            len: meta.len(),
        })
    }

    /// Check if a blob exists.
    pub async fn exists(&self, path: &CanonicalPath) -> bool {
        fs::metadata(self.blob_path(path))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it didn't exist.
    pub async fn delete(&self, path: &CanonicalPath) -> Result<bool> {
        match fs::remove_file(self.blob_path(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the current size of a blob.
    pub async fn file_size(&self, path: &CanonicalPath) -> Result<u64> {
        match fs::metadata(self.blob_path(path)).await {
            Ok(m) if m.is_file() => Ok(m.len()),
            Ok(_) => Err(DriveError::NotFound(path.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DriveError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Enumerate the blob namespace.
    ///
    /// Directories are skipped. An entry that vanishes between enumeration
    /// and the size query is skipped as well. Failing to open the directory
    /// itself is an error.
    pub async fn list(&self) -> Result<Vec<BlobInfo>> {
        let mut dir = fs::read_dir(&self.blob_dir).await.map_err(|e| {
            DriveError::Storage(format!(
                "cannot open {}: {e}",
                self.blob_dir.display()
            ))
        })?;

        let mut blobs = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(entry = ?entry.path(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if meta.is_dir() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(basename) => blobs.push(BlobInfo {
                    basename,
                    size: meta.len(),
                }),
                Err(raw) => {
                    tracing::warn!(entry = ?raw, "skipping blob with a non UTF-8 name");
                }
            }
        }

        Ok(blobs)
    }

    /// Read a document stored at the root, or `None` if it doesn't exist.
    pub async fn read_document(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a document exists at the root.
    pub async fn document_exists(&self, name: &str) -> bool {
        fs::metadata(self.root.join(name)).await.is_ok()
    }

    /// Replace a document at the root.
    ///
    /// The content goes to a uniquely named temporary file which is synced
    /// and then renamed over the target, so readers see either the old or
    /// the new document in full.
    pub async fn write_document_atomic(&self, name: &str, content: &[u8]) -> Result<()> {
        let target = self.root.join(name);
        let temp = self.root.join(format!(".{name}.{}.tmp", Uuid::new_v4()));

        let result = async {
            let mut file = File::create(&temp).await?;
            file.write_all(content).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &target).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(())
    }
}

/// Write handle for one blob upload.
#[derive(Debug)]
pub struct BlobWriter {
    file: File,
    written: u64,
}

impl BlobWriter {
    /// Append bytes.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data).await?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and sync to durable storage. Returns the total size.
    pub async fn finish(mut self) -> Result<u64> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.written)
    }
}

/// Read handle for one blob.
#[derive(Debug)]
pub struct BlobReader {
    file: File,
    len: u64,
}

impl BlobReader {
    /// Size of the blob when it was opened.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole blob into memory.
    pub async fn read_all(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len as usize);
        self.file.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Turn the handle into a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static {
        futures::stream::try_unfold(self.file, |mut file| async move {
            let mut buf = vec![0u8; READ_CHUNK_SIZE];
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok::<_, io::Error>(None);
            }
            buf.truncate(n);
            Ok::<_, io::Error>(Some((buf, file)))
        })
    }
}
