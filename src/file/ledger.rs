//! Metadata ledger: upload provenance keyed by canonical path.
//!
//! The ledger is one JSON document at the storage root:
//!
//! ```json
//! { "/u/report.pdf": { "ts": 1700000000, "uploader": "alice" } }
//! ```
//!
//! It is advisory. Entries may outlive their blobs and blobs may have no
//! entry; listing treats blob existence as the truth and the ledger only
//! as annotation. Reads never fail (a missing or corrupt document is an
//! empty ledger). Every mutation rewrites the whole document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::name::CanonicalPath;
use super::storage::FileStorage;
use super::LEDGER_DOCUMENT;
use crate::{DriveError, Result};

/// Provenance recorded for one upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Client-supplied upload timestamp, 0 when unknown.
    #[serde(default)]
    pub ts: u64,
    /// Free-form uploader label, empty when unknown.
    #[serde(default)]
    pub uploader: String,
}

impl LedgerEntry {
    /// Create a new entry.
    pub fn new(ts: u64, uploader: impl Into<String>) -> Self {
        Self {
            ts,
            uploader: uploader.into(),
        }
    }
}

/// In-memory view of the ledger document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace or insert the entry for `path`, leaving other entries alone.
    pub fn upsert(mut self, path: &CanonicalPath, ts: u64, uploader: impl Into<String>) -> Self {
        self.entries
            .insert(path.as_str().to_string(), LedgerEntry::new(ts, uploader));
        self
    }

    /// Look up the entry for `path`.
    pub fn get(&self, path: &CanonicalPath) -> Option<&LedgerEntry> {
        self.entries.get(path.as_str())
    }

    /// Number of entries, orphans included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, entry)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decode a ledger document.
    ///
    /// The top level must be a JSON object. Entries whose value does not
    /// decode as a [`LedgerEntry`] are dropped; the rest are kept.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)?;

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            match serde_json::from_value::<LedgerEntry>(value) {
                Ok(entry) => {
                    entries.insert(key, entry);
                }
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "dropping malformed ledger entry");
                }
            }
        }

        Ok(Self { entries })
    }

    /// Encode the ledger as a JSON document.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// The persisted ledger and its single-writer lock.
///
/// [`record`](Self::record) holds the lock across its load-upsert-save
/// cycle, so concurrent uploads finishing together cannot drop each other's
/// entries. [`load`](Self::load) does not take the lock; the atomic document
/// write means it sees either the previous or the next document.
#[derive(Debug)]
pub struct MetadataLedger {
    storage: FileStorage,
    write_lock: Mutex<()>,
}

impl MetadataLedger {
    /// Create a ledger persisted in `storage`.
    pub fn new(storage: FileStorage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Create the document as an empty object if it doesn't exist yet.
    pub async fn init(&self) -> Result<()> {
        if !self.storage.document_exists(LEDGER_DOCUMENT).await {
            self.save(&Ledger::new()).await?;
            tracing::info!(document = LEDGER_DOCUMENT, "initialized empty metadata ledger");
        }
        Ok(())
    }

    /// Read the ledger. Absent or unreadable documents yield an empty ledger.
    pub async fn load(&self) -> Ledger {
        let bytes = match self.storage.read_document(LEDGER_DOCUMENT).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ledger::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read metadata ledger, using empty ledger");
                return Ledger::new();
            }
        };

        match Ledger::from_json(&bytes) {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(error = %e, "metadata ledger is unparsable, using empty ledger");
                Ledger::new()
            }
        }
    }

    /// Overwrite the persisted document with `ledger`.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let bytes = ledger.to_json()?;
        self.storage
            .write_document_atomic(LEDGER_DOCUMENT, &bytes)
            .await
            .map_err(|e| DriveError::Persistence(format!("cannot write ledger: {e}")))
    }

    /// Record provenance for `path` under the write lock.
    pub async fn record(&self, path: &CanonicalPath, ts: u64, uploader: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let ledger = self.load().await.upsert(path, ts, uploader);
        self.save(&ledger).await
    }
}
