//! Canonical names for stored files.
//!
//! Every client-supplied name goes through [`normalize`] before it touches
//! storage. Only the final path segment survives, so `../../secret`,
//! `/etc/passwd` and `C:\Users\me\report.pdf` all land inside the namespace.

use std::fmt;

use serde::Serialize;

use super::NAMESPACE_ROOT;
use crate::{DriveError, Result};

/// A namespace-root-prefixed basename, e.g. `/u/report.pdf`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// The full canonical path, as used for ledger keys and listings.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The basename, without the namespace prefix.
    pub fn basename(&self) -> &str {
        &self.0[NAMESPACE_ROOT.len() + 1..]
    }

    /// Wrap a basename read back from the blob directory, as is.
    pub(crate) fn from_stored(basename: &str) -> Self {
        CanonicalPath(format!("{NAMESPACE_ROOT}/{basename}"))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Return the final path segment of `raw`.
///
/// Both `/` and `\` separate segments; browsers on Windows sometimes send
/// the full local path as the file name.
pub fn basename(raw: &str) -> &str {
    match raw.rfind(|c: char| c == '/' || c == '\\') {
        Some(i) => &raw[i + 1..],
        None => raw,
    }
}

/// Map a client-supplied name to its canonical path.
///
/// Fails with [`DriveError::Validation`] when the final segment cannot name
/// a file inside the namespace (empty, `.`, `..`, or control characters).
pub fn normalize(raw: &str) -> Result<CanonicalPath> {
    let base = basename(raw.trim());

    if base.is_empty() || base == "." || base == ".." {
        return Err(DriveError::Validation(format!(
            "unusable file name: {raw:?}"
        )));
    }
    if base.chars().any(char::is_control) {
        return Err(DriveError::Validation(
            "file name contains control characters".to_string(),
        ));
    }

    Ok(CanonicalPath(format!("{NAMESPACE_ROOT}/{base}")))
}
