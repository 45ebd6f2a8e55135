//! Path preconditions for pantheon commands.
//!
//! Every metadata directory handed to a pantheon command must be absolute and
//! must (or must not) exist before anything is spawned. Locations may carry a
//! query suffix (`/var/lib/juicefs/myfs?opt=1`); only the part before the
//! first `?` refers to the filesystem.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Scheme selecting the embedded metadata backend of the target tool.
pub const META_SCHEME: &str = "badger";

/// Returns `location` truncated at its first `?`.
pub fn strip_query(location: &str) -> &str {
    match location.find('?') {
        Some(idx) => &location[..idx],
        None => location,
    }
}

/// Checks that `path` is absolute and that its existence matches `must_exist`.
///
/// Absoluteness is checked first, so a relative path is rejected whether or
/// not it exists.
pub fn validate(path: &Path, must_exist: bool) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::NotAbsolutePath {
            path: path.to_path_buf(),
        });
    }

    let exists = fs::metadata(path).is_ok();

    if must_exist && !exists {
        return Err(Error::PathMissing {
            path: path.to_path_buf(),
        });
    }

    if !must_exist && exists {
        return Err(Error::PathAlreadyExists {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// A metadata location as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaLocation {
    raw: String,
}

impl MetaLocation {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The value exactly as the caller wrote it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The filesystem portion, without any query suffix.
    pub fn fs_path(&self) -> &Path {
        Path::new(strip_query(&self.raw))
    }

    /// The location rewritten for the target tool: `badger://<raw>`.
    pub fn encoded(&self) -> String {
        format!("{}://{}", META_SCHEME, self.raw)
    }

    /// Validates the filesystem portion of the location.
    pub fn validate(&self, must_exist: bool) -> Result<()> {
        validate(self.fs_path(), must_exist)
    }
}
