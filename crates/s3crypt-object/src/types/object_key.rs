//! Validated object key.

use std::str::FromStr;

use derive_more::Display;
use object_store::path::Path;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest key S3 accepts, in bytes.
const MAX_KEY_LEN: usize = 1024;

/// A non-empty object key within a bucket.
///
/// The key reaches the store exactly as given: characters such as `#`, `~`
/// or `[` are kept verbatim, and keys the store cannot address without
/// rewriting them (`a//b`, `a/./b`, `a/../b`, a trailing `/`) are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(Path);

impl ObjectKey {
    /// Validates and wraps `key`. Leading slashes are stripped; a key that is
    /// empty after that is rejected.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim_start_matches('/');
        if trimmed.trim().is_empty() {
            return Err(Error::InvalidObjectKey(format!("{key:?} is empty")));
        }
        if trimmed.len() > MAX_KEY_LEN {
            return Err(Error::InvalidObjectKey(format!(
                "key is {} bytes, the limit is {MAX_KEY_LEN}",
                trimmed.len()
            )));
        }
        Self::parse(trimmed)
    }

    /// Parses `raw` without rewriting it.
    fn parse(raw: &str) -> Result<Self> {
        let path = Path::parse(raw)
            .map_err(|e| Error::InvalidObjectKey(format!("{raw:?}: {e}")))?;
        if path.as_ref() != raw {
            return Err(Error::InvalidObjectKey(format!(
                "{raw:?} would be stored as {:?}",
                path.as_ref()
            )));
        }
        Ok(Self(path))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// Key of the instruction file that holds this object's envelope.
    pub fn instruction_key(&self) -> Result<Self> {
        Self::parse(&format!("{}{}", self.as_str(), super::INSTRUCTION_SUFFIX))
    }

    /// The [`object_store`] path addressing this key.
    pub(crate) fn to_path(&self) -> &Path {
        &self.0
    }
}

impl FromStr for ObjectKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0.into()
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
