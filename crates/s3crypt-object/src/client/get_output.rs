//! Result type for [`ObjectStoreClient::get`](super::ObjectStoreClient::get).

use std::collections::BTreeMap;

use bytes::Bytes;
use object_store::ObjectMeta;

/// Result of a successful get call.
#[derive(Debug)]
pub struct GetOutput {
    /// Object body. Plaintext when returned by a decryption client.
    pub data: Bytes,
    /// MIME content-type, if the backend provides one.
    pub content_type: Option<String>,
    /// User metadata attached to the object.
    pub metadata: BTreeMap<String, String>,
    /// Object metadata (size, etag, last_modified, location) as stored.
    pub meta: ObjectMeta,
}

impl GetOutput {
    /// Number of bytes in [`data`](Self::data).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
