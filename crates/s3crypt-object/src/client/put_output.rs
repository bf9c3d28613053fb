//! Result type for [`ObjectStoreClient::put`](super::ObjectStoreClient::put) and
//! [`ObjectStoreClient::put_with_metadata`](super::ObjectStoreClient::put_with_metadata).

/// Result of a successful put operation.
#[derive(Debug)]
pub struct PutOutput {
    /// Unique identifier for the newly created object, if the backend provides one.
    pub e_tag: Option<String>,
    /// A version indicator for the newly created object, if the backend provides one.
    pub version: Option<String>,
    /// Number of bytes sent to the store.
    pub size: usize,
}

impl PutOutput {
    pub(crate) fn new(result: object_store::PutResult, size: usize) -> Self {
        Self {
            e_tag: result.e_tag,
            version: result.version,
            size,
        }
    }
}
