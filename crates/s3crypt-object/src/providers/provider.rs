//! Provider trait for creating authenticated client connections.

use serde::de::DeserializeOwned;

use crate::Result;

/// Factory for authenticated connections to an object storage service.
///
/// Implementations turn typed credentials into a connected client.
#[allow(async_fn_in_trait)]
pub trait Client: Sized + Send + Sync + 'static {
    /// Strongly-typed credentials for this provider.
    type Credentials: DeserializeOwned + Send;

    /// Unique identifier (e.g. "s3").
    const ID: &str;

    /// Create a connected client instance.
    async fn connect(creds: &Self::Credentials) -> Result<Self>;
}
