//! Convenience re-exports.

pub use crate::client::{GetOutput, ObjectStoreClient, PutOutput};
pub use crate::crypto::{DecryptionClient, EncryptionClient};
pub use crate::providers::{Client, S3Credentials, S3Provider};
pub use crate::types::{ObjectKey, SaveStrategy};
pub use crate::{Error, Result};
