//! `s3crypt upload`.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Context;
use bytes::Bytes;
use s3crypt_object::client::{ObjectStoreClient, PutOutput};
use s3crypt_object::crypto::EncryptionClient;
use s3crypt_object::types::ObjectKey;

use crate::TRACING_TARGET_COMMAND;
use crate::config::UploadArgs;

/// Body uploaded when neither a file nor a message is given.
pub const DEFAULT_MESSAGE: &str = "Hello encryption world";

/// Client an upload goes through.
#[derive(Debug, Clone)]
pub enum UploadClient {
    /// Stores the payload as-is.
    Plain(ObjectStoreClient),
    /// Encrypts the payload with a fresh data key before storing it.
    Encrypted(EncryptionClient),
}

impl UploadClient {
    fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }

    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> s3crypt_object::Result<PutOutput> {
        match self {
            Self::Plain(client) => client.put(key, data, content_type).await,
            Self::Encrypted(client) => client.put(key, data, content_type).await,
        }
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Destination key.
    pub key: ObjectKey,
    /// Payload size before encryption.
    pub plaintext_size: usize,
    /// Size of the stored object body.
    pub stored_size: usize,
    /// Whether the body was encrypted client-side.
    pub encrypted: bool,
    /// Entity tag returned by the store, if any.
    pub e_tag: Option<String>,
    /// Wall-clock time spent in the upload.
    pub elapsed: Duration,
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.encrypted { "encrypted" } else { "plain" };
        write!(
            f,
            "Object successfully uploaded to '{}' ({} bytes, {mode}) in {:?}",
            self.key, self.plaintext_size, self.elapsed
        )
    }
}

/// Reads the payload named by `args`.
async fn payload(args: &UploadArgs) -> anyhow::Result<(Bytes, Option<String>)> {
    if let Some(path) = &args.file {
        let exists = tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("failed to access '{}'", path.display()))?;
        if !exists {
            anyhow::bail!("file '{}' does not exist", path.display());
        }

        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        return Ok((Bytes::from(data), args.content_type.clone()));
    }

    let message = args.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
    let content_type = args
        .content_type
        .clone()
        .unwrap_or_else(|| "text/plain".to_owned());
    Ok((Bytes::from(message.to_owned()), Some(content_type)))
}

/// Uploads the file or message in `args` to `key`.
pub async fn upload(
    args: &UploadArgs,
    key: &ObjectKey,
    client: &UploadClient,
) -> anyhow::Result<UploadReport> {
    let (data, content_type) = payload(args).await?;
    let plaintext_size = data.len();

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        key = %key,
        size = plaintext_size,
        encrypted = client.is_encrypted(),
        "Uploading object"
    );

    let started = Instant::now();
    let output = client
        .put(key, data, content_type.as_deref())
        .await
        .with_context(|| format!("failed to upload '{key}'"))?;

    Ok(UploadReport {
        key: key.clone(),
        plaintext_size,
        stored_size: output.size,
        encrypted: client.is_encrypted(),
        e_tag: output.e_tag,
        elapsed: started.elapsed(),
    })
}
