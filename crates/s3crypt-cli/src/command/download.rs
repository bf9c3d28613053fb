//! `s3crypt download`.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use bytes::Bytes;
use s3crypt_object::client::{GetOutput, ObjectStoreClient};
use s3crypt_object::crypto::DecryptionClient;
use s3crypt_object::types::ObjectKey;

use crate::TRACING_TARGET_COMMAND;
use crate::config::DownloadArgs;

/// Client a download goes through.
#[derive(Debug, Clone)]
pub enum DownloadClient {
    /// Returns the stored body as-is.
    Plain(ObjectStoreClient),
    /// Loads the envelope and decrypts the stored body.
    Decrypted(DecryptionClient),
}

impl DownloadClient {
    fn is_encrypted(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }

    async fn get(&self, key: &ObjectKey) -> s3crypt_object::Result<GetOutput> {
        match self {
            Self::Plain(client) => client.get(key).await,
            Self::Decrypted(client) => client.get(key).await,
        }
    }
}

/// Outcome of a successful download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Source key.
    pub key: ObjectKey,
    /// Downloaded body, decrypted when the client decrypts.
    pub data: Bytes,
    /// Content type stored with the object.
    pub content_type: Option<String>,
    /// File the body was written to, if any.
    pub output: Option<PathBuf>,
    /// Whether the body was decrypted client-side.
    pub encrypted: bool,
    /// Wall-clock time spent in the download.
    pub elapsed: Duration,
}

impl DownloadReport {
    /// Number of body bytes downloaded.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.encrypted { "decrypted" } else { "plain" };
        write!(
            f,
            "Object successfully downloaded from '{}' ({} bytes, {mode}) in {:?}",
            self.key,
            self.size(),
            self.elapsed
        )?;
        if let Some(path) = &self.output {
            write!(f, " to '{}'", path.display())?;
        }
        Ok(())
    }
}

/// Downloads `key`, writing the body to `args.output` when set.
pub async fn download(
    args: &DownloadArgs,
    key: &ObjectKey,
    client: &DownloadClient,
) -> anyhow::Result<DownloadReport> {
    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        key = %key,
        encrypted = client.is_encrypted(),
        "Downloading object"
    );

    let started = Instant::now();
    let output = client
        .get(key)
        .await
        .with_context(|| format!("failed to download '{key}'"))?;
    let elapsed = started.elapsed();

    if let Some(path) = &args.output {
        tokio::fs::write(path, &output.data)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    Ok(DownloadReport {
        key: key.clone(),
        data: output.data,
        content_type: output.content_type,
        output: args.output.clone(),
        encrypted: client.is_encrypted(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use object_store::memory::InMemory;
    use s3crypt_crypto::CryptoRegistry;
    use s3crypt_crypto::cipher::AesGcmContentCipherBuilder;
    use s3crypt_crypto::wrap::AesGcmKeyWrap;
    use s3crypt_object::crypto::EncryptionClient;

    use super::*;

    const BODY: &[u8] = b"Hello encryption world";

    fn key() -> ObjectKey {
        ObjectKey::new("hello.txt").unwrap()
    }

    fn wrap() -> Arc<AesGcmKeyWrap> {
        Arc::new(AesGcmKeyWrap::new(&[5u8; 32]).unwrap())
    }

    async fn encrypted_store() -> ObjectStoreClient {
        let store = ObjectStoreClient::new(InMemory::new());
        EncryptionClient::new(store.clone(), Arc::new(AesGcmContentCipherBuilder::new(wrap())))
            .put(&key(), Bytes::from_static(BODY), Some("text/plain"))
            .await
            .unwrap();
        store
    }

    fn decrypted(store: ObjectStoreClient) -> DownloadClient {
        let mut registry = CryptoRegistry::new();
        registry.register_aes_gcm_wrap(wrap()).unwrap();
        registry.register_aes_gcm_content_cipher().unwrap();
        DownloadClient::Decrypted(DecryptionClient::new(store, registry).unwrap())
    }

    #[tokio::test]
    async fn decrypted_download() {
        let store = encrypted_store().await;
        let report = download(&DownloadArgs::default(), &key(), &decrypted(store))
            .await
            .unwrap();

        assert_eq!(report.data.as_ref(), BODY);
        assert_eq!(report.size(), BODY.len());
        assert_eq!(report.content_type.as_deref(), Some("text/plain"));
        assert!(report.to_string().contains("22 bytes, decrypted"));
    }

    #[tokio::test]
    async fn plain_download_returns_ciphertext() {
        let store = encrypted_store().await;
        let report = download(&DownloadArgs::default(), &key(), &DownloadClient::Plain(store))
            .await
            .unwrap();

        assert_ne!(report.data.as_ref(), BODY);
        assert_eq!(report.size(), BODY.len() + 16);
    }

    #[tokio::test]
    async fn download_to_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("hello.txt");
        let store = encrypted_store().await;
        let args = DownloadArgs {
            output: Some(path.clone()),
            ..Default::default()
        };
        let report = download(&args, &key(), &decrypted(store)).await.unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, BODY);
        assert!(report.to_string().ends_with(&format!("to '{}'", path.display())));
    }

    #[tokio::test]
    async fn missing_object() {
        let store = ObjectStoreClient::new(InMemory::new());
        let err = download(&DownloadArgs::default(), &key(), &decrypted(store))
            .await
            .unwrap_err();

        let cause = err.downcast_ref::<s3crypt_object::Error>().unwrap();
        assert!(matches!(cause, s3crypt_object::Error::NotFound(_)));
    }

    #[tokio::test]
    async fn plain_object_without_envelope() {
        let store = ObjectStoreClient::new(InMemory::new());
        store
            .put(&key(), Bytes::from_static(BODY), None)
            .await
            .unwrap();

        let err = download(&DownloadArgs::default(), &key(), &decrypted(store))
            .await
            .unwrap_err();
        let cause = err.downcast_ref::<s3crypt_object::Error>().unwrap();
        assert!(matches!(cause, s3crypt_object::Error::MissingEnvelope(_)));
    }
}
