//! Encrypting upload client.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use s3crypt_crypto::Envelope;
use s3crypt_crypto::cipher::ContentCipherBuilder;

use crate::client::{ObjectStoreClient, PutOutput};
use crate::types::{ObjectKey, SaveStrategy};
use crate::{Result, TRACING_TARGET};

/// Uploads objects encrypted with a per-object data key.
#[derive(Clone)]
pub struct EncryptionClient {
    client: ObjectStoreClient,
    builder: Arc<dyn ContentCipherBuilder>,
    strategy: SaveStrategy,
}

impl EncryptionClient {
    /// Creates a client that encrypts with ciphers from `builder` and stores
    /// envelopes as object metadata.
    pub fn new(client: ObjectStoreClient, builder: Arc<dyn ContentCipherBuilder>) -> Self {
        Self {
            client,
            builder,
            strategy: SaveStrategy::default(),
        }
    }

    /// Sets where envelopes are stored.
    pub fn with_save_strategy(mut self, strategy: SaveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Encrypts `data` and uploads it to `key`.
    ///
    /// The returned [`PutOutput::size`] is the ciphertext size.
    #[tracing::instrument(
        name = "object.encrypt_put",
        skip(self, data),
        fields(key = %key, size = data.len(), strategy = ?self.strategy)
    )]
    pub async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput> {
        let cipher = self.builder.content_cipher().await?;
        let ciphertext = cipher.encrypt(&data)?;
        let envelope = Envelope::from_cipher_data(cipher.cipher_data(), data.len())?;

        let output = match self.strategy {
            SaveStrategy::ObjectMetadata => {
                self.client
                    .put_with_metadata(key, ciphertext, content_type, &envelope.to_headers())
                    .await?
            }
            SaveStrategy::InstructionFile => {
                // The envelope goes first so no ciphertext is ever stored
                // without a way to decrypt it.
                let instruction_key = key.instruction_key()?;
                self.client
                    .put(
                        &instruction_key,
                        Bytes::from(envelope.to_json()?),
                        Some("application/json"),
                    )
                    .await?;

                match self.client.put(key, ciphertext, content_type).await {
                    Ok(output) => output,
                    Err(err) => {
                        tracing::warn!(
                            target: TRACING_TARGET,
                            key = %key,
                            instruction_key = %instruction_key,
                            error = %err,
                            "object upload failed after its instruction file was written"
                        );
                        return Err(err);
                    }
                }
            }
        };

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            wrap_algorithm = %envelope.wrap_algorithm,
            cek_algorithm = %envelope.cek_algorithm,
            ciphertext_size = output.size,
            "encrypted object uploaded"
        );

        Ok(output)
    }
}

impl fmt::Debug for EncryptionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionClient")
            .field("client", &self.client)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use object_store::local::LocalFileSystem;
    use object_store::memory::InMemory;
    use s3crypt_crypto::cipher::{AesGcmContentCipherBuilder, GCM_KEY_SIZE};
    use s3crypt_crypto::wrap::AesGcmKeyWrap;

    use super::*;
    use crate::Error;

    fn builder() -> Arc<dyn ContentCipherBuilder> {
        let wrap = AesGcmKeyWrap::new(&[11u8; GCM_KEY_SIZE]).unwrap();
        Arc::new(AesGcmContentCipherBuilder::new(Arc::new(wrap)))
    }

    #[tokio::test]
    async fn instruction_file_keeps_key_verbatim() {
        let store = ObjectStoreClient::new(InMemory::new());
        let key = ObjectKey::new("notes#1.txt").unwrap();
        EncryptionClient::new(store.clone(), builder())
            .with_save_strategy(SaveStrategy::InstructionFile)
            .put(&key, Bytes::from_static(b"payload"), None)
            .await
            .unwrap();

        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.meta.location.as_ref(), "notes#1.txt");
        let instruction = store.get(&key.instruction_key().unwrap()).await.unwrap();
        assert_eq!(instruction.meta.location.as_ref(), "notes#1.txt.instruction");
    }

    #[tokio::test]
    async fn failed_instruction_file_leaves_no_ciphertext() {
        let temp = tempfile::TempDir::new().unwrap();
        // A directory where the instruction file belongs makes that put fail.
        std::fs::create_dir(temp.path().join("secret.txt.instruction")).unwrap();
        let store = ObjectStoreClient::new(LocalFileSystem::new_with_prefix(temp.path()).unwrap());
        let key = ObjectKey::new("secret.txt").unwrap();

        let result = EncryptionClient::new(store.clone(), builder())
            .with_save_strategy(SaveStrategy::InstructionFile)
            .put(&key, Bytes::from_static(b"payload"), None)
            .await;

        assert!(result.is_err());
        assert!(matches!(store.get(&key).await, Err(Error::NotFound(_))));
    }
}
