//! Decrypting download client.

use std::sync::Arc;

use s3crypt_crypto::{CryptoRegistry, Envelope, Error as CryptoError};

use crate::client::{GetOutput, ObjectStoreClient};
use crate::types::ObjectKey;
use crate::{Error, Result, TRACING_TARGET};

/// Downloads and decrypts objects written by an [`EncryptionClient`](super::EncryptionClient)
/// or any client using the same envelope layout.
#[derive(Clone, Debug)]
pub struct DecryptionClient {
    client: ObjectStoreClient,
    registry: Arc<CryptoRegistry>,
}

impl DecryptionClient {
    /// Creates a client that only accepts the algorithms in `registry`.
    ///
    /// Fails when the registry lacks either a wrap or a content cipher
    /// algorithm.
    pub fn new(client: ObjectStoreClient, registry: CryptoRegistry) -> Result<Self> {
        registry.validate()?;
        Ok(Self {
            client,
            registry: Arc::new(registry),
        })
    }

    /// Downloads `key` and returns its decrypted body.
    #[tracing::instrument(name = "object.decrypt_get", skip(self), fields(key = %key))]
    pub async fn get(&self, key: &ObjectKey) -> Result<GetOutput> {
        let mut output = self.client.get(key).await?;
        let envelope = self.load_envelope(key, &output).await?;

        let decrypter = self
            .registry
            .get_wrap(&envelope.wrap_algorithm)
            .ok_or_else(|| CryptoError::InvalidWrapAlgorithm(envelope.wrap_algorithm.clone()))?;
        let factory = self
            .registry
            .get_cek(&envelope.cek_algorithm)
            .ok_or_else(|| CryptoError::InvalidCekAlgorithm(envelope.cek_algorithm.clone()))?;

        let key_material = decrypter
            .decrypt_key(
                &envelope.encrypted_key()?,
                &envelope.material_description()?,
                &envelope.cek_algorithm,
            )
            .await?;
        let cipher = (*factory)(envelope.to_cipher_data(key_material)?)?;
        output.data = cipher.decrypt(&output.data)?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            wrap_algorithm = %envelope.wrap_algorithm,
            cek_algorithm = %envelope.cek_algorithm,
            plaintext_size = output.data.len(),
            "decrypted object downloaded"
        );

        Ok(output)
    }

    /// Reads the envelope from object metadata, falling back to the
    /// instruction file.
    async fn load_envelope(&self, key: &ObjectKey, output: &GetOutput) -> Result<Envelope> {
        if let Some(envelope) = Envelope::from_headers(|name| output.metadata.get(name).cloned())? {
            return Ok(envelope);
        }

        match self.client.get(&key.instruction_key()?).await {
            Ok(instruction) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    key = %key,
                    "envelope loaded from instruction file"
                );
                Ok(Envelope::from_json(&instruction.data)?)
            }
            Err(Error::NotFound(_)) => Err(Error::MissingEnvelope(key.to_string())),
            Err(err) => Err(err),
        }
    }
}
