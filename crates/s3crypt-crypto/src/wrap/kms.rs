//! AWS KMS key wrap handlers.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_kms::Client;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::DataKeySpec;
use ring::rand::SystemRandom;

use super::{CipherDataDecrypter, CipherDataGenerator, random_bytes};
use crate::cipher::{CipherData, GCM_KEY_SIZE};
use crate::{
    CEK_ALG_CONTEXT_KEY, Error, KMS_CMK_ID_KEY, KMS_CONTEXT_WRAP, MaterialDescription, Result,
    TRACING_TARGET,
};

/// Loads a KMS client for `region` from the default credential chain.
pub async fn load_kms_client(region: impl Into<String>) -> Client {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.into()))
        .load()
        .await;
    Client::new(&config)
}

/// Generates data keys through KMS `GenerateDataKey`, bound to an encryption
/// context that records the content cipher algorithm (`kms+context`).
#[derive(Clone, Debug)]
pub struct KmsContextKeyGenerator {
    client: Client,
    key_id: String,
    material_description: MaterialDescription,
}

impl KmsContextKeyGenerator {
    /// Creates a generator for the KMS key `key_id` (key id, alias or ARN).
    pub fn new(client: Client, key_id: impl Into<String>) -> Self {
        Self {
            client,
            key_id: key_id.into(),
            material_description: MaterialDescription::new(),
        }
    }

    /// Adds caller-supplied entries to the encryption context.
    pub fn with_material_description(mut self, material_description: MaterialDescription) -> Self {
        self.material_description = material_description;
        self
    }

    /// The configured master key identifier.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn encryption_context(&self, cek_algorithm: &str) -> Result<MaterialDescription> {
        if self.material_description.contains_key(CEK_ALG_CONTEXT_KEY) {
            return Err(Error::ReservedContextKey(CEK_ALG_CONTEXT_KEY.to_owned()));
        }
        Ok(self
            .material_description
            .clone()
            .with(CEK_ALG_CONTEXT_KEY, cek_algorithm))
    }
}

#[async_trait::async_trait]
impl CipherDataGenerator for KmsContextKeyGenerator {
    async fn generate_cipher_data(
        &self,
        key_size: usize,
        iv_size: usize,
        cek_algorithm: &str,
    ) -> Result<CipherData> {
        if self.key_id.is_empty() {
            return Err(Error::MissingCmkId);
        }
        if key_size != GCM_KEY_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: GCM_KEY_SIZE,
                actual: key_size,
            });
        }

        let material_description = self.encryption_context(cek_algorithm)?;

        tracing::debug!(
            target: TRACING_TARGET,
            key_id = %self.key_id,
            "requesting data key from kms"
        );

        let output = self
            .client
            .generate_data_key()
            .key_id(&self.key_id)
            .key_spec(DataKeySpec::Aes256)
            .set_encryption_context(Some(material_description.to_encryption_context()))
            .send()
            .await
            .map_err(|e| Error::kms(DisplayErrorContext(&e).to_string()))?;

        let key = output
            .plaintext()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| Error::kms("GenerateDataKey returned no plaintext key"))?;
        let encrypted_key = output
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| Error::kms("GenerateDataKey returned no ciphertext blob"))?;
        let iv = random_bytes(&SystemRandom::new(), iv_size)?;

        Ok(CipherData {
            key,
            iv,
            encrypted_key,
            wrap_algorithm: KMS_CONTEXT_WRAP.to_owned(),
            cek_algorithm: cek_algorithm.to_owned(),
            tag_length: 0,
            material_description,
        })
    }
}

#[async_trait::async_trait]
impl CipherDataDecrypter for KmsContextKeyGenerator {
    async fn decrypt_key(
        &self,
        encrypted_key: &[u8],
        material_description: &MaterialDescription,
        cek_algorithm: &str,
    ) -> Result<Vec<u8>> {
        let context = material_description
            .get(CEK_ALG_CONTEXT_KEY)
            .ok_or_else(|| {
                Error::malformed(format!("material description lacks {CEK_ALG_CONTEXT_KEY}"))
            })?;
        if context != cek_algorithm {
            return Err(Error::ContextMismatch {
                envelope: cek_algorithm.to_owned(),
                context: context.clone(),
            });
        }

        decrypt(
            &self.client,
            (!self.key_id.is_empty()).then_some(self.key_id.as_str()),
            encrypted_key,
            material_description,
        )
        .await
    }
}

/// Unwraps legacy `kms` data keys whose envelope names the KMS key in the
/// material description. Decrypt only.
#[derive(Clone, Debug)]
pub struct KmsKeyHandler {
    client: Client,
}

impl KmsKeyHandler {
    /// Creates a legacy handler using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl CipherDataDecrypter for KmsKeyHandler {
    async fn decrypt_key(
        &self,
        encrypted_key: &[u8],
        material_description: &MaterialDescription,
        _cek_algorithm: &str,
    ) -> Result<Vec<u8>> {
        let key_id = material_description
            .get(KMS_CMK_ID_KEY)
            .ok_or(Error::MissingCmkId)?;

        decrypt(
            &self.client,
            Some(key_id.as_str()),
            encrypted_key,
            material_description,
        )
        .await
    }
}

async fn decrypt(
    client: &Client,
    key_id: Option<&str>,
    encrypted_key: &[u8],
    material_description: &MaterialDescription,
) -> Result<Vec<u8>> {
    tracing::debug!(
        target: TRACING_TARGET,
        key_id = ?key_id,
        "decrypting data key with kms"
    );

    let output = client
        .decrypt()
        .set_key_id(key_id.map(str::to_owned))
        .ciphertext_blob(Blob::new(encrypted_key))
        .set_encryption_context(Some(material_description.to_encryption_context()))
        .send()
        .await
        .map_err(|e| Error::kms(DisplayErrorContext(&e).to_string()))?;

    output
        .plaintext()
        .map(|blob| blob.as_ref().to_vec())
        .ok_or_else(|| Error::kms("Decrypt returned no plaintext key"))
}

#[cfg(test)]
mod tests {
    use aws_sdk_kms::config::Credentials;

    use super::*;
    use crate::AES_GCM_NO_PADDING;
    use crate::cipher::GCM_NONCE_SIZE;

    fn offline_client() -> Client {
        let config = aws_sdk_kms::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
            .endpoint_url("http://127.0.0.1:9")
            .build();
        Client::from_conf(config)
    }

    #[tokio::test]
    async fn missing_key_id_fails_before_kms() {
        let generator = KmsContextKeyGenerator::new(offline_client(), "");
        let err = generator
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCmkId));
    }

    #[tokio::test]
    async fn reserved_context_key_rejected() {
        let generator = KmsContextKeyGenerator::new(offline_client(), "alias/test")
            .with_material_description(
                MaterialDescription::new().with(CEK_ALG_CONTEXT_KEY, "AES/CBC/PKCS5Padding"),
            );
        let err = generator
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReservedContextKey(_)));
    }

    #[tokio::test]
    async fn context_mismatch_fails_before_kms() {
        let generator = KmsContextKeyGenerator::new(offline_client(), "alias/test");
        let material_description =
            MaterialDescription::new().with(CEK_ALG_CONTEXT_KEY, "AES/CBC/PKCS5Padding");

        let err = generator
            .decrypt_key(&[1, 2, 3], &material_description, AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ContextMismatch { .. }));

        let err = generator
            .decrypt_key(&[1, 2, 3], &MaterialDescription::new(), AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)));
    }

    #[tokio::test]
    async fn legacy_handler_requires_cmk_id() {
        let handler = KmsKeyHandler::new(offline_client());
        let err = handler
            .decrypt_key(&[1, 2, 3], &MaterialDescription::new(), AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCmkId));
    }
}
