//! Envelope encryption settings: master key source and save strategy.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use s3crypt_crypto::CryptoRegistry;
use s3crypt_crypto::cipher::{AesGcmContentCipherBuilder, ContentCipherBuilder};
use s3crypt_crypto::wrap::{AesGcmKeyWrap, KmsContextKeyGenerator, load_kms_client};
use s3crypt_object::types::SaveStrategy;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Master key and envelope placement for encrypted runs.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// KMS key id, alias or ARN used to generate data keys.
    #[arg(long, env = "S3CRYPT_KMS_KEY_ID", conflicts_with = "master_key")]
    pub kms_key_id: Option<String>,

    /// Base64-encoded 256-bit AES master key used instead of KMS.
    #[arg(long, env = "S3CRYPT_MASTER_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub master_key: Option<String>,

    /// Store the envelope in a `<key>.instruction` object instead of metadata.
    #[arg(long, env = "S3CRYPT_INSTRUCTION_FILE", default_value_t = false)]
    pub instruction_file: bool,

    /// Also accept objects wrapped with the legacy `kms` algorithm.
    #[arg(long, env = "S3CRYPT_LEGACY_KMS", default_value_t = false)]
    pub legacy_kms: bool,
}

impl EncryptionConfig {
    /// Validates the master key encoding and length.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(master_key) = &self.master_key {
            AesGcmKeyWrap::from_base64(master_key).context("invalid master key")?;
        }
        Ok(())
    }

    /// Where encrypted uploads put their envelope.
    pub fn save_strategy(&self) -> SaveStrategy {
        if self.instruction_file {
            SaveStrategy::InstructionFile
        } else {
            SaveStrategy::ObjectMetadata
        }
    }

    /// Names the master key source for logging.
    pub fn describe_master_key(&self) -> &'static str {
        match (&self.master_key, &self.kms_key_id) {
            (Some(_), _) => "local",
            (None, Some(_)) => "kms",
            (None, None) => "none",
        }
    }

    fn local_wrap(&self) -> anyhow::Result<Option<Arc<AesGcmKeyWrap>>> {
        self.master_key
            .as_deref()
            .map(|encoded| {
                AesGcmKeyWrap::from_base64(encoded)
                    .map(Arc::new)
                    .context("invalid master key")
            })
            .transpose()
    }

    /// Builds the content cipher builder used for encrypted uploads.
    ///
    /// Without a local master key, data keys come from KMS. A missing KMS key
    /// id is reported when the first data key is requested.
    pub async fn cipher_builder(
        &self,
        region: &str,
    ) -> anyhow::Result<Arc<dyn ContentCipherBuilder>> {
        if let Some(wrap) = self.local_wrap()? {
            tracing::debug!(target: TRACING_TARGET_CONFIG, "using local AES/GCM master key");
            return Ok(Arc::new(AesGcmContentCipherBuilder::new(wrap)));
        }

        let client = load_kms_client(region).await;
        let key_id = self.kms_key_id.clone().unwrap_or_default();
        let generator = KmsContextKeyGenerator::new(client, key_id);
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            key_id = generator.key_id(),
            "using KMS data key generator"
        );
        Ok(Arc::new(AesGcmContentCipherBuilder::new(Arc::new(generator))))
    }

    /// Builds the registry of algorithms accepted for encrypted downloads.
    ///
    /// Always accepts `AES/GCM/NoPadding` content wrapped with `kms+context`.
    /// A local master key adds `AES/GCM`; `--legacy-kms` adds `kms`.
    pub async fn registry(&self, region: &str) -> anyhow::Result<CryptoRegistry> {
        let client = load_kms_client(region).await;
        let mut registry = CryptoRegistry::new();
        registry.register_aes_gcm_content_cipher()?;
        registry.register_kms_context_wrap(KmsContextKeyGenerator::new(
            client.clone(),
            self.kms_key_id.clone().unwrap_or_default(),
        ))?;

        if let Some(wrap) = self.local_wrap()? {
            registry.register_aes_gcm_wrap(wrap)?;
        }
        if self.legacy_kms {
            registry.register_kms_wrap(client)?;
        }

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            wrap = ?registry.wrap_algorithms(),
            cek = ?registry.cek_algorithms(),
            "decryption registry configured"
        );
        Ok(registry)
    }
}
