//! Object storage location and credentials.

use anyhow::Context;
use clap::Args;
use s3crypt_object::client::ObjectStoreClient;
use s3crypt_object::providers::{Client, S3Credentials, S3Provider};
use s3crypt_object::types::ObjectKey;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where the object lives and how to reach it.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct StorageConfig {
    /// AWS region used for both S3 and KMS.
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Bucket holding the object.
    #[arg(long, env = "S3CRYPT_BUCKET", required = true)]
    pub bucket: String,

    /// Object key to upload to or download from.
    #[arg(long, env = "S3CRYPT_OBJECT_KEY", required = true)]
    pub key: String,

    /// Custom endpoint URL for S3-compatible services (e.g. MinIO).
    #[arg(long, env = "S3CRYPT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Static access key id; falls back to the default credential chain.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub access_key_id: Option<String>,

    /// Static secret access key.
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials.
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
}

impl StorageConfig {
    /// Validates the bucket and object key.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.region.trim().is_empty() {
            anyhow::bail!("region must not be empty");
        }
        if self.bucket.trim().is_empty() {
            anyhow::bail!("bucket must not be empty");
        }
        self.object_key()?;
        Ok(())
    }

    /// The configured object key.
    pub fn object_key(&self) -> anyhow::Result<ObjectKey> {
        ObjectKey::new(self.key.as_str())
            .with_context(|| format!("invalid object key '{}'", self.key))
    }

    /// Provider credentials built from this configuration.
    pub fn credentials(&self) -> S3Credentials {
        S3Credentials {
            endpoint: self.endpoint.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            ..S3Credentials::new(self.bucket.as_str(), self.region.as_str())
        }
    }

    /// Connects to the configured bucket.
    pub async fn connect(&self) -> anyhow::Result<ObjectStoreClient> {
        let provider = S3Provider::connect(&self.credentials())
            .await
            .with_context(|| format!("failed to connect to bucket '{}'", self.bucket))?;
        Ok(provider.into_inner())
    }

    /// Logs storage configuration without credentials.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            region = %self.region,
            bucket = %self.bucket,
            key = %self.key,
            endpoint = ?self.endpoint,
            static_credentials = self.access_key_id.is_some(),
            "Storage configuration"
        );
    }
}
