//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── storage: StorageConfig        # Region, bucket, object key, endpoint, credentials
//! ├── encryption: EncryptionConfig  # KMS key id or local master key, save strategy
//! └── command: Command              # upload | download
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! s3crypt --bucket my-bucket --key hello.txt --kms-key-id alias/demo upload
//!
//! # Or via environment variables
//! S3CRYPT_BUCKET=my-bucket S3CRYPT_OBJECT_KEY=hello.txt s3crypt download
//! ```

mod encryption;
mod storage;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
pub use encryption::EncryptionConfig;
use serde::{Deserialize, Serialize};
pub use storage::StorageConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "s3crypt")]
#[command(about = "Upload and download client-side encrypted S3 objects")]
#[command(version)]
pub struct Cli {
    /// Object storage location and credentials.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Envelope encryption settings.
    #[clap(flatten)]
    pub encryption: EncryptionConfig,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// The single operation a run performs.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Upload a file or message to the configured object key.
    Upload(UploadArgs),
    /// Download the configured object key.
    Download(DownloadArgs),
}

/// Arguments for `s3crypt upload`.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct UploadArgs {
    /// File to upload.
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Inline message to upload instead of a file.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Content type stored with the object.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Upload the payload as-is, without client-side encryption.
    #[arg(long, default_value_t = false)]
    pub no_encryption: bool,
}

/// Arguments for `s3crypt download`.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct DownloadArgs {
    /// Write the object to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download the object as-is, without client-side decryption.
    #[arg(long, default_value_t = false)]
    pub no_encryption: bool,
}

impl Command {
    /// Whether this run goes through the encryption layer.
    pub fn encrypted(&self) -> bool {
        match self {
            Self::Upload(args) => !args.no_encryption,
            Self::Download(args) => !args.no_encryption,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Download(_) => "download",
        }
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This ensures .env files are loaded before clap parses arguments, so
    /// values from .env act as defaults through clap's `env` support.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .context("invalid storage configuration")?;
        if self.command.encrypted() {
            self.encryption
                .validate()
                .context("invalid encryption configuration")?;
        }
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.storage.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            encrypted = self.command.encrypted(),
            master_key = self.encryption.describe_master_key(),
            save_strategy = ?self.encryption.save_strategy(),
            "Operation configuration"
        );
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
