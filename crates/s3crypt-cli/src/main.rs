#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::io::{self, Write};
use std::process;

use anyhow::Context;
use s3crypt_object::crypto::{DecryptionClient, EncryptionClient};

use crate::command::{DownloadClient, UploadClient};
use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "s3crypt_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "s3crypt_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "s3crypt_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "s3crypt_cli::command";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let key = cli.storage.object_key()?;
    let store = cli.storage.connect().await?;
    let region = cli.storage.region.as_str();

    match &cli.command {
        Command::Upload(args) => {
            let client = if args.no_encryption {
                UploadClient::Plain(store)
            } else {
                let builder = cli.encryption.cipher_builder(region).await?;
                UploadClient::Encrypted(
                    EncryptionClient::new(store, builder)
                        .with_save_strategy(cli.encryption.save_strategy()),
                )
            };

            let report = command::upload(args, &key, &client).await?;
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                stored_size = report.stored_size,
                e_tag = ?report.e_tag,
                "upload complete"
            );
            println!("{report}");
        }
        Command::Download(args) => {
            let client = if args.no_encryption {
                DownloadClient::Plain(store)
            } else {
                let registry = cli.encryption.registry(region).await?;
                DownloadClient::Decrypted(DecryptionClient::new(store, registry)?)
            };

            let report = command::download(args, &key, &client).await?;
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                size = report.size(),
                content_type = ?report.content_type,
                "download complete"
            );
            if report.output.is_some() {
                println!("{report}");
            } else {
                // Keep stdout to the body itself.
                eprintln!("{report}");
                io::stdout()
                    .lock()
                    .write_all(&report.data)
                    .context("failed to write object to stdout")?;
            }
        }
    }

    Ok(())
}
