#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod client;
/// Encryption and decryption clients layered over [`ObjectStoreClient`](client::ObjectStoreClient).
pub mod crypto;
mod error;
/// Provider trait and the S3 provider factory.
pub mod providers;
/// Object keys and envelope save strategies.
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use error::{Error, Result};

/// Tracing target for object store operations.
pub const TRACING_TARGET: &str = "s3crypt_object";
