#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod cipher;
mod envelope;
mod error;
mod registry;
pub mod wrap;

#[doc(hidden)]
pub mod prelude;

pub use envelope::{Envelope, MaterialDescription, headers};
pub use error::{Error, Result};
pub use registry::{CekFactory, CryptoRegistry};

/// Tracing target for envelope encryption operations.
pub const TRACING_TARGET: &str = "s3crypt_crypto";

/// Content cipher algorithm name for AES-256-GCM without padding.
pub const AES_GCM_NO_PADDING: &str = "AES/GCM/NoPadding";

/// Wrap algorithm name for KMS data keys bound to an encryption context.
pub const KMS_CONTEXT_WRAP: &str = "kms+context";

/// Wrap algorithm name for legacy KMS data keys (decrypt only).
pub const KMS_WRAP: &str = "kms";

/// Wrap algorithm name for data keys wrapped under a local AES-256 master key.
pub const AES_GCM_WRAP: &str = "AES/GCM";

/// Reserved material description key carrying the content cipher algorithm.
pub const CEK_ALG_CONTEXT_KEY: &str = "aws:x-amz-cek-alg";

/// Material description key naming the KMS key in legacy envelopes.
pub const KMS_CMK_ID_KEY: &str = "kms_cmk_id";
