//! Upload and download operations.
//!
//! Each operation takes an already-connected client, so the same code path
//! serves both the plain and the client-side encrypted variants.

mod download;
mod upload;

pub use download::{DownloadClient, download};
pub use upload::{UploadClient, upload};
