//! Client-side encryption over [`ObjectStoreClient`](crate::client::ObjectStoreClient).
//!
//! [`EncryptionClient`] encrypts each body with a fresh data key before
//! upload and saves the envelope according to its [`SaveStrategy`](crate::types::SaveStrategy).
//! [`DecryptionClient`] loads the envelope, unwraps the data key with the
//! handler registered for the envelope's wrap algorithm, and decrypts.

mod decryption;
mod encryption;

pub use decryption::DecryptionClient;
pub use encryption::EncryptionClient;
