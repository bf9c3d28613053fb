//! Content ciphers and the builders that create them.
//!
//! A [`ContentCipherBuilder`] asks a key generator for fresh per-object
//! [`CipherData`] and returns a [`ContentCipher`] bound to it. Decryption goes
//! the other way: the envelope is turned back into [`CipherData`] and a cipher
//! is rebuilt from it through the [`CryptoRegistry`](crate::CryptoRegistry).

mod aes_gcm;
mod cipher_data;

pub use aes_gcm::{AesGcmContentCipher, AesGcmContentCipherBuilder};
pub use cipher_data::CipherData;

use bytes::Bytes;

use crate::Result;

/// AES-256 data key size in bytes.
pub const GCM_KEY_SIZE: usize = 32;

/// GCM nonce (IV) size in bytes.
pub const GCM_NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes.
pub const GCM_TAG_SIZE: usize = 16;

/// GCM authentication tag length in bits, as recorded in the envelope.
pub const GCM_TAG_LENGTH_BITS: u32 = (GCM_TAG_SIZE * 8) as u32;

/// Encrypts and decrypts whole object bodies with a single data key.
///
/// A cipher carries one key and IV, so it encrypts exactly one object.
/// Build a new cipher for every upload.
pub trait ContentCipher: Send + Sync {
    /// Encrypt `plaintext`, returning ciphertext with any tag appended.
    ///
    /// Fails with [`Error::CipherReused`](crate::Error::CipherReused) when
    /// called a second time on the same cipher.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Bytes>;

    /// Decrypt and authenticate `ciphertext`.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Bytes>;

    /// Key material and algorithm names backing this cipher.
    fn cipher_data(&self) -> &CipherData;
}

/// Creates a [`ContentCipher`] with freshly generated key material.
#[async_trait::async_trait]
pub trait ContentCipherBuilder: Send + Sync {
    /// Generate a new data key and return a cipher bound to it.
    async fn content_cipher(&self) -> Result<Box<dyn ContentCipher>>;
}
