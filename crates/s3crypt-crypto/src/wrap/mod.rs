//! Key wrap handlers.
//!
//! A handler plays the role of the master key: it generates per-object data
//! keys already wrapped under the master key, and unwraps them again on
//! download. Without the handler the data cannot be decrypted.

mod aes_gcm;
mod kms;

pub use aes_gcm::AesGcmKeyWrap;
pub use kms::{KmsContextKeyGenerator, KmsKeyHandler, load_kms_client};

use ring::rand::{SecureRandom, SystemRandom};

use crate::cipher::CipherData;
use crate::{Error, MaterialDescription, Result};

/// Generates fresh key material for a content cipher.
#[async_trait::async_trait]
pub trait CipherDataGenerator: Send + Sync {
    /// Produce a data key of `key_size` bytes, an IV of `iv_size` bytes, and
    /// the data key wrapped under the master key.
    async fn generate_cipher_data(
        &self,
        key_size: usize,
        iv_size: usize,
        cek_algorithm: &str,
    ) -> Result<CipherData>;
}

/// Unwraps data keys stored in an envelope.
#[async_trait::async_trait]
pub trait CipherDataDecrypter: Send + Sync {
    /// Return the plaintext data key for `encrypted_key`.
    async fn decrypt_key(
        &self,
        encrypted_key: &[u8],
        material_description: &MaterialDescription,
        cek_algorithm: &str,
    ) -> Result<Vec<u8>>;
}

/// Fills a new buffer of `len` bytes from the system CSPRNG.
pub(crate) fn random_bytes(rng: &SystemRandom, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| Error::cipher("system random number generator failed"))?;
    Ok(buf)
}
