//! AES-256-GCM content cipher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};

use super::{
    CipherData, ContentCipher, ContentCipherBuilder, GCM_KEY_SIZE, GCM_NONCE_SIZE,
    GCM_TAG_LENGTH_BITS,
};
use crate::wrap::CipherDataGenerator;
use crate::{AES_GCM_NO_PADDING, Error, Result, TRACING_TARGET};

/// AES-256-GCM cipher over a whole payload.
///
/// The 128-bit tag is appended to the ciphertext and no additional
/// authenticated data is used, which matches the layout other S3 encryption
/// clients produce for `AES/GCM/NoPadding`. Only the first call to
/// [`encrypt`](ContentCipher::encrypt) succeeds; decryption is unrestricted.
pub struct AesGcmContentCipher {
    key: LessSafeKey,
    cipher_data: CipherData,
    sealed: AtomicBool,
}

impl AesGcmContentCipher {
    /// Creates a cipher from decrypted key material.
    pub fn new(cipher_data: CipherData) -> Result<Self> {
        if cipher_data.key.len() != GCM_KEY_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: GCM_KEY_SIZE,
                actual: cipher_data.key.len(),
            });
        }
        if cipher_data.iv.len() != GCM_NONCE_SIZE {
            return Err(Error::InvalidIvLength {
                expected: GCM_NONCE_SIZE,
                actual: cipher_data.iv.len(),
            });
        }
        if cipher_data.tag_length != GCM_TAG_LENGTH_BITS {
            return Err(Error::InvalidTagLength(cipher_data.tag_length));
        }

        let unbound = UnboundKey::new(&AES_256_GCM, &cipher_data.key)
            .map_err(|_| Error::cipher("failed to create AES-256-GCM key"))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            cipher_data,
            sealed: AtomicBool::new(false),
        })
    }

    /// Factory used by the [`CryptoRegistry`](crate::CryptoRegistry).
    pub fn boxed(cipher_data: CipherData) -> Result<Box<dyn ContentCipher>> {
        Ok(Box::new(Self::new(cipher_data)?))
    }

    fn nonce(&self) -> Result<Nonce> {
        Nonce::try_assume_unique_for_key(&self.cipher_data.iv).map_err(|_| Error::InvalidIvLength {
            expected: GCM_NONCE_SIZE,
            actual: self.cipher_data.iv.len(),
        })
    }
}

impl ContentCipher for AesGcmContentCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Bytes> {
        if self.sealed.swap(true, Ordering::AcqRel) {
            return Err(Error::CipherReused);
        }

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(self.nonce()?, Aad::empty(), &mut in_out)
            .map_err(|_| Error::cipher("AES-256-GCM seal failed"))?;
        Ok(Bytes::from(in_out))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Bytes> {
        let mut in_out = ciphertext.to_vec();
        let plaintext_len = self
            .key
            .open_in_place(self.nonce()?, Aad::empty(), &mut in_out)
            .map_err(|_| Error::Authentication)?
            .len();
        in_out.truncate(plaintext_len);
        Ok(Bytes::from(in_out))
    }

    fn cipher_data(&self) -> &CipherData {
        &self.cipher_data
    }
}

/// Builds [`AesGcmContentCipher`]s with a fresh data key per object.
#[derive(Clone)]
pub struct AesGcmContentCipherBuilder {
    generator: Arc<dyn CipherDataGenerator>,
}

impl AesGcmContentCipherBuilder {
    /// Creates a builder that asks `generator` for each object's data key.
    pub fn new(generator: Arc<dyn CipherDataGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait::async_trait]
impl ContentCipherBuilder for AesGcmContentCipherBuilder {
    async fn content_cipher(&self) -> Result<Box<dyn ContentCipher>> {
        let mut cipher_data = self
            .generator
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await?;
        cipher_data.tag_length = GCM_TAG_LENGTH_BITS;

        tracing::debug!(
            target: TRACING_TARGET,
            wrap_algorithm = %cipher_data.wrap_algorithm,
            cek_algorithm = %cipher_data.cek_algorithm,
            "generated content cipher"
        );

        AesGcmContentCipher::boxed(cipher_data)
    }
}
