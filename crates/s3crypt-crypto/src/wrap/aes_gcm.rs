//! Local AES-256 master key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::SystemRandom;

use super::{CipherDataDecrypter, CipherDataGenerator, random_bytes};
use crate::cipher::{CipherData, GCM_KEY_SIZE, GCM_NONCE_SIZE};
use crate::{AES_GCM_WRAP, CEK_ALG_CONTEXT_KEY, Error, MaterialDescription, Result};

/// Wraps data keys under a 256-bit AES key held by the caller.
///
/// The wrapped key is `nonce || ciphertext || tag`, with the content cipher
/// algorithm name as additional authenticated data so a wrapped key cannot be
/// replayed with a different cipher.
pub struct AesGcmKeyWrap {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl AesGcmKeyWrap {
    /// Creates a wrap handler from raw master key bytes.
    pub fn new(master_key: &[u8]) -> Result<Self> {
        if master_key.len() != GCM_KEY_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: GCM_KEY_SIZE,
                actual: master_key.len(),
            });
        }
        let unbound = UnboundKey::new(&AES_256_GCM, master_key)
            .map_err(|_| Error::cipher("failed to create AES-256-GCM master key"))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Creates a wrap handler from a base64-encoded master key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = STANDARD.decode(encoded.trim())?;
        Self::new(&raw)
    }

    fn wrap(&self, data_key: &[u8], cek_algorithm: &str) -> Result<Vec<u8>> {
        let nonce_bytes = random_bytes(&self.rng, GCM_NONCE_SIZE)?;
        let nonce = Nonce::try_assume_unique_for_key(&nonce_bytes)
            .map_err(|_| Error::cipher("invalid wrap nonce"))?;

        let mut in_out = data_key.to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::from(cek_algorithm.as_bytes()), &mut in_out)
            .map_err(|_| Error::cipher("failed to wrap data key"))?;

        let mut wrapped = nonce_bytes;
        wrapped.extend_from_slice(&in_out);
        Ok(wrapped)
    }

    fn unwrap(&self, wrapped: &[u8], cek_algorithm: &str) -> Result<Vec<u8>> {
        if wrapped.len() <= GCM_NONCE_SIZE {
            return Err(Error::malformed("wrapped data key is too short"));
        }
        let (nonce_bytes, sealed) = wrapped.split_at(GCM_NONCE_SIZE);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| Error::malformed("invalid wrap nonce"))?;

        let mut in_out = sealed.to_vec();
        let len = self
            .key
            .open_in_place(nonce, Aad::from(cek_algorithm.as_bytes()), &mut in_out)
            .map_err(|_| Error::Authentication)?
            .len();
        in_out.truncate(len);
        Ok(in_out)
    }
}

#[async_trait::async_trait]
impl CipherDataGenerator for AesGcmKeyWrap {
    async fn generate_cipher_data(
        &self,
        key_size: usize,
        iv_size: usize,
        cek_algorithm: &str,
    ) -> Result<CipherData> {
        let key = random_bytes(&self.rng, key_size)?;
        let iv = random_bytes(&self.rng, iv_size)?;
        let encrypted_key = self.wrap(&key, cek_algorithm)?;

        Ok(CipherData {
            key,
            iv,
            encrypted_key,
            wrap_algorithm: AES_GCM_WRAP.to_owned(),
            cek_algorithm: cek_algorithm.to_owned(),
            tag_length: 0,
            material_description: MaterialDescription::new()
                .with(CEK_ALG_CONTEXT_KEY, cek_algorithm),
        })
    }
}

#[async_trait::async_trait]
impl CipherDataDecrypter for AesGcmKeyWrap {
    async fn decrypt_key(
        &self,
        encrypted_key: &[u8],
        material_description: &MaterialDescription,
        cek_algorithm: &str,
    ) -> Result<Vec<u8>> {
        if let Some(context) = material_description.get(CEK_ALG_CONTEXT_KEY)
            && context != cek_algorithm
        {
            return Err(Error::ContextMismatch {
                envelope: cek_algorithm.to_owned(),
                context: context.clone(),
            });
        }
        self.unwrap(encrypted_key, cek_algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AES_GCM_NO_PADDING;

    fn wrap() -> AesGcmKeyWrap {
        AesGcmKeyWrap::new(&[5u8; GCM_KEY_SIZE]).unwrap()
    }

    #[tokio::test]
    async fn generate_then_unwrap() {
        let wrap = wrap();
        let data = wrap
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await
            .unwrap();

        assert_eq!(data.key.len(), GCM_KEY_SIZE);
        assert_eq!(data.iv.len(), GCM_NONCE_SIZE);
        assert_eq!(data.wrap_algorithm, AES_GCM_WRAP);
        assert_ne!(data.encrypted_key, data.key);

        let key = wrap
            .decrypt_key(
                &data.encrypted_key,
                &data.material_description,
                AES_GCM_NO_PADDING,
            )
            .await
            .unwrap();
        assert_eq!(key, data.key);
    }

    #[tokio::test]
    async fn other_master_key_cannot_unwrap() {
        let data = wrap()
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await
            .unwrap();

        let other = AesGcmKeyWrap::new(&[6u8; GCM_KEY_SIZE]).unwrap();
        let err = other
            .decrypt_key(
                &data.encrypted_key,
                &data.material_description,
                AES_GCM_NO_PADDING,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication));
    }

    #[tokio::test]
    async fn cek_algorithm_is_bound() {
        let wrap = wrap();
        let data = wrap
            .generate_cipher_data(GCM_KEY_SIZE, GCM_NONCE_SIZE, AES_GCM_NO_PADDING)
            .await
            .unwrap();

        let err = wrap
            .decrypt_key(
                &data.encrypted_key,
                &data.material_description,
                "AES/CTR/NoPadding",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ContextMismatch { .. }));

        let err = wrap
            .decrypt_key(
                &data.encrypted_key,
                &MaterialDescription::new(),
                "AES/CTR/NoPadding",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication));
    }

    #[test]
    fn from_base64_checks_length() {
        let short = STANDARD.encode([0u8; 16]);
        assert!(matches!(
            AesGcmKeyWrap::from_base64(&short).err().unwrap(),
            Error::InvalidKeyLength { actual: 16, .. }
        ));

        let full = STANDARD.encode([0u8; 32]);
        assert!(AesGcmKeyWrap::from_base64(&full).is_ok());
        assert!(matches!(
            AesGcmKeyWrap::from_base64("not base64!").err().unwrap(),
            Error::Base64(_)
        ));
    }

    #[tokio::test]
    async fn truncated_wrapped_key() {
        let err = wrap()
            .decrypt_key(&[0u8; 4], &MaterialDescription::new(), AES_GCM_NO_PADDING)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)));
    }
}
