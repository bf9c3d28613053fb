//! Explicit registry of the algorithms a decryption client accepts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use aws_sdk_kms::Client;

use crate::cipher::{AesGcmContentCipher, CipherData, ContentCipher};
use crate::wrap::{AesGcmKeyWrap, CipherDataDecrypter, KmsContextKeyGenerator, KmsKeyHandler};
use crate::{
    AES_GCM_NO_PADDING, AES_GCM_WRAP, Error, KMS_CONTEXT_WRAP, KMS_WRAP, Result,
};

/// Rebuilds a content cipher from unwrapped key material.
pub type CekFactory = Arc<dyn Fn(CipherData) -> Result<Box<dyn ContentCipher>> + Send + Sync>;

/// Maps wrap and content cipher algorithm names to their implementations.
///
/// Only algorithms present here can be decrypted; anything else fails with
/// [`Error::InvalidWrapAlgorithm`] or [`Error::InvalidCekAlgorithm`].
#[derive(Clone, Default)]
pub struct CryptoRegistry {
    wrap: HashMap<String, Arc<dyn CipherDataDecrypter>>,
    cek: HashMap<String, CekFactory>,
}

impl CryptoRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key unwrapper under `name`.
    pub fn add_wrap(
        &mut self,
        name: impl Into<String>,
        decrypter: Arc<dyn CipherDataDecrypter>,
    ) -> Result<()> {
        let name = name.into();
        if self.wrap.contains_key(&name) {
            return Err(Error::DuplicateAlgorithm(name));
        }
        self.wrap.insert(name, decrypter);
        Ok(())
    }

    /// Registers a content cipher factory under `name`.
    pub fn add_cek(&mut self, name: impl Into<String>, factory: CekFactory) -> Result<()> {
        let name = name.into();
        if self.cek.contains_key(&name) {
            return Err(Error::DuplicateAlgorithm(name));
        }
        self.cek.insert(name, factory);
        Ok(())
    }

    /// Looks up a key unwrapper.
    pub fn get_wrap(&self, name: &str) -> Option<Arc<dyn CipherDataDecrypter>> {
        self.wrap.get(name).cloned()
    }

    /// Looks up a content cipher factory.
    pub fn get_cek(&self, name: &str) -> Option<CekFactory> {
        self.cek.get(name).cloned()
    }

    /// Removes a key unwrapper, returning it if present.
    pub fn remove_wrap(&mut self, name: &str) -> Option<Arc<dyn CipherDataDecrypter>> {
        self.wrap.remove(name)
    }

    /// Removes a content cipher factory, returning it if present.
    pub fn remove_cek(&mut self, name: &str) -> Option<CekFactory> {
        self.cek.remove(name)
    }

    /// Fails with [`Error::EmptyRegistry`] unless at least one algorithm of
    /// each kind is registered.
    pub fn validate(&self) -> Result<()> {
        if self.wrap.is_empty() || self.cek.is_empty() {
            return Err(Error::EmptyRegistry);
        }
        Ok(())
    }

    /// Registers `AES/GCM/NoPadding`.
    pub fn register_aes_gcm_content_cipher(&mut self) -> Result<()> {
        self.add_cek(AES_GCM_NO_PADDING, Arc::new(AesGcmContentCipher::boxed))
    }

    /// Registers `kms+context` backed by `generator`.
    pub fn register_kms_context_wrap(&mut self, generator: KmsContextKeyGenerator) -> Result<()> {
        self.add_wrap(KMS_CONTEXT_WRAP, Arc::new(generator))
    }

    /// Registers the legacy `kms` wrap algorithm.
    pub fn register_kms_wrap(&mut self, client: Client) -> Result<()> {
        self.add_wrap(KMS_WRAP, Arc::new(KmsKeyHandler::new(client)))
    }

    /// Registers `AES/GCM` backed by a local master key.
    pub fn register_aes_gcm_wrap(&mut self, wrap: Arc<AesGcmKeyWrap>) -> Result<()> {
        self.add_wrap(AES_GCM_WRAP, wrap)
    }

    /// Registered wrap algorithm names, sorted.
    pub fn wrap_algorithms(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.wrap.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered content cipher algorithm names, sorted.
    pub fn cek_algorithms(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.cek.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CryptoRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoRegistry")
            .field("wrap", &self.wrap_algorithms())
            .field("cek", &self.cek_algorithms())
            .finish()
    }
}
