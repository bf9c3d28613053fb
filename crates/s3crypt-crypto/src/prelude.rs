//! Prelude module for convenient imports.

pub use crate::cipher::{
    AesGcmContentCipher, AesGcmContentCipherBuilder, CipherData, ContentCipher,
    ContentCipherBuilder,
};
pub use crate::envelope::{Envelope, MaterialDescription};
pub use crate::error::{Error, Result};
pub use crate::registry::CryptoRegistry;
pub use crate::wrap::{
    AesGcmKeyWrap, CipherDataDecrypter, CipherDataGenerator, KmsContextKeyGenerator,
    KmsKeyHandler,
};
