//! Per-object key material.

use std::fmt;

use crate::MaterialDescription;

/// Key material for one object: the plaintext data key, the IV, the data key
/// wrapped under the master key, and the algorithm names needed to undo both.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherData {
    /// Plaintext data key. Never persisted.
    pub key: Vec<u8>,
    /// Initialization vector for the content cipher.
    pub iv: Vec<u8>,
    /// Data key wrapped under the master key.
    pub encrypted_key: Vec<u8>,
    /// Name of the algorithm that wrapped the data key.
    pub wrap_algorithm: String,
    /// Name of the content cipher algorithm.
    pub cek_algorithm: String,
    /// Authentication tag length in bits, zero for ciphers without one.
    pub tag_length: u32,
    /// Material description stored alongside the wrapped key.
    pub material_description: MaterialDescription,
}

impl fmt::Debug for CipherData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherData")
            .field("key", &"<redacted>")
            .field("iv_len", &self.iv.len())
            .field("encrypted_key_len", &self.encrypted_key.len())
            .field("wrap_algorithm", &self.wrap_algorithm)
            .field("cek_algorithm", &self.cek_algorithm)
            .field("tag_length", &self.tag_length)
            .field("material_description", &self.material_description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_key() {
        let data = CipherData {
            key: vec![0xAB; 32],
            iv: vec![0; 12],
            encrypted_key: vec![1, 2, 3],
            wrap_algorithm: "AES/GCM".into(),
            cek_algorithm: "AES/GCM/NoPadding".into(),
            tag_length: 128,
            material_description: MaterialDescription::default(),
        };

        let rendered = format!("{data:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("171"));
    }
}
