//! The envelope persisted next to every encrypted object.
//!
//! Field names follow the metadata layout used by the AWS S3 encryption
//! clients, so objects written here can be read by them and vice versa.

use std::collections::{BTreeMap, HashMap};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use crate::cipher::CipherData;
use crate::{Error, Result};

/// Header (user metadata) names used by the envelope.
pub mod headers {
    /// Base64 data key wrapped under the master key.
    pub const KEY_V2: &str = "x-amz-key-v2";
    /// V1 wrapped key. Its presence marks an unsupported V1 envelope.
    pub const KEY_V1: &str = "x-amz-key";
    /// Base64 content cipher IV.
    pub const IV: &str = "x-amz-iv";
    /// JSON material description.
    pub const MATDESC: &str = "x-amz-matdesc";
    /// Key wrap algorithm name.
    pub const WRAP_ALG: &str = "x-amz-wrap-alg";
    /// Content cipher algorithm name.
    pub const CEK_ALG: &str = "x-amz-cek-alg";
    /// Authentication tag length in bits.
    pub const TAG_LEN: &str = "x-amz-tag-len";
    /// Plaintext length in bytes.
    pub const UNENCRYPTED_CONTENT_LENGTH: &str = "x-amz-unencrypted-content-length";
}

/// String map describing how a data key was wrapped.
///
/// For KMS it doubles as the encryption context.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct MaterialDescription(BTreeMap<String, String>);

impl MaterialDescription {
    /// Creates an empty material description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces an entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Parses the JSON form stored in the envelope. An empty string is an
    /// empty description.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to the JSON form stored in the envelope.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Converts to the map type used by the KMS API.
    pub fn to_encryption_context(&self) -> HashMap<String, String> {
        self.0.clone().into_iter().collect()
    }
}

/// Envelope fields for one encrypted object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 wrapped data key.
    #[serde(rename = "x-amz-key-v2")]
    pub cipher_key: String,
    /// Base64 IV.
    #[serde(rename = "x-amz-iv")]
    pub iv: String,
    /// JSON material description.
    #[serde(rename = "x-amz-matdesc")]
    pub material_description: String,
    /// Key wrap algorithm name.
    #[serde(rename = "x-amz-wrap-alg")]
    pub wrap_algorithm: String,
    /// Content cipher algorithm name.
    #[serde(rename = "x-amz-cek-alg")]
    pub cek_algorithm: String,
    /// Tag length in bits, as a decimal string.
    #[serde(rename = "x-amz-tag-len", default)]
    pub tag_length: String,
    /// Plaintext length in bytes, as a decimal string.
    #[serde(rename = "x-amz-unencrypted-content-length", default)]
    pub unencrypted_content_length: String,
}

impl Envelope {
    /// Builds the envelope for an object encrypted with `cipher_data`.
    pub fn from_cipher_data(cipher_data: &CipherData, plaintext_len: usize) -> Result<Self> {
        Ok(Self {
            cipher_key: STANDARD.encode(&cipher_data.encrypted_key),
            iv: STANDARD.encode(&cipher_data.iv),
            material_description: cipher_data.material_description.to_json()?,
            wrap_algorithm: cipher_data.wrap_algorithm.clone(),
            cek_algorithm: cipher_data.cek_algorithm.clone(),
            tag_length: cipher_data.tag_length.to_string(),
            unencrypted_content_length: plaintext_len.to_string(),
        })
    }

    /// Returns the envelope as `(header, value)` pairs.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (headers::KEY_V2, self.cipher_key.clone()),
            (headers::IV, self.iv.clone()),
            (headers::MATDESC, self.material_description.clone()),
            (headers::WRAP_ALG, self.wrap_algorithm.clone()),
            (headers::CEK_ALG, self.cek_algorithm.clone()),
            (headers::TAG_LEN, self.tag_length.clone()),
            (
                headers::UNENCRYPTED_CONTENT_LENGTH,
                self.unencrypted_content_length.clone(),
            ),
        ]
    }

    /// Reads an envelope from object metadata.
    ///
    /// Returns `Ok(None)` when the metadata carries no envelope at all, and
    /// [`Error::V1NotSupported`] when it carries a V1 envelope.
    pub fn from_headers<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(cipher_key) = lookup(headers::KEY_V2) else {
            if lookup(headers::KEY_V1).is_some() {
                return Err(Error::V1NotSupported);
            }
            return Ok(None);
        };

        let required = |name: &str| {
            lookup(name).ok_or_else(|| Error::malformed(format!("missing {name}")))
        };

        Ok(Some(Self {
            cipher_key,
            iv: required(headers::IV)?,
            material_description: lookup(headers::MATDESC).unwrap_or_default(),
            wrap_algorithm: required(headers::WRAP_ALG)?,
            cek_algorithm: required(headers::CEK_ALG)?,
            tag_length: lookup(headers::TAG_LEN).unwrap_or_default(),
            unencrypted_content_length: lookup(headers::UNENCRYPTED_CONTENT_LENGTH)
                .unwrap_or_default(),
        }))
    }

    /// Parses an instruction file body.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serializes to an instruction file body.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes the wrapped data key.
    pub fn encrypted_key(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.cipher_key)?)
    }

    /// Decodes the IV.
    pub fn decoded_iv(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.iv)?)
    }

    /// Parses the material description.
    pub fn material_description(&self) -> Result<MaterialDescription> {
        MaterialDescription::from_json(&self.material_description)
    }

    /// Parses the tag length. A missing value means no tag.
    pub fn tag_length_bits(&self) -> Result<u32> {
        if self.tag_length.is_empty() {
            return Ok(0);
        }
        self.tag_length
            .parse()
            .map_err(|_| Error::malformed(format!("invalid tag length {:?}", self.tag_length)))
    }

    /// Parses the recorded plaintext length, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.unencrypted_content_length.parse().ok()
    }

    /// Rebuilds cipher data around an already unwrapped data key.
    pub fn to_cipher_data(&self, key: Vec<u8>) -> Result<CipherData> {
        Ok(CipherData {
            key,
            iv: self.decoded_iv()?,
            encrypted_key: self.encrypted_key()?,
            wrap_algorithm: self.wrap_algorithm.clone(),
            cek_algorithm: self.cek_algorithm.clone(),
            tag_length: self.tag_length_bits()?,
            material_description: self.material_description()?,
        })
    }
}
