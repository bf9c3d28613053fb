//! Envelope encryption error types.

/// Result type for envelope encryption operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while encrypting, decrypting or wrapping data keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encryption through KMS was requested without a master key identifier.
    #[error("a KMS master key identifier (CMK id or ARN) is required for encryption")]
    MissingCmkId,

    /// The envelope names a wrap algorithm that is not registered.
    #[error("unsupported key wrap algorithm: {0}")]
    InvalidWrapAlgorithm(String),

    /// The envelope names a content cipher algorithm that is not registered.
    #[error("unsupported content encryption algorithm: {0}")]
    InvalidCekAlgorithm(String),

    /// The object was encrypted with the V1 envelope format.
    #[error("V1 envelopes (AES/ECB key wrap) are not supported")]
    V1NotSupported,

    /// The registry handed to a decryption client cannot decrypt anything.
    #[error("crypto registry must contain at least one wrap and one content cipher algorithm")]
    EmptyRegistry,

    /// An algorithm was registered twice under the same name.
    #[error("algorithm already registered: {0}")]
    DuplicateAlgorithm(String),

    /// The caller tried to set a material description key reserved for the client.
    #[error("material description key is reserved: {0}")]
    ReservedContextKey(String),

    /// The material description disagrees with the envelope's content cipher.
    #[error("content cipher {envelope} does not match the material description value {context}")]
    ContextMismatch {
        /// Algorithm named by the envelope.
        envelope: String,
        /// Algorithm recorded in the material description.
        context: String,
    },

    /// A key of the wrong length was supplied.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Provided length in bytes.
        actual: usize,
    },

    /// An IV of the wrong length was supplied.
    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength {
        /// Required length in bytes.
        expected: usize,
        /// Provided length in bytes.
        actual: usize,
    },

    /// The envelope stores an authentication tag length the cipher cannot use.
    #[error("unsupported tag length: {0} bits")]
    InvalidTagLength(u32),

    /// The envelope could not be parsed.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Ciphertext or wrapped key failed authentication.
    #[error("authentication failed: ciphertext was modified or the wrong key was used")]
    Authentication,

    /// A content cipher was asked to encrypt a second payload with its IV.
    #[error("content cipher already encrypted a payload; its IV cannot be reused")]
    CipherReused,

    /// Random number generation or sealing failed.
    #[error("cipher failure: {0}")]
    Cipher(String),

    /// The key management service rejected or failed a request.
    #[error("kms request failed: {0}")]
    Kms(String),

    /// Base64 decoding failed.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON (de)serialization failed.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new malformed envelope error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEnvelope(msg.into())
    }

    /// Creates a new cipher error.
    pub fn cipher(msg: impl Into<String>) -> Self {
        Self::Cipher(msg.into())
    }

    /// Creates a new KMS error.
    pub fn kms(msg: impl Into<String>) -> Self {
        Self::Kms(msg.into())
    }

    /// Returns `true` when the error means the object cannot be decrypted by
    /// this client configuration, as opposed to a transport or data failure.
    pub fn is_unsupported_algorithm(&self) -> bool {
        matches!(
            self,
            Self::InvalidWrapAlgorithm(_)
                | Self::InvalidCekAlgorithm(_)
                | Self::V1NotSupported
                | Self::InvalidTagLength(_)
        )
    }
}
