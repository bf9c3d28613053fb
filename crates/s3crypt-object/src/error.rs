//! Object store error types.

/// Result type for object store operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the plain, encryption and decryption clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object key is empty or otherwise unusable.
    #[error("invalid object key: {0}")]
    InvalidObjectKey(String),

    /// The provider could not build a client from its credentials.
    #[error("[{provider}] failed to connect: {message}")]
    Connection {
        /// Provider identifier (e.g. `s3`).
        provider: &'static str,
        /// Builder error message.
        message: String,
    },

    /// The object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Any other storage-layer failure.
    #[error("[object-store] {source}")]
    Storage {
        /// Underlying object store error.
        #[source]
        source: object_store::Error,
        /// Whether the caller could retry the operation.
        retryable: bool,
    },

    /// Neither the object metadata nor an instruction file holds an envelope.
    #[error("no encryption envelope found for object {0}")]
    MissingEnvelope(String),

    /// Encryption, decryption or key management failed.
    #[error(transparent)]
    Crypto(#[from] s3crypt_crypto::Error),
}

impl Error {
    /// Creates a connection error for `provider`.
    pub fn connection(provider: &'static str, msg: impl ToString) -> Self {
        Self::Connection {
            provider,
            message: msg.to_string(),
        }
    }

    /// Whether the caller should retry this operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage { retryable, .. } => *retryable,
            Self::Connection { .. } => true,
            _ => false,
        }
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        use object_store::Error as E;

        match err {
            E::NotFound { path, .. } => Self::NotFound(path),
            err => {
                let retryable = !matches!(
                    err,
                    E::PermissionDenied { .. }
                        | E::Unauthenticated { .. }
                        | E::AlreadyExists { .. }
                        | E::Precondition { .. }
                        | E::NotSupported { .. }
                );
                Self::Storage {
                    source: err,
                    retryable,
                }
            }
        }
    }
}
