//! Where the encryption envelope is stored.

use serde::{Deserialize, Serialize};

/// Suffix appended to an object key to name its instruction file.
pub const INSTRUCTION_SUFFIX: &str = ".instruction";

/// How an [`EncryptionClient`](crate::crypto::EncryptionClient) persists the
/// envelope of each object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStrategy {
    /// Envelope fields are stored as user metadata on the object itself.
    #[default]
    ObjectMetadata,
    /// Envelope is stored as JSON in a sibling `<key>.instruction` object.
    InstructionFile,
}
