//! MeshGenError: unified error type for mesh generation and distribution.
//!
//! Every fallible public API returns `Result<_, MeshGenError>`; callers treat
//! any error as fatal for the run.

use thiserror::Error;

/// Unified error type for mesh-scatter operations.
#[derive(Debug, Error)]
pub enum MeshGenError {
    /// Unknown element family name, or a family that does not fit the grid.
    #[error("unsupported element type: {0}")]
    UnsupportedElement(String),
    /// Structured grid parameters violate a precondition.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    /// A group name or id was registered twice.
    #[error("physical group `{name}` (id {id}) is already registered")]
    DuplicateGroup { name: String, id: i32 },
    /// Group id outside the range reserved for its kind.
    #[error("physical group id {id} is out of range for {kind}")]
    InvalidGroupId { id: i32, kind: &'static str },
    /// Lookup of a group that does not exist.
    #[error("unknown physical group `{0}`")]
    UnknownGroup(String),
    /// A cell record violates its own invariants.
    #[error("invalid cell record: {0}")]
    InvalidCell(String),
    /// Malformed frame, or a frame of the wrong kind or key.
    #[error("wire decode error: {0}")]
    Wire(String),
    /// Communication with a peer failed.
    #[error("communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The global mesh was requested on a rank that does not hold it.
    #[error("global mesh is only held by rank 0")]
    GlobalMeshUnavailable,
    /// Metadata derived on this rank disagrees with the coordinator's.
    #[error("metadata mismatch with rank 0: {0}")]
    MetadataMismatch(String),
}

impl MeshGenError {
    pub(crate) fn wire(message: impl Into<String>) -> Self {
        MeshGenError::Wire(message.into())
    }

    pub(crate) fn invalid_grid(message: impl Into<String>) -> Self {
        MeshGenError::InvalidGrid(message.into())
    }

    pub(crate) fn comm(neighbor: usize, message: impl Into<String>) -> Self {
        MeshGenError::CommError {
            neighbor,
            source: message.into().into(),
        }
    }
}
