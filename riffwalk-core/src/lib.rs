//! riffwalk Core Library
//!
//! Streaming traversal and structural validation of RIFF containers
//! (RIFF/WAVE/AVI and the 64-bit BW64/RF64 variants). A [`RiffReader`] walks
//! the chunk tree through an injected [`Channel`] without loading the file into
//! memory, checking every declared size against its enclosing list and the file.

pub mod channel;
pub mod chunk;
pub mod codes;
pub mod config;
pub mod fourcc;
pub mod header;
pub mod reader;
pub mod stack;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use channel::{Channel, MemoryChannel, StreamChannel};
pub use chunk::ChunkHeader;
pub use codes::{error_message, ErrorKind};
pub use config::{ReaderConfig, SizeMismatchPolicy};
pub use fourcc::{FourCc, ParseFourCcError};
pub use header::FileHeader;
pub use reader::{RiffReader, SizeMismatch};
pub use stack::Frame;
pub use validate::{ValidationReport, Visit};

/// Result type for riffwalk-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for riffwalk-core operations
///
/// Only conditions that make an operation fail live here. Running out of
/// siblings (`next_chunk` returning `Ok(None)`) and ascending from the top level
/// (`ascend` returning `false`) are ordinary outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No current chunk at position {position}")]
    InvalidHandle { position: u64 },

    #[error("Offset {offset} is past the end of the {size} byte chunk")]
    EndOfChunk { offset: u64, size: u64 },

    #[error("Already at the top list level")]
    AtTopLevel,

    #[error("{count} excess bytes at position {position} at end of chunk list")]
    ExcessBytes { position: u64, count: u64 },

    #[error("Illegal four character id {} at position {position}", fourcc::escape(.tag))]
    InvalidTag { position: u64, tag: [u8; 4] },

    #[error("Chunk '{id}' at position {position} ends at {end}, beyond its list or file end at {limit}")]
    ChunkExceedsBounds {
        id: FourCc,
        position: u64,
        end: u64,
        limit: u64,
    },

    #[error("Chunk '{id}' at position {position} holds {size} bytes, at least {needed} required")]
    ChunkTooSmall {
        id: FourCc,
        position: u64,
        size: u64,
        needed: u64,
    },

    #[error("Chunk '{id}' at position {position} cannot contain sub chunks")]
    NotAList { id: FourCc, position: u64 },

    #[error("Unexpected end of data at position {position}: {needed} bytes needed, {available} available")]
    UnexpectedEof {
        position: u64,
        needed: u64,
        available: u64,
    },

    #[error("RIFF header declares {declared} bytes but {expected} bytes were expected")]
    SizeMismatch { declared: u64, expected: u64 },
}

impl Error {
    /// Maps this error onto its stable numeric kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Access,
            Error::InvalidHandle { .. } => ErrorKind::InvalidHandle,
            Error::EndOfChunk { .. } => ErrorKind::EndOfChunk,
            Error::AtTopLevel => ErrorKind::AtTopLevel,
            Error::ExcessBytes { .. } => ErrorKind::ExcessBytes,
            Error::InvalidTag { .. } => ErrorKind::InvalidTag,
            Error::ChunkExceedsBounds { .. } => ErrorKind::ChunkExceedsBounds,
            Error::ChunkTooSmall { .. } => ErrorKind::ChunkTooSmall,
            Error::NotAList { .. } => ErrorKind::NotAList,
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Error::SizeMismatch { .. } => ErrorKind::SizeMismatch,
        }
    }

    /// Whether the file structure itself is broken, as opposed to a caller or
    /// channel problem
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::ExcessBytes { .. }
                | Error::InvalidTag { .. }
                | Error::ChunkExceedsBounds { .. }
                | Error::ChunkTooSmall { .. }
                | Error::UnexpectedEof { .. }
                | Error::SizeMismatch { .. }
        )
    }
}
