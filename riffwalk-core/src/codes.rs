//! Stable numeric error codes and their messages

/// Numeric error kinds
///
/// Codes 1 to 8 keep the values used by existing RIFF tooling; later codes
/// are additions. `EndOfList` never appears as an [`crate::Error`], it is
/// listed so that callers mapping outcomes to codes have a value for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    AtTopLevel = -1,
    EndOfChunk = 1,
    EndOfList = 2,
    ExcessBytes = 3,
    InvalidTag = 4,
    ChunkExceedsBounds = 5,
    UnexpectedEof = 6,
    Access = 7,
    InvalidHandle = 8,
    SizeMismatch = 9,
    ChunkTooSmall = 10,
    NotAList = 11,
}

const NO_ERROR: &str = "No error";
const UNKNOWN: &str = "Unknown RIFF error";

const KINDS: [ErrorKind; 12] = [
    ErrorKind::AtTopLevel,
    ErrorKind::EndOfChunk,
    ErrorKind::EndOfList,
    ErrorKind::ExcessBytes,
    ErrorKind::InvalidTag,
    ErrorKind::ChunkExceedsBounds,
    ErrorKind::UnexpectedEof,
    ErrorKind::Access,
    ErrorKind::InvalidHandle,
    ErrorKind::SizeMismatch,
    ErrorKind::ChunkTooSmall,
    ErrorKind::NotAList,
];

impl ErrorKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        KINDS.iter().copied().find(|kind| kind.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::AtTopLevel => "Already at top list level",
            ErrorKind::EndOfChunk => "End of chunk",
            ErrorKind::EndOfList => "End of chunk list",
            ErrorKind::ExcessBytes => "Excess bytes at end of chunk list",
            ErrorKind::InvalidTag => "Illegal four character id",
            ErrorKind::ChunkExceedsBounds => "Chunk size exceeds list level or file",
            ErrorKind::UnexpectedEof => "End of RIFF file",
            ErrorKind::Access => "File access failed",
            ErrorKind::InvalidHandle => "Invalid handle or no current chunk",
            ErrorKind::SizeMismatch => "RIFF size does not match expected size",
            ErrorKind::ChunkTooSmall => "Chunk too small for its contents",
            ErrorKind::NotAList => "Chunk cannot contain sub chunks",
        }
    }
}

/// Looks up the message for a numeric code; unknown codes get a generic message
pub fn error_message(code: i32) -> &'static str {
    if code == 0 {
        return NO_ERROR;
    }
    ErrorKind::from_code(code).map_or(UNKNOWN, ErrorKind::message)
}
