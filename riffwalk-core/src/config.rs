//! Reader configuration

/// Initial level stack capacity, enough for typical nesting without reallocating
pub const DEFAULT_STACK_CAPACITY: usize = 16;

/// What to do when the RIFF header size disagrees with [`ReaderConfig::expected_size`]
/// and the data available is at least as large as the header claims.
///
/// A header claiming more bytes than are available always fails with
/// [`crate::Error::UnexpectedEof`], whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMismatchPolicy {
    /// Fail `open` with [`crate::Error::SizeMismatch`]
    #[default]
    Reject,
    /// Log the mismatch, record it on the reader and keep going
    Tolerate,
}

/// Reader configuration
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Total byte length of the RIFF data, outer header included (None = unknown)
    pub expected_size: Option<u64>,
    /// Handling of a header size that disagrees with `expected_size`
    pub size_mismatch: SizeMismatchPolicy,
    /// Level stack frames to allocate up front
    pub stack_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            expected_size: None,
            size_mismatch: SizeMismatchPolicy::Reject,
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}

impl ReaderConfig {
    pub fn with_expected_size(mut self, size: u64) -> Self {
        self.expected_size = Some(size);
        self
    }

    pub fn tolerate_size_mismatch(mut self) -> Self {
        self.size_mismatch = SizeMismatchPolicy::Tolerate;
        self
    }
}
