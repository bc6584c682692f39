//! Structural validation and chunk counting
//!
//! Everything here is built from the navigation primitives on [`RiffReader`];
//! no payload bytes are read.

use crate::{Channel, ChunkHeader, FourCc, Result, RiffReader};

/// A chunk reached during a whole-file walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Nesting level of the chunk itself; 0 for top-level chunks
    pub depth: usize,
    pub chunk: ChunkHeader,
    /// Type tag for list chunks
    pub list_type: Option<FourCc>,
}

/// Summary of a successful whole-file walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationReport {
    /// Chunks visited, list chunks included
    pub chunks: u64,
    /// List chunks entered
    pub lists: u64,
    /// Deepest nesting level reached
    pub max_depth: usize,
}

impl<C: Channel> RiffReader<C> {
    /// Checks every chunk header of the current level
    ///
    /// Leaves the reader on the last chunk of the level.
    pub fn validate_level(&mut self) -> Result<()> {
        if self.seek_level_start()?.is_none() {
            return Ok(());
        }
        while self.next_chunk()?.is_some() {}
        Ok(())
    }

    /// Checks the whole chunk tree, descending into every list
    ///
    /// Any failure aborts the walk and is returned as is. On success the
    /// reader is rewound to the first chunk of the file.
    pub fn validate_file(&mut self) -> Result<ValidationReport> {
        self.walk(|_| {})
    }

    /// Walks the whole chunk tree depth-first, calling `visit` for each chunk
    ///
    /// The level stack doubles as the work stack, so memory use grows with
    /// nesting depth only. List chunks are visited after their type tag has
    /// been read and before their children.
    pub fn walk<F>(&mut self, mut visit: F) -> Result<ValidationReport>
    where
        F: FnMut(&Visit),
    {
        let mut report = ValidationReport::default();
        let mut next = self.rewind()?;

        loop {
            match next {
                Some(chunk) if chunk.id.is_list() => {
                    let depth = self.depth();
                    next = self.descend()?;
                    report.chunks += 1;
                    report.lists += 1;
                    report.max_depth = report.max_depth.max(self.depth());
                    visit(&Visit {
                        depth,
                        chunk,
                        list_type: Some(self.list_type()),
                    });
                }
                Some(chunk) => {
                    report.chunks += 1;
                    visit(&Visit {
                        depth: self.depth(),
                        chunk,
                        list_type: None,
                    });
                    next = self.next_chunk()?;
                }
                None => {
                    if !self.ascend() {
                        break;
                    }
                    next = self.next_chunk()?;
                }
            }
        }

        self.rewind()?;
        Ok(report)
    }

    /// Number of chunks in the current level
    ///
    /// Leaves the reader on the last chunk of the level.
    pub fn count_in_level(&mut self) -> Result<u64> {
        self.count_matching(|_| true)
    }

    /// Number of chunks in the current level with the given id
    pub fn count_in_level_with_id(&mut self, id: FourCc) -> Result<u64> {
        self.count_matching(|chunk| chunk.id == id)
    }

    fn count_matching(&mut self, mut matches: impl FnMut(&ChunkHeader) -> bool) -> Result<u64> {
        let mut count = 0;
        let mut next = self.seek_level_start()?;
        while let Some(chunk) = next {
            if matches(&chunk) {
                count += 1;
            }
            next = self.next_chunk()?;
        }
        Ok(count)
    }
}
