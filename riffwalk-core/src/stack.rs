//! Level stack: one saved frame per list chunk entered

use crate::{ChunkHeader, FourCc};

/// A list chunk the reader has descended into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    /// "RIFF", "BW64" or "LIST"
    pub id: FourCc,
    /// Type tag read from the first four payload bytes
    pub list_type: FourCc,
    pub size: u64,
    pub data_start: u64,
}

impl Frame {
    /// The list chunk this frame was pushed for
    pub fn chunk(&self) -> ChunkHeader {
        ChunkHeader {
            id: self.id,
            size: self.size,
            data_start: self.data_start,
        }
    }

    /// Position of the first child header, just past the type tag
    pub fn first_child(&self) -> u64 {
        self.data_start + 4
    }

    /// End of the list payload; children must not extend past it
    pub fn bound(&self) -> u64 {
        self.data_start + self.size
    }
}

/// Growable stack of [`Frame`]s
///
/// Capacity doubles when full; popping never releases storage.
#[derive(Debug, Clone)]
pub struct LevelStack {
    frames: Vec<Frame>,
}

impl LevelStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.frames.capacity() {
            let grow = self.frames.capacity().max(1);
            self.frames.reserve_exact(grow);
        }
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Current nesting level; 0 is the top level
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn capacity(&self) -> usize {
        self.frames.capacity()
    }

    /// Drops frames above `depth`
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
