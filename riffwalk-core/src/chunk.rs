//! Chunk headers

use crate::{Error, FourCc, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Chunk header length: id and size
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// A parsed chunk header, positioned in absolute channel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChunkHeader {
    pub id: FourCc,
    /// Payload size, excluding the header and any pad byte
    pub size: u64,
    /// Absolute position of the first payload byte
    pub data_start: u64,
}

impl ChunkHeader {
    /// Parses the 8 header bytes found at `position`
    pub fn parse(bytes: &[u8; CHUNK_HEADER_SIZE as usize], position: u64) -> Result<Self> {
        let mut reader = &bytes[..];

        let mut id = [0u8; 4];
        reader.read_exact(&mut id)?;
        let id = FourCc::new(id);
        if !id.is_printable() {
            return Err(Error::InvalidTag {
                position,
                tag: id.0,
            });
        }

        let size = reader.read_u32::<LittleEndian>()?;

        Ok(Self {
            id,
            size: u64::from(size),
            data_start: position + CHUNK_HEADER_SIZE,
        })
    }

    /// Absolute position of the chunk header
    pub fn position(&self) -> u64 {
        self.data_start - CHUNK_HEADER_SIZE
    }

    /// Odd payloads are followed by one pad byte
    pub fn has_pad_byte(&self) -> bool {
        self.size & 1 == 1
    }

    /// End of the payload, pad byte excluded
    pub fn data_end(&self) -> u64 {
        self.data_start + self.size
    }

    /// End of the chunk including its pad byte, i.e. where the next header starts
    pub fn end(&self) -> u64 {
        self.data_end() + u64::from(self.has_pad_byte())
    }
}
