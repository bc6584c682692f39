//! Outer RIFF header and the ds64 size extension

use crate::{Error, FourCc, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Outer header length: id, size, form type
pub const HEADER_SIZE: usize = 12;

/// Header size value announcing that the real size lives in a ds64 chunk
pub const DS64_SENTINEL: u32 = 0xFFFF_FFFF;

/// Bytes of the ds64 payload holding the 64-bit RIFF size
pub const DS64_RIFF_SIZE_LEN: usize = 8;

/// RIFF file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileHeader {
    /// "RIFF" or "BW64"
    pub id: FourCc,
    /// Payload size of the outer chunk, excluding its 8-byte header
    pub size: u64,
    /// Form type, e.g. "WAVE" or "AVI "
    pub form_type: FourCc,
}

impl FileHeader {
    /// Parses the 12 header bytes found at `position`
    pub fn parse(bytes: &[u8; HEADER_SIZE], position: u64) -> Result<Self> {
        let mut reader = &bytes[..];

        let mut id = [0u8; 4];
        reader.read_exact(&mut id)?;
        let id = FourCc::new(id);
        if !id.is_file_id() {
            return Err(Error::InvalidTag {
                position,
                tag: id.0,
            });
        }

        let size = reader.read_u32::<LittleEndian>()?;

        let mut form_type = [0u8; 4];
        reader.read_exact(&mut form_type)?;

        Ok(Self {
            id,
            size: u64::from(size),
            form_type: FourCc::new(form_type),
        })
    }

    /// Whether the 32-bit size field holds the ds64 sentinel
    pub fn has_size_sentinel(&self) -> bool {
        self.size == u64::from(DS64_SENTINEL)
    }

    /// Size of the whole container including the outer header
    pub fn total_size(&self) -> u64 {
        self.size.saturating_add(8)
    }
}

/// Recombines the 64-bit RIFF size from the start of a ds64 payload
pub fn parse_ds64_riff_size(bytes: &[u8; DS64_RIFF_SIZE_LEN]) -> Result<u64> {
    let mut reader = &bytes[..];
    let low = reader.read_u32::<LittleEndian>()?;
    let high = reader.read_u32::<LittleEndian>()?;
    Ok((u64::from(high) << 32) | u64::from(low))
}
