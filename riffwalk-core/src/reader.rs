//! RIFF traversal session
//!
//! [`RiffReader`] owns the traversal state: an absolute cursor, the current
//! chunk, the outer file header and the level stack. Every byte moved through
//! the [`Channel`] goes through this type, which keeps the cursor equal to the
//! real channel position after each call.

use crate::chunk::CHUNK_HEADER_SIZE;
use crate::header::{parse_ds64_riff_size, DS64_RIFF_SIZE_LEN, HEADER_SIZE};
use crate::stack::{Frame, LevelStack};
use crate::{
    Channel, ChunkHeader, Error, FileHeader, FourCc, MemoryChannel, ReaderConfig, Result,
    SizeMismatchPolicy, StreamChannel,
};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, trace};

/// Block size used when collecting a whole chunk payload
const READ_BLOCK_SIZE: usize = 8192;

/// Header size disagreement accepted under [`SizeMismatchPolicy::Tolerate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SizeMismatch {
    /// Container size according to the RIFF header, outer header included
    pub declared: u64,
    /// Size supplied through [`ReaderConfig::expected_size`]
    pub expected: u64,
}

/// Streaming reader over a RIFF container
#[derive(Debug)]
pub struct RiffReader<C: Channel> {
    io: C,
    config: ReaderConfig,
    start_offset: u64,
    cursor: u64,
    header: FileHeader,
    current: Option<ChunkHeader>,
    offset: u64,
    stack: LevelStack,
    size_mismatch: Option<SizeMismatch>,
}

impl<'a> RiffReader<MemoryChannel<'a>> {
    /// Opens RIFF data held in memory, starting at offset 0
    pub fn from_bytes(data: &'a [u8], config: ReaderConfig) -> Result<Self> {
        Self::open(MemoryChannel::new(data), config)
    }
}

impl<R: Read + Seek> RiffReader<StreamChannel<R>> {
    /// Opens RIFF data starting at the stream's current position
    pub fn from_stream(inner: R, config: ReaderConfig) -> Result<Self> {
        let mut channel = StreamChannel::new(inner);
        let start = channel.stream_position()?;
        Self::open_at(channel, start, config)
    }
}

impl RiffReader<StreamChannel<BufReader<File>>> {
    /// Opens a RIFF file by name
    ///
    /// The file length is used as the expected size unless `config` already
    /// carries one.
    pub fn open_file<P: AsRef<Path>>(path: P, mut config: ReaderConfig) -> Result<Self> {
        let (channel, len) = StreamChannel::open_file(path)?;
        config.expected_size.get_or_insert(len);
        Self::open_at(channel, 0, config)
    }
}

impl<C: Channel> RiffReader<C> {
    /// Opens a reader whose RIFF header sits at position 0 of the channel
    pub fn open(io: C, config: ReaderConfig) -> Result<Self> {
        Self::open_at(io, 0, config)
    }

    /// Opens a reader whose RIFF header sits at `start_offset`
    ///
    /// Parses the outer header and the first chunk header. On success the
    /// reader is positioned at the first payload byte of the first chunk.
    pub fn open_at(io: C, start_offset: u64, config: ReaderConfig) -> Result<Self> {
        let stack = LevelStack::with_capacity(config.stack_capacity);
        let mut reader = Self {
            io,
            config,
            start_offset,
            cursor: start_offset,
            header: FileHeader {
                id: FourCc::RIFF,
                size: 0,
                form_type: FourCc::new([b' '; 4]),
            },
            current: None,
            offset: 0,
            stack,
            size_mismatch: None,
        };

        match reader.read_file_header() {
            Ok(()) => Ok(reader),
            Err(err) => {
                reader.report(&err);
                Err(err)
            }
        }
    }

    /// Ends the session and hands the channel back, unclosed
    pub fn close(self) -> C {
        self.io
    }

    fn read_file_header(&mut self) -> Result<()> {
        self.channel_seek(self.start_offset)?;

        let mut bytes = [0u8; HEADER_SIZE];
        self.fill(&mut bytes)?;
        self.header = FileHeader::parse(&bytes, self.start_offset)?;
        debug!(
            id = %self.header.id,
            size = self.header.size,
            form_type = %self.header.form_type,
            "read RIFF header"
        );

        if let Some(chunk) = self.enter_level()? {
            if self.header.has_size_sentinel() && chunk.id == FourCc::DS64 {
                self.apply_ds64(chunk)?;
            }
        }

        self.check_expected_size()
    }

    fn apply_ds64(&mut self, chunk: ChunkHeader) -> Result<()> {
        if chunk.size < DS64_RIFF_SIZE_LEN as u64 {
            return Err(Error::ChunkTooSmall {
                id: chunk.id,
                position: chunk.position(),
                size: chunk.size,
                needed: DS64_RIFF_SIZE_LEN as u64,
            });
        }

        let mut bytes = [0u8; DS64_RIFF_SIZE_LEN];
        self.fill(&mut bytes)?;
        let size = parse_ds64_riff_size(&bytes)?;

        // the level-0 bound must stay addressable
        if self
            .start_offset
            .checked_add(CHUNK_HEADER_SIZE)
            .and_then(|end| end.checked_add(size))
            .is_none()
        {
            return Err(Error::ChunkExceedsBounds {
                id: self.header.id,
                position: self.start_offset,
                end: u64::MAX,
                limit: u64::MAX,
            });
        }
        self.header.size = size;
        debug!(size, "RIFF size taken from ds64 chunk");

        let limit = self.level_bound();
        if chunk.end() > limit {
            return Err(Error::ChunkExceedsBounds {
                id: chunk.id,
                position: chunk.position(),
                end: chunk.end(),
                limit,
            });
        }

        self.seek_in_chunk(0)
    }

    fn check_expected_size(&mut self) -> Result<()> {
        let Some(expected) = self.config.expected_size else {
            return Ok(());
        };
        let declared = self.header.total_size();
        if expected == declared {
            return Ok(());
        }

        if expected < declared {
            return Err(Error::UnexpectedEof {
                position: self.start_offset,
                needed: declared,
                available: expected,
            });
        }

        match self.config.size_mismatch {
            SizeMismatchPolicy::Reject => Err(Error::SizeMismatch { declared, expected }),
            SizeMismatchPolicy::Tolerate => {
                self.report(&Error::SizeMismatch { declared, expected });
                self.size_mismatch = Some(SizeMismatch { declared, expected });
                Ok(())
            }
        }
    }

    // ---- accessors ----

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Chunk the reader is positioned in; `None` inside an empty list
    pub fn current_chunk(&self) -> Option<&ChunkHeader> {
        self.current.as_ref()
    }

    /// Read position relative to the current chunk's payload start
    pub fn offset_in_chunk(&self) -> u64 {
        self.offset
    }

    /// Absolute channel position
    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Nesting level; 0 is the top level of the file
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Type tag of the list whose children are being walked; the file's form
    /// type at level 0
    pub fn list_type(&self) -> FourCc {
        self.stack
            .top()
            .map_or(self.header.form_type, |frame| frame.list_type)
    }

    /// Lists entered so far, outermost first
    pub fn levels(&self) -> &[Frame] {
        self.stack.frames()
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Size disagreement accepted while opening, if any
    pub fn size_mismatch(&self) -> Option<SizeMismatch> {
        self.size_mismatch
    }

    pub fn channel(&self) -> &C {
        &self.io
    }

    // ---- reading inside the current chunk ----

    /// Moves to `offset` bytes into the current chunk's payload
    ///
    /// `offset == size` is valid; reads from there return 0 bytes.
    pub fn seek_in_chunk(&mut self, offset: u64) -> Result<()> {
        let chunk = self.current.ok_or(Error::InvalidHandle {
            position: self.cursor,
        })?;
        if offset > chunk.size {
            return Err(Error::EndOfChunk {
                offset,
                size: chunk.size,
            });
        }
        self.channel_seek(chunk.data_start + offset)?;
        self.offset = offset;
        Ok(())
    }

    /// Moves back to the first payload byte of the current chunk
    pub fn seek_chunk_start(&mut self) -> Result<()> {
        self.seek_in_chunk(0)
    }

    /// Reads payload bytes, never past the end of the current chunk
    ///
    /// Returns 0 at the end of the chunk. The pad byte is never returned.
    /// Inside an empty list there is nothing to read from and this fails with
    /// [`Error::InvalidHandle`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let chunk = self.current.ok_or(Error::InvalidHandle {
            position: self.cursor,
        })?;
        let left = chunk.size - self.offset;
        let len = (buf.len() as u64).min(left) as usize;
        if len == 0 {
            return Ok(0);
        }

        let n = self.channel_read(&mut buf[..len])?;
        self.offset += n as u64;
        Ok(n)
    }

    /// Reads the whole payload of the current chunk from its start
    pub fn read_chunk_data(&mut self) -> Result<Vec<u8>> {
        let chunk = self.current.ok_or(Error::InvalidHandle {
            position: self.cursor,
        })?;
        let len = usize::try_from(chunk.size).map_err(|_| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("chunk of {} bytes does not fit in memory", chunk.size),
            )
        })?;

        self.seek_chunk_start()?;
        // grows with the bytes actually delivered, not with the declared size
        let mut data = Vec::with_capacity(len.min(READ_BLOCK_SIZE));
        let mut block = [0u8; READ_BLOCK_SIZE];
        while data.len() < len {
            let n = self.read(&mut block)?;
            if n == 0 {
                break;
            }
            data.extend_from_slice(&block[..n]);
        }

        if data.len() < len {
            let err = Error::UnexpectedEof {
                position: self.cursor,
                needed: (len - data.len()) as u64,
                available: 0,
            };
            self.report(&err);
            return Err(err);
        }
        Ok(data)
    }

    // ---- navigation ----

    /// Steps to the next sibling chunk
    ///
    /// Returns `Ok(None)` when the current chunk is the last one of its level;
    /// the reader does not move in that case.
    pub fn next_chunk(&mut self) -> Result<Option<ChunkHeader>> {
        self.transaction(|reader| {
            let next = match reader.current {
                Some(chunk) => chunk.end(),
                None => reader.level_first_chunk(),
            };
            let bound = reader.level_bound();

            if next + CHUNK_HEADER_SIZE > bound {
                if bound > next {
                    return Err(Error::ExcessBytes {
                        position: next,
                        count: bound - next,
                    });
                }
                return Ok(None);
            }

            reader.channel_seek(next)?;
            reader.read_chunk_header().map(Some)
        })
    }

    /// Goes to the first chunk of the current level and re-reads its header
    pub fn seek_level_start(&mut self) -> Result<Option<ChunkHeader>> {
        self.transaction(Self::enter_level)
    }

    /// Enters the current list chunk and reads its first child header
    ///
    /// Only "RIFF", "BW64" and "LIST" chunks of at least 4 bytes can be entered.
    /// A list holding nothing but its type tag yields `Ok(None)` at the new level.
    pub fn descend(&mut self) -> Result<Option<ChunkHeader>> {
        self.transaction(|reader| {
            let chunk = reader.current.ok_or(Error::InvalidHandle {
                position: reader.cursor,
            })?;
            if !chunk.id.is_list() {
                return Err(Error::NotAList {
                    id: chunk.id,
                    position: chunk.position(),
                });
            }
            if chunk.size < 4 {
                return Err(Error::ChunkTooSmall {
                    id: chunk.id,
                    position: chunk.position(),
                    size: chunk.size,
                    needed: 4,
                });
            }

            if reader.cursor != chunk.data_start {
                reader.channel_seek(chunk.data_start)?;
            }
            let mut tag = [0u8; 4];
            reader.fill(&mut tag)?;
            let list_type = FourCc::new(tag);
            if !list_type.is_printable() {
                return Err(Error::InvalidTag {
                    position: chunk.data_start,
                    tag,
                });
            }

            reader.stack.push(Frame {
                id: chunk.id,
                list_type,
                size: chunk.size,
                data_start: chunk.data_start,
            });
            debug!(id = %chunk.id, %list_type, depth = reader.stack.depth(), "entered list");

            reader.enter_level()
        })
    }

    /// Leaves the current list level
    ///
    /// The list chunk becomes the current chunk again; the cursor stays where
    /// it is, inside that chunk's payload. Returns `false` at the top level.
    pub fn ascend(&mut self) -> bool {
        let Some(frame) = self.stack.pop() else {
            return false;
        };
        let chunk = frame.chunk();
        self.offset = self
            .cursor
            .saturating_sub(chunk.data_start)
            .min(chunk.size);
        self.current = Some(chunk);
        true
    }

    /// [`ascend`](Self::ascend), then [`next_chunk`](Self::next_chunk)
    pub fn ascend_next(&mut self) -> Result<Option<ChunkHeader>> {
        if !self.ascend() {
            return Err(Error::AtTopLevel);
        }
        self.next_chunk()
    }

    /// [`ascend`](Self::ascend), then [`seek_level_start`](Self::seek_level_start)
    pub fn ascend_start(&mut self) -> Result<Option<ChunkHeader>> {
        if !self.ascend() {
            return Err(Error::AtTopLevel);
        }
        self.seek_level_start()
    }

    /// Returns to the first chunk of the file, as right after opening
    pub fn rewind(&mut self) -> Result<Option<ChunkHeader>> {
        while self.ascend() {}
        self.seek_level_start()
    }

    // ---- internals ----

    /// Position of the first child header of the current level
    fn level_first_chunk(&self) -> u64 {
        self.stack
            .top()
            .map_or(self.start_offset + HEADER_SIZE as u64, Frame::first_child)
    }

    /// End of the current level; no chunk may extend past it
    fn level_bound(&self) -> u64 {
        self.stack
            .top()
            .map_or(self.start_offset + CHUNK_HEADER_SIZE + self.header.size, Frame::bound)
    }

    fn expected_end(&self) -> Option<u64> {
        self.config
            .expected_size
            .map(|size| self.start_offset.saturating_add(size))
    }

    fn enter_level(&mut self) -> Result<Option<ChunkHeader>> {
        let first = self.level_first_chunk();
        let bound = self.level_bound();
        if bound < first {
            // lists are size-checked before descending, so only the outer header gets here
            return Err(Error::ChunkTooSmall {
                id: self.header.id,
                position: self.start_offset,
                size: self.header.size,
                needed: 4,
            });
        }

        if self.cursor != first {
            self.channel_seek(first)?;
        }
        if bound - first < CHUNK_HEADER_SIZE {
            self.current = None;
            self.offset = 0;
            if bound > first {
                return Err(Error::ExcessBytes {
                    position: first,
                    count: bound - first,
                });
            }
            return Ok(None);
        }

        self.read_chunk_header().map(Some)
    }

    fn read_chunk_header(&mut self) -> Result<ChunkHeader> {
        let position = self.cursor;
        let mut bytes = [0u8; CHUNK_HEADER_SIZE as usize];
        self.fill(&mut bytes)?;
        let chunk = ChunkHeader::parse(&bytes, position)?;

        let limit = self.level_bound();
        if chunk.end() > limit {
            return Err(Error::ChunkExceedsBounds {
                id: chunk.id,
                position,
                end: chunk.end(),
                limit,
            });
        }
        if let Some(end) = self.expected_end() {
            if chunk.end() > end {
                return Err(Error::UnexpectedEof {
                    position,
                    needed: chunk.end() - position,
                    available: end.saturating_sub(position),
                });
            }
        }

        trace!(id = %chunk.id, size = chunk.size, position, "chunk header");
        self.current = Some(chunk);
        self.offset = 0;
        Ok(chunk)
    }

    /// Runs a navigation step; on failure restores the position, current chunk
    /// and depth the reader had before, and reports the error.
    fn transaction<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let cursor = self.cursor;
        let current = self.current;
        let offset = self.offset;
        let depth = self.stack.depth();

        let result = op(self);
        if let Err(err) = &result {
            self.report(err);
            self.stack.truncate(depth);
            self.current = current;
            self.offset = offset;
            if self.cursor != cursor {
                if let Err(seek_err) = self.channel_seek(cursor) {
                    self.report(&seek_err);
                }
            }
        }
        result
    }

    fn report(&mut self, err: &Error) {
        let message = err.to_string();
        self.io.log(&message);
    }

    fn channel_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.io.read(buf)?;
        self.cursor += n as u64;
        Ok(n)
    }

    /// Reads exactly `buf.len()` bytes or fails with `UnexpectedEof`
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let position = self.cursor;
        let mut got = 0;
        while got < buf.len() {
            let n = self.channel_read(&mut buf[got..])?;
            if n == 0 {
                break;
            }
            got += n;
        }

        if got < buf.len() {
            return Err(Error::UnexpectedEof {
                position,
                needed: buf.len() as u64,
                available: got as u64,
            });
        }
        Ok(())
    }

    fn channel_seek(&mut self, position: u64) -> Result<()> {
        let accepted = self.io.seek(position)?;
        self.cursor = accepted;
        if accepted != position {
            return Err(Error::UnexpectedEof {
                position: accepted,
                needed: position.saturating_sub(accepted),
                available: 0,
            });
        }
        Ok(())
    }
}
