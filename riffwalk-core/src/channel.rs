//! Byte channels a [`crate::RiffReader`] reads through
//!
//! A channel only moves bytes. The reader keeps its own absolute cursor and
//! repositions the channel explicitly, so implementations never need to report
//! where they are.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Read/seek/log capability injected into a reader
pub trait Channel {
    /// Reads up to `buf.len()` bytes. A short count means no more data is
    /// available right now; it is not an error by itself.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Moves to an absolute position and returns the position actually reached.
    fn seek(&mut self, position: u64) -> io::Result<u64>;

    /// Diagnostic sink. Never affects control flow.
    fn log(&mut self, message: &str) {
        tracing::warn!(target: "riffwalk", "{message}");
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        (**self).seek(position)
    }

    fn log(&mut self, message: &str) {
        (**self).log(message)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        (**self).seek(position)
    }

    fn log(&mut self, message: &str) {
        (**self).log(message)
    }
}

/// Channel over an in-memory byte slice
///
/// Seeking always succeeds, even past the end; reads there return 0 bytes.
#[derive(Debug, Clone)]
pub struct MemoryChannel<'a> {
    data: &'a [u8],
    position: u64,
}

impl<'a> MemoryChannel<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Channel for MemoryChannel<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = self.position.min(self.len()) as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        self.position = position;
        Ok(position)
    }
}

/// Channel over any seekable reader (files, cursors, pipes wrapped in buffers)
#[derive(Debug)]
pub struct StreamChannel<R> {
    inner: R,
}

impl<R: Read + Seek> StreamChannel<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Current position of the wrapped stream, used as the RIFF start offset
    /// when a reader is opened mid-stream.
    pub fn stream_position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl StreamChannel<BufReader<File>> {
    /// Opens a named file for reading; also returns its length in bytes.
    pub fn open_file<P: AsRef<Path>>(path: P) -> io::Result<(Self, u64)> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok((Self::new(BufReader::new(file)), len))
    }
}

impl<R: Read + Seek> Channel for StreamChannel<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_channel_clamps_reads() {
        let data = [1u8, 2, 3, 4, 5];
        let mut channel = MemoryChannel::new(&data);

        let mut buf = [0u8; 3];
        assert_eq!(channel.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(channel.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);
        assert_eq!(channel.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_channel_seek_past_end() {
        let data = [1u8, 2];
        let mut channel = MemoryChannel::new(&data);

        assert_eq!(channel.seek(10).unwrap(), 10);
        let mut buf = [0u8; 4];
        assert_eq!(channel.read(&mut buf).unwrap(), 0);

        assert_eq!(channel.seek(1).unwrap(), 1);
        assert_eq!(channel.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 2);
    }

    #[test]
    fn test_stream_channel_reads_fully() {
        let mut channel = StreamChannel::new(Cursor::new(vec![9u8; 32]));
        assert_eq!(channel.seek(30).unwrap(), 30);
        let mut buf = [0u8; 8];
        assert_eq!(channel.read(&mut buf).unwrap(), 2);
        assert_eq!(channel.stream_position().unwrap(), 32);
    }

    #[test]
    fn test_borrowed_channel_forwards() {
        let data = [7u8; 4];
        let mut channel = MemoryChannel::new(&data);
        {
            let mut borrowed = &mut channel;
            let mut buf = [0u8; 2];
            assert_eq!(Channel::read(&mut borrowed, &mut buf).unwrap(), 2);
        }
        let mut buf = [0u8; 4];
        assert_eq!(channel.read(&mut buf).unwrap(), 2);
    }
}
