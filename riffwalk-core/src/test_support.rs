//! Builders for in-memory RIFF fixtures

use crate::Channel;
use std::io;

/// A chunk with its payload, padded to even length
pub fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 9);
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// A list chunk: type tag followed by the already-encoded children
pub fn list(id: &[u8; 4], list_type: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = list_type.to_vec();
    for child in children {
        payload.extend_from_slice(child);
    }
    chunk(id, &payload)
}

pub fn riff(form_type: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
    list(b"RIFF", form_type, children)
}

/// Memory channel that records everything sent to the diagnostic sink
#[derive(Debug)]
pub struct RecordingChannel<'a> {
    pub inner: crate::MemoryChannel<'a>,
    pub messages: Vec<String>,
}

impl<'a> RecordingChannel<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: crate::MemoryChannel::new(data),
            messages: Vec::new(),
        }
    }
}

impl Channel for RecordingChannel<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        self.inner.seek(position)
    }

    fn log(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
