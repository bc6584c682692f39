//! Fixture builders shared by the integration tests

#![allow(dead_code)]

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

/// A small WAVE file with an INFO list, odd-sized chunks and a data chunk
pub fn sample_wave() -> Vec<u8> {
    riff(
        b"WAVE",
        &[
            chunk(b"fmt ", &[1, 0, 1, 0, 0x44, 0xac, 0, 0, 0x88, 0x58, 1, 0, 2, 0, 16, 0]),
            list(
                b"LIST",
                b"INFO",
                &[chunk(b"INAM", b"song\0"), chunk(b"IART", b"band\0")],
            ),
            chunk(b"data", &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60]),
            chunk(b"cue ", &[7]),
        ],
    )
}
