//! Replay file reader
//!
//! A replay file is a sequence of notification frames, each prefixed by its
//! length as a little-endian u32.

use bytes::{Buf, Bytes};
use std::path::Path;

use crate::error::CliError;

/// Read every frame of a replay file
pub fn read_frames(path: &Path) -> Result<Vec<Bytes>, CliError> {
    let data = std::fs::read(path)?;
    split_frames(Bytes::from(data))
}

fn split_frames(mut data: Bytes) -> Result<Vec<Bytes>, CliError> {
    let total = data.len();
    let mut frames = Vec::new();
    while data.has_remaining() {
        let offset = total - data.remaining();
        if data.remaining() < 4 {
            return Err(CliError::ReplayTruncated {
                offset,
                needed: 4,
                remaining: data.remaining(),
            });
        }
        let len = data.get_u32_le() as usize;
        if data.remaining() < len {
            return Err(CliError::ReplayTruncated {
                offset,
                needed: len,
                remaining: data.remaining(),
            });
        }
        frames.push(data.split_to(len));
    }
    Ok(frames)
}

#[cfg(test)]
pub(crate) fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}
