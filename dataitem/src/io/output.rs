// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

use std::io::Write;

use super::Output;
use crate::{
    config::Limits,
    error::{Error, Result},
    position::Position,
};

/// A growable `Vec<u8>`-backed [`Output`], optionally drawing its initial
/// buffer from a per-thread pool (see `crate::pool`) when
/// `Limits::allow_buffer_caching` is set.
pub struct VecOutput {
    buf: Vec<u8>,
    pooled: bool,
}

impl VecOutput {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pooled: false,
        }
    }

    pub fn with_limits(limits: &Limits) -> Self {
        if limits.allow_buffer_caching {
            let buf = crate::pool::take(limits.buffer_size);
            Self { buf, pooled: true }
        } else {
            Self {
                buf: Vec::with_capacity(limits.buffer_size),
                pooled: false,
            }
        }
    }

    /// Hand ownership of the written bytes to the caller. If this output
    /// drew its buffer from the pool, the pool slot has already been
    /// cleared by `with_limits`, so no further bookkeeping is needed here
    /// — the buffer simply does not return until the *next* `VecOutput`
    /// with caching enabled is dropped (see `crate::pool::give_back`).
    pub fn result(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for VecOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VecOutput {
    fn drop(&mut self) {
        if self.pooled {
            let buf = std::mem::take(&mut self.buf);
            crate::pool::give_back(buf);
        }
    }
}

impl Output for VecOutput {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.buf.push(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// An [`Output`] writing into a caller-supplied fixed-size buffer; fails
/// with [`Error::Overflow`] once the buffer is full.
pub struct FixedOutput<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FixedOutput<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }
}

impl<'a> Output for FixedOutput<'a> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.pos >= self.buf.len() {
            return Err(Error::overflow(
                Position::new(self.pos as u64),
                "fixed output buffer exhausted",
            ));
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }
}

/// An [`Output`] forwarding to any `std::io::Write`.
pub struct WriteOutput<W> {
    writer: W,
    written: u64,
}

impl<W: Write> WriteOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Output for WriteOutput<W> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.writer.write_all(&[byte])?;
        self.written += 1;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(feature = "bytes")]
pub struct BytesOutput {
    buf: bytes::BytesMut,
}

#[cfg(feature = "bytes")]
impl BytesOutput {
    pub fn new() -> Self {
        Self {
            buf: bytes::BytesMut::new(),
        }
    }

    pub fn result(self) -> bytes::Bytes {
        self.buf.freeze()
    }
}

#[cfg(feature = "bytes")]
impl Default for BytesOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "bytes")]
impl Output for BytesOutput {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.buf.extend_from_slice(&[byte]);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}
