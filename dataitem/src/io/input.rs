// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

use std::io::Read;

use super::Input;
use crate::{
    error::{Error, Result},
    position::Position,
};

/// An `Input` backed by a contiguous, already-in-memory byte slice. This
/// is the flavour that enables the JSON back-end's direct-parsing fast
/// path: `remaining_slice` exposes the unread tail so the SWAR scanner
/// can classify whole words without going through `read_byte` at all.
pub struct SliceInput<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceInput<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl<'a> Input for SliceInput<'a> {
    fn position(&self) -> Position {
        Position::new(self.pos as u64)
    }

    fn is_at_end(&mut self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn read_byte(&mut self) -> Result<u8> {
        match self.bytes.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(Error::InsufficientInput(self.position())),
        }
    }

    fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        let n = n as usize;
        let end = self.pos.checked_add(n).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice.to_vec())
            }
            None => Err(Error::InsufficientInput(self.position())),
        }
    }

    fn unread(&mut self, n: u64) {
        self.pos -= n as usize;
    }

    fn remaining_slice(&self) -> Option<&[u8]> {
        Some(&self.bytes[self.pos..])
    }
}

/// An `Input` backed by any `std::io::Read`, with internal buffering.
/// Never takes the direct-parsing fast path (`remaining_slice` is
/// `None`); every byte goes through a small ring buffer one read-through
/// at a time. `unread` is limited to bytes still resident in that buffer.
pub struct ReadInput<R> {
    reader: R,
    buf: Vec<u8>,
    buf_pos: usize,
    consumed_before_buf: u64,
}

impl<R: Read> ReadInput<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 8 * 1024)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(capacity),
            buf_pos: 0,
            consumed_before_buf: 0,
        }
    }

    fn fill(&mut self) -> Result<bool> {
        if self.buf_pos < self.buf.len() {
            return Ok(true);
        }
        self.consumed_before_buf += self.buf.len() as u64;
        self.buf.clear();
        self.buf_pos = 0;
        let capacity = self.buf.capacity();
        self.buf.resize(capacity, 0);
        let n = self.reader.read(&mut self.buf)?;
        self.buf.truncate(n);
        Ok(n > 0)
    }
}

impl<R: Read> Input for ReadInput<R> {
    fn position(&self) -> Position {
        Position::new(self.consumed_before_buf + self.buf_pos as u64)
    }

    fn is_at_end(&mut self) -> bool {
        !self.fill().unwrap_or(false)
    }

    fn read_byte(&mut self) -> Result<u8> {
        if !self.fill()? {
            return Err(Error::InsufficientInput(self.position()));
        }
        let b = self.buf[self.buf_pos];
        self.buf_pos += 1;
        Ok(b)
    }

    fn unread(&mut self, n: u64) {
        self.buf_pos -= n as usize;
    }
}
