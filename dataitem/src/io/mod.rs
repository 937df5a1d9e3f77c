// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! Abstract byte containers: a random-access [`Input`] cursor and a
//! growable [`Output`] sink. Both CBOR and JSON back-ends are written
//! against these traits, never against a concrete buffer type, so the
//! same parser/encoder code runs over an in-memory slice, a `std::io`
//! stream, or a third-party byte container.

mod input;
mod output;

pub use input::{ReadInput, SliceInput};
pub use output::{FixedOutput, VecOutput, WriteOutput};

use crate::{error::Result, position::Position};

/// A cursor over a byte sequence.
pub trait Input {
    fn position(&self) -> Position;

    /// Whether the cursor has reached the true end of input. Takes `&mut
    /// self` because a stream-backed implementation may need to attempt
    /// one more fill to tell genuine end-of-input from merely having
    /// drained its current buffer.
    fn is_at_end(&mut self) -> bool;

    fn read_byte(&mut self) -> Result<u8>;

    fn read_double_byte_be(&mut self) -> Result<u16> {
        let hi = self.read_byte()?;
        let lo = self.read_byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn read_quad_byte_be(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(u32::from_be_bytes(buf))
    }

    fn read_octa_byte_be(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(u64::from_be_bytes(buf))
    }

    fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n.min(1 << 20) as usize);
        for _ in 0..n {
            out.push(self.read_byte()?);
        }
        Ok(out)
    }

    /// Step the cursor back by `n` bytes. Used to push back a look-ahead
    /// byte once a scanner has determined it belongs to the next token.
    fn unread(&mut self, n: u64);

    /// When the input is backed by a contiguous in-memory buffer, expose
    /// the remaining unread bytes so a format's parser can take a direct
    /// parsing fast path instead of the generic byte-at-a-time path.
    /// `None` for stream-backed inputs.
    fn remaining_slice(&self) -> Option<&[u8]> {
        None
    }
}

/// An append-only byte sink.
pub trait Output {
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    fn write_double_byte_be(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_quad_byte_be(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_octa_byte_be(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }
}
