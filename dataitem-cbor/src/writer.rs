// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! A streaming writer over RFC 8949 CBOR, implementing
//! [`dataitem::writer::Writer`]. Integers are always written in the
//! shortest form their value admits; no separator bytes exist on the
//! wire, so (unlike the JSON writer) there is nothing to emit between
//! sibling items — only the bookkeeping that decides when a
//! declared-length container has seen its last element and can close
//! itself with no trailing marker.
//!
//! A container opened with a declared length (`write_array_header`/
//! `write_map_header`) closes itself the instant that many items have
//! been written, matching `writer.rs`'s contract; one opened with
//! `write_array_start`/`write_map_start` stays open until an explicit
//! `write_break`. `write_tag` writes its head byte and returns
//! immediately without touching this bookkeeping at all — tags chain
//! freely because the item they annotate is what eventually completes.

use dataitem::{
    bignum::{parse_decimal_string, BigInt},
    config::CborEncodingConfig,
    error::{Error, Result},
    io::Output,
    item::Kind,
    position::Position,
    writer::Writer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Array { remaining: Option<u64> },
    /// `remaining` counts key/value *pairs*.
    Map {
        remaining: Option<u64>,
        awaiting_value: bool,
    },
    /// Indefinite byte/text strings only: definite ones need no frame,
    /// since their declared length is carried entirely in the head byte
    /// with nothing further to track.
    Bytes,
    Text,
}

pub struct CborWriter<O> {
    output: O,
    config: CborEncodingConfig,
    stack: Vec<Frame>,
    root_written: bool,
}

impl<O: Output> CborWriter<O> {
    pub fn new(output: O) -> Self {
        Self::with_config(output, CborEncodingConfig::default())
    }

    pub fn with_config(output: O, config: CborEncodingConfig) -> Self {
        Self {
            output,
            config,
            stack: Vec::new(),
            root_written: false,
        }
    }

    pub fn into_inner(self) -> O {
        self.output
    }

    fn check_root(&self) -> Result<()> {
        if self.stack.is_empty() && self.root_written {
            return Err(Error::invalid_data(
                Position::zero(),
                "attempted to write more than one top-level value",
            ));
        }
        Ok(())
    }

    fn check_nesting(&self) -> Result<()> {
        if self.stack.len() as u32 >= self.config.limits.max_nesting_levels {
            return Err(Error::overflow(Position::zero(), "maximum nesting depth exceeded"));
        }
        Ok(())
    }

    /// Writes a head byte (`major << 5 | info`) followed by however many
    /// argument bytes the shortest encoding of `value` requires.
    fn write_uint(&mut self, major: u8, value: u64) -> Result<()> {
        let head = major << 5;
        if value < 24 {
            self.output.write_byte(head | value as u8)?;
        } else if value <= u8::MAX as u64 {
            self.output.write_byte(head | 24)?;
            self.output.write_byte(value as u8)?;
        } else if value <= u16::MAX as u64 {
            self.output.write_byte(head | 25)?;
            self.output.write_double_byte_be(value as u16)?;
        } else if value <= u32::MAX as u64 {
            self.output.write_byte(head | 26)?;
            self.output.write_quad_byte_be(value as u32)?;
        } else {
            self.output.write_byte(head | 27)?;
            self.output.write_octa_byte_be(value)?;
        }
        Ok(())
    }

    /// Marks the item just written as complete, decrementing the
    /// enclosing sized container's declared length (if any). Once that
    /// hits zero the container needs no closing byte — CBOR carries a
    /// definite length entirely in its head — so this just pops the
    /// frame and recurses, since the container itself now counts as one
    /// completed item of its own parent.
    fn complete_item(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.root_written = true;
                Ok(())
            }
            Some(Frame::Array { remaining }) => {
                let exhausted = match remaining {
                    Some(n) => {
                        *n -= 1;
                        *n == 0
                    }
                    None => false,
                };
                if exhausted {
                    self.stack.pop();
                    self.complete_item()?;
                }
                Ok(())
            }
            Some(Frame::Map {
                remaining,
                awaiting_value,
            }) => {
                *awaiting_value = !*awaiting_value;
                if *awaiting_value {
                    return Ok(());
                }
                let exhausted = match remaining {
                    Some(n) => {
                        *n -= 1;
                        *n == 0
                    }
                    None => false,
                };
                if exhausted {
                    self.stack.pop();
                    self.complete_item()?;
                }
                Ok(())
            }
            Some(Frame::Bytes) | Some(Frame::Text) => Ok(()),
        }
    }

    /// A sized container whose declared length is zero never gets a
    /// value write to trigger `complete_item`'s auto-close.
    fn close_if_empty(&mut self) -> Result<()> {
        let empty = matches!(
            self.stack.last(),
            Some(Frame::Array { remaining: Some(0) }) | Some(Frame::Map { remaining: Some(0), .. })
        );
        if !empty {
            return Ok(());
        }
        self.stack.pop();
        self.complete_item()
    }

    fn write_definite_string(&mut self, major: u8, bytes: &[u8]) -> Result<()> {
        self.write_uint(major, bytes.len() as u64)?;
        self.output.write_bytes(bytes)
    }
}

impl<O: Output> Writer for CborWriter<O> {
    fn is_json(&self) -> bool {
        false
    }

    fn write_null(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(0xf6)?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_undefined(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(0xf7)?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(if value { 0xf5 } else { 0xf4 })?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_int(&mut self, value: i64) -> Result<&mut Self> {
        self.check_root()?;
        if value >= 0 {
            self.write_uint(0, value as u64)?;
        } else {
            let magnitude = (-(value as i128) - 1) as u64;
            self.write_uint(1, magnitude)?;
        }
        self.complete_item()?;
        Ok(self)
    }

    fn write_long(&mut self, value: i64) -> Result<&mut Self> {
        self.write_int(value)
    }

    fn write_over_long(&mut self, negative: bool, magnitude: u64) -> Result<&mut Self> {
        self.check_root()?;
        self.write_uint(if negative { 1 } else { 0 }, magnitude)?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_float16(&mut self, bits: u16) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(0xf9)?;
        self.output.write_double_byte_be(bits)?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_float(&mut self, value: f32) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(0xfa)?;
        self.output.write_quad_byte_be(value.to_bits())?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_double(&mut self, value: f64) -> Result<&mut Self> {
        self.check_root()?;
        self.output.write_byte(0xfb)?;
        self.output.write_octa_byte_be(value.to_bits())?;
        self.complete_item()?;
        Ok(self)
    }

    /// CBOR has no literal-decimal-text wire form, so a number string is
    /// routed through the same digit-shifting logic the built-in
    /// `BigInt`/`BigDecimal` codecs use: an integer literal becomes the
    /// shortest integer encoding (or a bignum tag, for one too wide for
    /// `i64`), a fractional literal becomes a tag-4 decimal fraction.
    fn write_number_string(&mut self, value: &str) -> Result<&mut Self> {
        if let Some(n) = BigInt::from_decimal_str(value) {
            if let Some(small) = n.to_i64() {
                return self.write_int(small);
            }
            self.write_tag(if n.is_negative() { 3 } else { 2 })?;
            return self.write_bytes(n.magnitude_be());
        }
        let d = parse_decimal_string(value)
            .ok_or_else(|| Error::invalid_data(Position::zero(), "not a decimal literal"))?;
        self.write_tag(4)?;
        self.write_array_header(2)?;
        self.write_int(-d.scale())?;
        match d.unscaled().to_i64() {
            Some(small) => {
                self.write_int(small)?;
            }
            None => {
                self.write_tag(if d.unscaled().is_negative() { 3 } else { 2 })?;
                self.write_bytes(d.unscaled().magnitude_be())?;
            }
        }
        Ok(self)
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<&mut Self> {
        let chunked = matches!(self.stack.last(), Some(Frame::Bytes));
        if !chunked {
            self.check_root()?;
        }
        self.write_definite_string(2, value)?;
        if !chunked {
            self.complete_item()?;
        }
        Ok(self)
    }

    fn write_bytes_start(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.output.write_byte(0x5f)?;
        self.stack.push(Frame::Bytes);
        Ok(self)
    }

    fn write_string(&mut self, value: &str) -> Result<&mut Self> {
        let chunked = matches!(self.stack.last(), Some(Frame::Text));
        if !chunked {
            self.check_root()?;
        }
        self.write_definite_string(3, value.as_bytes())?;
        if !chunked {
            self.complete_item()?;
        }
        Ok(self)
    }

    fn write_text_start(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.output.write_byte(0x7f)?;
        self.stack.push(Frame::Text);
        Ok(self)
    }

    fn write_array_header(&mut self, len: u64) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.write_uint(4, len)?;
        self.stack.push(Frame::Array { remaining: Some(len) });
        self.close_if_empty()?;
        Ok(self)
    }

    fn write_array_start(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.output.write_byte(0x9f)?;
        self.stack.push(Frame::Array { remaining: None });
        Ok(self)
    }

    fn write_map_header(&mut self, len: u64) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.write_uint(5, len)?;
        self.stack.push(Frame::Map {
            remaining: Some(len),
            awaiting_value: false,
        });
        self.close_if_empty()?;
        Ok(self)
    }

    fn write_map_start(&mut self) -> Result<&mut Self> {
        self.check_root()?;
        self.check_nesting()?;
        self.output.write_byte(0xbf)?;
        self.stack.push(Frame::Map {
            remaining: None,
            awaiting_value: false,
        });
        Ok(self)
    }

    fn write_tag(&mut self, tag: u64) -> Result<&mut Self> {
        self.check_root()?;
        self.write_uint(6, tag)?;
        Ok(self)
    }

    fn write_break(&mut self) -> Result<&mut Self> {
        match self.stack.last() {
            Some(Frame::Array { remaining: None })
            | Some(Frame::Map { remaining: None, .. })
            | Some(Frame::Bytes)
            | Some(Frame::Text) => {
                self.stack.pop();
                self.output.write_byte(0xff)?;
            }
            Some(_) => {
                return Err(Error::invalid_data(
                    Position::zero(),
                    "write_break on a sized container, which closes itself",
                ))
            }
            None => return Err(Error::invalid_data(Position::zero(), "write_break with no open container")),
        }
        self.complete_item()?;
        Ok(self)
    }

    fn write_simple_value(&mut self, value: u8) -> Result<&mut Self> {
        self.check_root()?;
        if (24..32).contains(&value) {
            return Err(Error::unsupported_element(Position::zero(), Kind::SimpleValue));
        }
        if value < 24 {
            self.output.write_byte((7 << 5) | value)?;
        } else {
            self.output.write_byte((7 << 5) | 24)?;
            self.output.write_byte(value)?;
        }
        self.complete_item()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataitem::io::VecOutput;

    fn write(f: impl FnOnce(&mut CborWriter<VecOutput>) -> Result<()>) -> String {
        let mut w = CborWriter::new(VecOutput::new());
        f(&mut w).unwrap();
        hex(&w.into_inner().result())
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    // RFC 8949 Appendix A.
    #[test]
    fn writes_appendix_a_integers() {
        assert_eq!(write(|w| w.write_int(0).map(|_| ())), "00");
        assert_eq!(write(|w| w.write_int(23).map(|_| ())), "17");
        assert_eq!(write(|w| w.write_int(24).map(|_| ())), "1818");
        assert_eq!(write(|w| w.write_int(1_000_000_000_000).map(|_| ())), "1b000000e8d4a51000");
        assert_eq!(write(|w| w.write_int(-1).map(|_| ())), "20");
        assert_eq!(write(|w| w.write_int(i64::MIN).map(|_| ())), "3b7fffffffffffffff");
    }

    #[test]
    fn writes_appendix_a_double() {
        assert_eq!(write(|w| w.write_double(1.1).map(|_| ())), "fb3ff199999999999a");
    }

    #[test]
    fn sized_array_closes_itself_once_declared_length_is_met() {
        let out = write(|w| {
            w.write_array_header(3)?;
            w.write_int(1)?;
            w.write_int(2)?;
            w.write_int(3)?;
            Ok(())
        });
        assert_eq!(out, "83010203");
    }

    #[test]
    fn nested_sized_containers_match_appendix_a() {
        let out = write(|w| {
            w.write_array_header(3)?;
            w.write_int(1)?;
            w.write_array_header(2)?;
            w.write_int(2)?;
            w.write_int(3)?;
            w.write_array_header(2)?;
            w.write_int(4)?;
            w.write_int(5)?;
            Ok(())
        });
        assert_eq!(out, "8301820203820405");
    }

    #[test]
    fn indefinite_array_requires_an_explicit_break() {
        let out = write(|w| {
            w.write_array_start()?;
            w.write_int(1)?;
            w.write_array_header(2)?;
            w.write_int(2)?;
            w.write_int(3)?;
            w.write_array_start()?;
            w.write_int(4)?;
            w.write_int(5)?;
            w.write_break()?;
            w.write_break()?;
            Ok(())
        });
        assert_eq!(out, "9f018202039f0405ffff");
    }

    #[test]
    fn tag_chains_without_completing_early() {
        let out = write(|w| w.write_tag(1).and_then(|w| w.write_int(1_363_896_240)).map(|_| ()));
        assert_eq!(out, "c11a514b67b0");
    }

    #[test]
    fn empty_containers_need_no_closing_byte() {
        assert_eq!(write(|w| w.write_array_header(0).map(|_| ())), "80");
        assert_eq!(write(|w| w.write_map_header(0).map(|_| ())), "a0");
    }

    #[test]
    fn indefinite_text_string_chunks() {
        let out = write(|w| {
            w.write_text_start()?;
            w.write_string("ab")?;
            w.write_string("cde")?;
            w.write_break()?;
            Ok(())
        });
        assert_eq!(out, "7f62616263636465ff");
    }

    #[test]
    fn writes_large_decimal_literal_as_bignum_tag() {
        let out = write(|w| w.write_number_string("18446744073709551616").map(|_| ()));
        assert_eq!(out, "c249010000000000000000");
    }

    #[test]
    fn writes_fractional_literal_as_decimal_fraction_tag() {
        let out = write(|w| w.write_number_string("273.15").map(|_| ()));
        assert_eq!(out, "c48221196ab3");
    }

    #[test]
    fn write_break_on_sized_container_is_rejected() {
        let mut w = CborWriter::new(VecOutput::new());
        w.write_array_header(1).unwrap();
        assert!(w.write_break().is_err());
    }
}
