// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! A streaming writer over RFC 8259 JSON, implementing
//! [`crate::writer::Writer`]. Numbers are emitted in canonical
//! shortest-round-trip form (Rust's `f64`/`f32` `Display` already
//! produces the shortest decimal that round-trips, matching spec.md
//! §4.5); strings are escaped minimally — only `"`, `\`, and bytes
//! `< 0x20` — and UTF-8 bytes otherwise pass through unchanged. No
//! insignificant whitespace is ever emitted.
//!
//! A container opened with a declared length (`write_array_header`/
//! `write_map_header`) closes itself the instant that many items have
//! been written — matching the contract in `writer.rs` that sized
//! containers need no `write_break` — while one opened with
//! `write_array_start`/`write_map_start` stays open until an explicit
//! `write_break`.

use crate::{
    basen::{self, Alphabet},
    config::JsonEncodingConfig,
    error::{Error, Result},
    io::Output,
    item::Kind,
    writer::Writer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Array { count: u64, remaining: Option<u64> },
    Object {
        count: u64,
        remaining: Option<u64>,
        awaiting_value: bool,
    },
}

pub struct JsonWriter<O> {
    output: O,
    config: JsonEncodingConfig,
    stack: Vec<Frame>,
    root_written: bool,
}

impl<O: Output> JsonWriter<O> {
    pub fn new(output: O) -> Self {
        Self::with_config(output, JsonEncodingConfig::default())
    }

    pub fn with_config(output: O, config: JsonEncodingConfig) -> Self {
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

    /// Places the comma/colon separator for a value about to be written
    /// into the current top-of-stack container, and advances its "key vs
    /// value" state. Never touches `remaining` — that only changes once
    /// the value is fully written, in [`Self::complete_item`].
    fn before_value(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                if self.root_written {
                    return Err(Error::invalid_data(
                        crate::position::Position::zero(),
                        "attempted to write more than one top-level value",
                    ));
                }
            }
            Some(Frame::Array { count, .. }) => {
                if *count > 0 {
                    self.output.write_byte(b',')?;
                }
                *count += 1;
            }
            Some(Frame::Object {
                count,
                awaiting_value,
                ..
            }) => {
                if *awaiting_value {
                    self.output.write_byte(b':')?;
                } else {
                    if *count > 0 {
                        self.output.write_byte(b',')?;
                    }
                    *count += 1;
                }
            }
        }
        Ok(())
    }

    /// Marks one value as fully written into the current top-of-stack
    /// container. For an `Object`, this flips between "expecting a key"
    /// and "expecting a value" (a key write and its value write are
    /// otherwise indistinguishable calls into this writer). For a sized
    /// container, decrements the declared length and, once it reaches
    /// zero, closes the bracket and recurses — closing it is itself
    /// completing an item one level up.
    fn complete_item(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.root_written = true;
                Ok(())
            }
            Some(Frame::Array { remaining, .. }) => {
                let exhausted = match remaining {
                    Some(n) => {
                        *n -= 1;
                        *n == 0
                    }
                    None => false,
                };
                if exhausted {
                    self.stack.pop();
                    self.output.write_byte(b']')?;
                    self.complete_item()?;
                }
                Ok(())
            }
            Some(Frame::Object {
                remaining,
                awaiting_value,
                ..
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
                    self.output.write_byte(b'}')?;
                    self.complete_item()?;
                }
                Ok(())
            }
        }
    }

    fn write_raw_number_text(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        self.output.write_bytes(text.as_bytes())?;
        self.complete_item()
    }

    fn write_escaped_string(&mut self, value: &str) -> Result<()> {
        self.before_value()?;
        self.output.write_byte(b'"')?;
        let bytes = value.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            let escape: &[u8] = match b {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                0x08 => b"\\b",
                0x0c => b"\\f",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x00..=0x1f => {
                    if start < i {
                        self.output.write_bytes(&bytes[start..i])?;
                    }
                    let mut buf = *b"\\u0000";
                    let hex = b"0123456789abcdef";
                    buf[4] = hex[(b >> 4) as usize];
                    buf[5] = hex[(b & 0xf) as usize];
                    self.output.write_bytes(&buf)?;
                    start = i + 1;
                    continue;
                }
                _ => continue,
            };
            if start < i {
                self.output.write_bytes(&bytes[start..i])?;
            }
            self.output.write_bytes(escape)?;
            start = i + 1;
        }
        if start < bytes.len() {
            self.output.write_bytes(&bytes[start..])?;
        }
        self.output.write_byte(b'"')?;
        self.complete_item()
    }

    fn check_nesting(&self) -> Result<()> {
        if self.stack.len() as u32 >= self.config.limits.max_nesting_levels {
            return Err(Error::overflow(
                crate::position::Position::zero(),
                "maximum nesting depth exceeded",
            ));
        }
        Ok(())
    }

    /// Closes a sized array/object that turned out to be empty — such a
    /// container never gets a value write to trigger `complete_item`'s
    /// auto-close, so the header write has to do it directly.
    fn close_if_empty(&mut self) -> Result<()> {
        let empty = matches!(
            self.stack.last(),
            Some(Frame::Array {
                remaining: Some(0),
                ..
            }) | Some(Frame::Object {
                remaining: Some(0),
                ..
            })
        );
        if !empty {
            return Ok(());
        }
        match self.stack.pop() {
            Some(Frame::Array { .. }) => self.output.write_byte(b']')?,
            Some(Frame::Object { .. }) => self.output.write_byte(b'}')?,
            None => unreachable!(),
        }
        self.complete_item()
    }
}

/// Format an `f64` the way RFC 8259 number literals require: Rust's
/// `Display` for floats already produces the shortest decimal that
/// parses back to the same value, but emits `inf`/`NaN` for non-finite
/// values and omits a few JSON-required touches (`-0` survives as `-0`,
/// a bare integer needs no trailing `.0`).
fn format_double(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::unsupported_element(
            crate::position::Position::zero(),
            Kind::Double,
        ));
    }
    Ok(format!("{value}"))
}

impl<O: Output> Writer for JsonWriter<O> {
    fn is_json(&self) -> bool {
        true
    }

    fn write_null(&mut self) -> Result<&mut Self> {
        self.before_value()?;
        self.output.write_bytes(b"null")?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_undefined(&mut self) -> Result<&mut Self> {
        self.write_null()
    }

    fn write_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.before_value()?;
        self.output.write_bytes(if value { b"true" } else { b"false" })?;
        self.complete_item()?;
        Ok(self)
    }

    fn write_int(&mut self, value: i64) -> Result<&mut Self> {
        if self.config.write_longs_as_floating_point {
            return self.write_double(value as f64);
        }
        self.write_raw_number_text(&value.to_string())?;
        Ok(self)
    }

    fn write_long(&mut self, value: i64) -> Result<&mut Self> {
        self.write_int(value)
    }

    fn write_over_long(&mut self, negative: bool, magnitude: u64) -> Result<&mut Self> {
        let text = if negative {
            format!("-{magnitude}")
        } else {
            magnitude.to_string()
        };
        self.write_raw_number_text(&text)?;
        Ok(self)
    }

    fn write_float16(&mut self, bits: u16) -> Result<&mut Self> {
        self.write_double(crate::codec::half_to_f32(bits) as f64)
    }

    fn write_float(&mut self, value: f32) -> Result<&mut Self> {
        self.write_double(value as f64)
    }

    fn write_double(&mut self, value: f64) -> Result<&mut Self> {
        let text = format_double(value)?;
        self.write_raw_number_text(&text)?;
        Ok(self)
    }

    fn write_number_string(&mut self, value: &str) -> Result<&mut Self> {
        self.write_raw_number_text(value)?;
        Ok(self)
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<&mut Self> {
        let encoded = basen::encode(Alphabet::Base64, value);
        self.write_escaped_string(&encoded)?;
        Ok(self)
    }

    fn write_bytes_start(&mut self) -> Result<&mut Self> {
        Err(Error::unsupported_element(
            crate::position::Position::zero(),
            Kind::BytesStart,
        ))
    }

    fn write_string(&mut self, value: &str) -> Result<&mut Self> {
        self.write_escaped_string(value)?;
        Ok(self)
    }

    fn write_text_start(&mut self) -> Result<&mut Self> {
        Err(Error::unsupported_element(
            crate::position::Position::zero(),
            Kind::TextStart,
        ))
    }

    fn write_array_header(&mut self, len: u64) -> Result<&mut Self> {
        self.before_value()?;
        self.check_nesting()?;
        self.output.write_byte(b'[')?;
        self.stack.push(Frame::Array {
            count: 0,
            remaining: Some(len),
        });
        self.close_if_empty()?;
        Ok(self)
    }

    fn write_array_start(&mut self) -> Result<&mut Self> {
        self.before_value()?;
        self.check_nesting()?;
        self.output.write_byte(b'[')?;
        self.stack.push(Frame::Array {
            count: 0,
            remaining: None,
        });
        Ok(self)
    }

    fn write_map_header(&mut self, len: u64) -> Result<&mut Self> {
        self.before_value()?;
        self.check_nesting()?;
        self.output.write_byte(b'{')?;
        self.stack.push(Frame::Object {
            count: 0,
            remaining: Some(len),
            awaiting_value: false,
        });
        self.close_if_empty()?;
        Ok(self)
    }

    fn write_map_start(&mut self) -> Result<&mut Self> {
        self.before_value()?;
        self.check_nesting()?;
        self.output.write_byte(b'{')?;
        self.stack.push(Frame::Object {
            count: 0,
            remaining: None,
            awaiting_value: false,
        });
        Ok(self)
    }

    fn write_tag(&mut self, _tag: u64) -> Result<&mut Self> {
        Ok(self)
    }

    fn write_break(&mut self) -> Result<&mut Self> {
        match self.stack.last() {
            Some(Frame::Array { remaining: None, .. }) => {
                self.stack.pop();
                self.output.write_byte(b']')?;
            }
            Some(Frame::Object { remaining: None, .. }) => {
                self.stack.pop();
                self.output.write_byte(b'}')?;
            }
            Some(_) => {
                return Err(Error::invalid_data(
                    crate::position::Position::zero(),
                    "write_break on a sized container, which closes itself",
                ))
            }
            None => {
                return Err(Error::invalid_data(
                    crate::position::Position::zero(),
                    "write_break with no open container",
                ))
            }
        }
        self.complete_item()?;
        Ok(self)
    }

    fn write_simple_value(&mut self, _value: u8) -> Result<&mut Self> {
        Err(Error::unsupported_element(
            crate::position::Position::zero(),
            Kind::SimpleValue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::VecOutput;

    fn write(f: impl FnOnce(&mut JsonWriter<VecOutput>) -> Result<()>) -> String {
        let mut w = JsonWriter::new(VecOutput::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner().result()).unwrap()
    }

    #[test]
    fn writes_scalars() {
        assert_eq!(write(|w| w.write_null().map(|_| ())), "null");
        assert_eq!(write(|w| w.write_bool(true).map(|_| ())), "true");
        assert_eq!(write(|w| w.write_int(42).map(|_| ())), "42");
        assert_eq!(write(|w| w.write_string("hi").map(|_| ())), "\"hi\"");
    }

    #[test]
    fn escapes_control_and_quote_characters() {
        assert_eq!(write(|w| w.write_string("a\nb\"c").map(|_| ())), "\"a\\nb\\\"c\"");
        assert_eq!(write(|w| w.write_string("\u{1}").map(|_| ())), "\"\\u0001\"");
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
        assert_eq!(out, "[1,2,3]");
    }

    #[test]
    fn sized_object_closes_itself_once_declared_length_is_met() {
        let out = write(|w| {
            w.write_map_header(2)?;
            w.write_string("a")?;
            w.write_int(1)?;
            w.write_string("b")?;
            w.write_int(2)?;
            Ok(())
        });
        assert_eq!(out, "{\"a\":1,\"b\":2}");
    }

    #[test]
    fn indefinite_containers_require_an_explicit_break() {
        let out = write(|w| {
            w.write_array_start()?;
            w.write_int(1)?;
            w.write_int(2)?;
            w.write_break()?;
            Ok(())
        });
        assert_eq!(out, "[1,2]");
    }

    #[test]
    fn writes_empty_containers() {
        assert_eq!(write(|w| w.write_array_header(0).map(|_| ())), "[]");
        assert_eq!(write(|w| w.write_map_header(0).map(|_| ())), "{}");
        assert_eq!(write(|w| w.write_array_start().and_then(|w| w.write_break()).map(|_| ())), "[]");
        assert_eq!(write(|w| w.write_map_start().and_then(|w| w.write_break()).map(|_| ())), "{}");
    }

    #[test]
    fn nested_sized_containers_close_themselves_in_order() {
        let out = write(|w| {
            w.write_array_header(2)?;
            w.write_array_header(1)?;
            w.write_int(1)?;
            w.write_int(2)?;
            Ok(())
        });
        assert_eq!(out, "[[1],2]");
    }

    #[test]
    fn over_long_integer_is_textual() {
        assert_eq!(
            write(|w| w.write_over_long(false, u64::MAX).map(|_| ())),
            u64::MAX.to_string()
        );
    }

    #[test]
    fn tag_is_dropped_silently() {
        assert_eq!(write(|w| w.write_tag(0).and_then(|w| w.write_int(1)).map(|_| ())), "1");
    }
}
