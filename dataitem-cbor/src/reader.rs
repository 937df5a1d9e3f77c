// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! A pull parser over RFC 8949 CBOR, implementing
//! [`dataitem::reader::Reader`].
//!
//! Unlike JSON, every CBOR container carries its shape on the wire: a
//! definite-length array/map/string declares its count in the head
//! byte and needs no closing marker, while an indefinite one opens with
//! a dedicated marker and closes with a `Break` (`0xff`). This reader
//! tracks open containers on an explicit [`Frame`] stack both to bound
//! nesting depth and — since a definite container has no terminator on
//! the wire — to know when the last of its declared items has gone by,
//! so the container can close itself without the caller ever issuing
//! an explicit `read_break` (matching `Writer`'s contract that sized
//! containers need no `write_break`).

use dataitem::{
    config::CborDecodingConfig,
    error::{Error, Result},
    io::Input,
    item::Kind,
    position::Position,
    reader::Reader,
    receptacle::Receptacle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Array { remaining: Option<u64> },
    /// `remaining` counts key/value *pairs*, decremented once per value.
    Map {
        remaining: Option<u64>,
        awaiting_value: bool,
    },
    IndefBytes,
    IndefText,
}

pub struct CborReader<I> {
    input: I,
    config: CborDecodingConfig,
    receptacle: Receptacle,
    stack: Vec<Frame>,
    root_done: bool,
}

impl<I: Input> CborReader<I> {
    pub fn new(input: I) -> Self {
        Self::with_config(input, CborDecodingConfig::default())
    }

    pub fn with_config(input: I, config: CborDecodingConfig) -> Self {
        Self {
            input,
            config,
            receptacle: Receptacle::new(),
            stack: Vec::new(),
            root_done: false,
        }
    }

    pub fn into_inner(self) -> I {
        self.input
    }

    fn check_nesting(&self) -> Result<()> {
        if self.stack.len() as u32 >= self.config.limits.max_nesting_levels {
            return Err(Error::overflow(self.input.position(), "maximum nesting depth exceeded"));
        }
        Ok(())
    }

    /// Marks the item that was just produced as fully read from the
    /// wire's point of view. Decrements the declared length of the
    /// enclosing sized container (if any); once that hits zero the
    /// container closes itself and this recurses, since closing it
    /// completes one item of *its* parent in turn. At the root, marks
    /// the single top-level value as done.
    fn complete(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.root_done = true;
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
                    self.complete()?;
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
                    self.complete()?;
                }
                Ok(())
            }
            Some(Frame::IndefBytes) | Some(Frame::IndefText) => Ok(()),
        }
    }

    fn read_uint_arg(&mut self, info: u8, position: Position) -> Result<u64> {
        match info {
            0..=23 => Ok(info as u64),
            24 => Ok(self.input.read_byte()? as u64),
            25 => Ok(self.input.read_double_byte_be()? as u64),
            26 => Ok(self.input.read_quad_byte_be()? as u64),
            27 => Ok(self.input.read_octa_byte_be()?),
            _ => Err(Error::invalid_data(
                position,
                "reserved or indefinite-length marker is not valid for an integer",
            )),
        }
    }

    /// `None` for an indefinite-length marker (additional info 31),
    /// `Some(len)` otherwise.
    fn read_length(&mut self, info: u8, position: Position) -> Result<Option<u64>> {
        match info {
            0..=23 => Ok(Some(info as u64)),
            24 => Ok(Some(self.input.read_byte()? as u64)),
            25 => Ok(Some(self.input.read_double_byte_be()? as u64)),
            26 => Ok(Some(self.input.read_quad_byte_be()? as u64)),
            27 => Ok(Some(self.input.read_octa_byte_be()?)),
            28..=30 => Err(Error::invalid_data(position, "reserved CBOR additional information value")),
            31 => Ok(None),
            _ => unreachable!("additional information is 5 bits"),
        }
    }

    fn finish_int(&mut self, negative: bool, magnitude: u64) -> Result<Kind> {
        let fits = if negative {
            magnitude <= i64::MAX as u64 + 1
        } else {
            magnitude <= i64::MAX as u64
        };
        let kind = if fits {
            let v = if negative {
                if magnitude == i64::MAX as u64 + 1 {
                    i64::MIN
                } else {
                    -(magnitude as i64)
                }
            } else {
                magnitude as i64
            };
            self.receptacle.set_int(v);
            Kind::Int
        } else {
            self.receptacle.set_long(negative, magnitude);
            Kind::Long
        };
        self.complete()?;
        Ok(kind)
    }

    fn decode_string(&mut self, info: u8, position: Position, is_text: bool) -> Result<Kind> {
        match self.read_length(info, position)? {
            Some(len) => {
                if len > self.config.limits.max_byte_string_length {
                    return Err(Error::overflow(position, "declared string length exceeds configured limit"));
                }
                let chunked = match self.stack.last() {
                    Some(Frame::IndefText) => is_text,
                    Some(Frame::IndefBytes) => !is_text,
                    _ => false,
                };
                let bytes = self.input.read_bytes(len)?;
                if is_text {
                    let s = String::from_utf8(bytes)
                        .map_err(|_| Error::invalid_data(position, "invalid UTF-8 in text string"))?;
                    if chunked {
                        self.receptacle.set_text(s);
                    } else {
                        self.receptacle.set_string(s);
                        self.complete()?;
                    }
                    Ok(if chunked { Kind::Text } else { Kind::String })
                } else {
                    self.receptacle.set_bytes(bytes);
                    if !chunked {
                        self.complete()?;
                    }
                    Ok(Kind::Bytes)
                }
            }
            None => {
                self.check_nesting()?;
                if is_text {
                    self.stack.push(Frame::IndefText);
                    self.receptacle.set_text_start();
                    Ok(Kind::TextStart)
                } else {
                    self.stack.push(Frame::IndefBytes);
                    self.receptacle.set_bytes_start();
                    Ok(Kind::BytesStart)
                }
            }
        }
    }

    fn decode_container_head(&mut self, info: u8, position: Position, is_array: bool) -> Result<Kind> {
        self.check_nesting()?;
        match self.read_length(info, position)? {
            Some(len) => {
                let max = if is_array {
                    self.config.limits.max_array_length
                } else {
                    self.config.limits.max_map_length
                };
                if len > max {
                    return Err(Error::overflow(position, "declared container length exceeds configured limit"));
                }
                if is_array {
                    self.receptacle.set_array_header(len);
                    self.stack.push(Frame::Array { remaining: Some(len) });
                } else {
                    self.receptacle.set_map_header(len);
                    self.stack.push(Frame::Map {
                        remaining: Some(len),
                        awaiting_value: false,
                    });
                }
                if len == 0 {
                    self.stack.pop();
                    self.complete()?;
                }
                Ok(if is_array { Kind::ArrayHeader } else { Kind::MapHeader })
            }
            None => {
                if is_array {
                    self.stack.push(Frame::Array { remaining: None });
                    self.receptacle.set_array_start();
                    Ok(Kind::ArrayStart)
                } else {
                    self.stack.push(Frame::Map {
                        remaining: None,
                        awaiting_value: false,
                    });
                    self.receptacle.set_map_start();
                    Ok(Kind::MapStart)
                }
            }
        }
    }

    fn decode_simple(&mut self, info: u8, position: Position) -> Result<Kind> {
        match info {
            0..=19 => {
                self.receptacle.set_simple_value(info);
                self.complete()?;
                Ok(Kind::SimpleValue)
            }
            20 => {
                self.receptacle.set_bool(false);
                self.complete()?;
                Ok(Kind::Bool)
            }
            21 => {
                self.receptacle.set_bool(true);
                self.complete()?;
                Ok(Kind::Bool)
            }
            22 => {
                self.receptacle.set_null();
                self.complete()?;
                Ok(Kind::Null)
            }
            23 => {
                self.receptacle.set_undefined();
                self.complete()?;
                Ok(Kind::Undefined)
            }
            24 => {
                let v = self.input.read_byte()?;
                if v < 32 {
                    return Err(Error::invalid_data(
                        position,
                        "simple value in range 0..32 must not use the 1-byte form",
                    ));
                }
                self.receptacle.set_simple_value(v);
                self.complete()?;
                Ok(Kind::SimpleValue)
            }
            25 => {
                let bits = self.input.read_double_byte_be()?;
                self.receptacle.set_float16(bits);
                self.complete()?;
                Ok(Kind::Float16)
            }
            26 => {
                let bits = self.input.read_quad_byte_be()?;
                self.receptacle.set_float(f32::from_bits(bits));
                self.complete()?;
                Ok(Kind::Float)
            }
            27 => {
                let bits = self.input.read_octa_byte_be()?;
                self.receptacle.set_double(f64::from_bits(bits));
                self.complete()?;
                Ok(Kind::Double)
            }
            28..=30 => Err(Error::invalid_data(position, "reserved CBOR additional information value")),
            31 => {
                self.receptacle.set_break();
                Ok(Kind::Break)
            }
            _ => unreachable!("additional information is 5 bits"),
        }
    }

    fn decode_one(&mut self) -> Result<Kind> {
        if self.stack.is_empty() && self.root_done {
            return if self.input.is_at_end() {
                self.receptacle.set_end_of_input();
                Ok(Kind::EndOfInput)
            } else {
                Err(Error::invalid_data(self.input.position(), "trailing content after CBOR value"))
            };
        }

        let position = self.input.position();
        let head = self.input.read_byte()?;
        let major = head >> 5;
        let info = head & 0x1f;
        match major {
            0 => {
                let v = self.read_uint_arg(info, position)?;
                self.finish_int(false, v)
            }
            1 => {
                let n = self.read_uint_arg(info, position)?;
                let magnitude = n.checked_add(1).unwrap_or(u64::MAX);
                self.finish_int(true, magnitude)
            }
            2 => self.decode_string(info, position, false),
            3 => self.decode_string(info, position, true),
            4 => self.decode_container_head(info, position, true),
            5 => self.decode_container_head(info, position, false),
            6 => {
                let tag = self.read_uint_arg(info, position)?;
                self.receptacle.set_tag(tag);
                Ok(Kind::Tag)
            }
            7 => self.decode_simple(info, position),
            _ => unreachable!("major type is 3 bits"),
        }
    }

    fn commit(&mut self, expected: &[Kind]) -> Result<Kind> {
        let kind = self.data_item()?;
        if !expected.contains(&kind) {
            return Err(Error::unexpected_item(self.input.position(), describe(expected), kind));
        }
        Ok(kind)
    }

    fn finish(&mut self) {
        self.receptacle.clear();
    }
}

fn describe(kinds: &[Kind]) -> String {
    kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(" or ")
}

fn to_i64(negative: bool, magnitude: u64) -> Option<i64> {
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            None
        } else if magnitude == i64::MAX as u64 + 1 {
            Some(i64::MIN)
        } else {
            Some(-(magnitude as i64))
        }
    } else if magnitude > i64::MAX as u64 {
        None
    } else {
        Some(magnitude as i64)
    }
}

impl<I: Input> Reader for CborReader<I> {
    fn is_json(&self) -> bool {
        false
    }

    fn position(&self) -> Position {
        self.input.position()
    }

    fn data_item(&mut self) -> Result<Kind> {
        if let Some(kind) = self.receptacle.kind() {
            return Ok(kind);
        }
        self.decode_one()
    }

    fn read_null(&mut self) -> Result<()> {
        self.commit(&[Kind::Null])?;
        self.finish();
        Ok(())
    }

    fn read_undefined(&mut self) -> Result<()> {
        self.commit(&[Kind::Undefined])?;
        self.finish();
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.commit(&[Kind::Bool])?;
        let value = self.receptacle.as_bool();
        self.finish();
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64> {
        let position = self.position();
        match self.data_item()? {
            Kind::Int => {
                let v = self.receptacle.as_int();
                self.finish();
                Ok(v)
            }
            Kind::Long => {
                let (negative, magnitude) = self.receptacle.as_long();
                self.finish();
                to_i64(negative, magnitude).ok_or_else(|| Error::overflow(position, "value does not fit in i64"))
            }
            Kind::Tag => {
                let tag = self.peek_tag()?;
                if tag == 2 || tag == 3 {
                    self.read_tag()?;
                    let magnitude_bytes = self.read_bytes()?;
                    if magnitude_bytes.len() > 8 {
                        return Err(Error::overflow(position, "bignum magnitude does not fit in i64"));
                    }
                    let mut buf = [0u8; 8];
                    buf[8 - magnitude_bytes.len()..].copy_from_slice(&magnitude_bytes);
                    let raw = u64::from_be_bytes(buf);
                    let negative = tag == 3;
                    let magnitude = if negative {
                        raw.checked_add(1)
                            .ok_or_else(|| Error::overflow(position, "bignum magnitude does not fit in i64"))?
                    } else {
                        raw
                    };
                    to_i64(negative, magnitude).ok_or_else(|| Error::overflow(position, "value does not fit in i64"))
                } else {
                    Err(Error::invalid_data(position, "not an integer literal"))
                }
            }
            other => Err(Error::unexpected_item(position, "an integer", other)),
        }
    }

    fn read_u64(&mut self) -> Result<u64> {
        let position = self.position();
        match self.data_item()? {
            Kind::Int => {
                let v = self.receptacle.as_int();
                self.finish();
                u64::try_from(v).map_err(|_| Error::overflow(position, "value is negative"))
            }
            Kind::Long => {
                let (negative, magnitude) = self.receptacle.as_long();
                self.finish();
                if negative {
                    Err(Error::overflow(position, "value is negative"))
                } else {
                    Ok(magnitude)
                }
            }
            Kind::Tag => {
                let tag = self.peek_tag()?;
                if tag == 2 {
                    self.read_tag()?;
                    let bytes = self.read_bytes()?;
                    if bytes.len() > 8 {
                        return Err(Error::overflow(position, "bignum magnitude does not fit in u64"));
                    }
                    let mut buf = [0u8; 8];
                    buf[8 - bytes.len()..].copy_from_slice(&bytes);
                    Ok(u64::from_be_bytes(buf))
                } else {
                    Err(Error::invalid_data(position, "not a non-negative integer literal"))
                }
            }
            other => Err(Error::unexpected_item(position, "an integer", other)),
        }
    }

    fn read_float16_bits(&mut self) -> Result<u16> {
        self.commit(&[Kind::Float16])?;
        let v = self.receptacle.as_float16_bits();
        self.finish();
        Ok(v)
    }

    fn read_float(&mut self) -> Result<f32> {
        self.commit(&[Kind::Float])?;
        let v = self.receptacle.as_float();
        self.finish();
        Ok(v)
    }

    fn read_double(&mut self) -> Result<f64> {
        self.commit(&[Kind::Double])?;
        let v = self.receptacle.as_double();
        self.finish();
        Ok(v)
    }

    fn read_number_string(&mut self) -> Result<String> {
        Err(Error::unsupported_element(self.position(), Kind::NumberString))
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.commit(&[Kind::Bytes])?;
        let v = self.receptacle.take_bytes();
        self.finish();
        Ok(v)
    }

    fn read_string(&mut self) -> Result<String> {
        self.commit(&[Kind::String])?;
        let v = self.receptacle.take_string();
        self.finish();
        Ok(v)
    }

    fn read_array_header(&mut self) -> Result<u64> {
        self.commit(&[Kind::ArrayHeader])?;
        let len = self.receptacle.as_header_len();
        self.finish();
        Ok(len)
    }

    fn read_array_start(&mut self) -> Result<()> {
        self.commit(&[Kind::ArrayStart])?;
        self.finish();
        Ok(())
    }

    fn read_map_header(&mut self) -> Result<u64> {
        self.commit(&[Kind::MapHeader])?;
        let len = self.receptacle.as_header_len();
        self.finish();
        Ok(len)
    }

    fn read_map_start(&mut self) -> Result<()> {
        self.commit(&[Kind::MapStart])?;
        self.finish();
        Ok(())
    }

    fn read_break(&mut self) -> Result<()> {
        self.commit(&[Kind::Break])?;
        match self.stack.pop() {
            Some(Frame::Array { remaining: None })
            | Some(Frame::Map { remaining: None, .. })
            | Some(Frame::IndefBytes)
            | Some(Frame::IndefText) => {}
            Some(_) => {
                return Err(Error::invalid_data(
                    self.position(),
                    "break does not close a sized container, which closes itself",
                ))
            }
            None => return Err(Error::invalid_data(self.position(), "break with no open container")),
        }
        self.finish();
        self.complete()
    }

    fn read_tag(&mut self) -> Result<u64> {
        self.commit(&[Kind::Tag])?;
        let tag = self.receptacle.as_tag();
        self.finish();
        Ok(tag)
    }

    fn read_simple_value(&mut self) -> Result<u8> {
        self.commit(&[Kind::SimpleValue])?;
        let v = self.receptacle.as_simple_value();
        self.finish();
        Ok(v)
    }

    fn peek_tag(&mut self) -> Result<u64> {
        match self.data_item()? {
            Kind::Tag => Ok(self.receptacle.as_tag()),
            other => Err(Error::unexpected_item(self.position(), "a tag", other)),
        }
    }

    fn read_bytes_start_marker(&mut self) -> Result<()> {
        self.commit(&[Kind::BytesStart])?;
        self.finish();
        Ok(())
    }

    fn read_text_start_marker(&mut self) -> Result<()> {
        self.commit(&[Kind::TextStart])?;
        self.finish();
        Ok(())
    }

    fn read_text_chunk(&mut self) -> Result<String> {
        self.commit(&[Kind::Text])?;
        let v = self.receptacle.take_string();
        self.finish();
        Ok(v)
    }

    fn read_bytes_chunk(&mut self) -> Result<Vec<u8>> {
        self.commit(&[Kind::Bytes])?;
        let v = self.receptacle.take_bytes();
        self.finish();
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataitem::io::SliceInput;

    fn decode_hex(hex: &str) -> Vec<u8> {
        (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
            .collect()
    }

    fn reader(bytes: &[u8]) -> CborReader<SliceInput<'_>> {
        CborReader::new(SliceInput::new(bytes))
    }

    // RFC 8949 Appendix A.
    #[test]
    fn decodes_appendix_a_integers() {
        assert_eq!(reader(&decode_hex("00")).read_i64().unwrap(), 0);
        assert_eq!(reader(&decode_hex("17")).read_i64().unwrap(), 23);
        assert_eq!(reader(&decode_hex("1818")).read_i64().unwrap(), 24);
        assert_eq!(
            reader(&decode_hex("1b000000e8d4a51000")).read_i64().unwrap(),
            1_000_000_000_000
        );
        assert_eq!(reader(&decode_hex("20")).read_i64().unwrap(), -1);
    }

    #[test]
    fn decodes_appendix_a_double() {
        assert_eq!(reader(&decode_hex("fb3ff199999999999a")).read_double().unwrap(), 1.1);
    }

    #[test]
    fn decodes_appendix_a_nested_array() {
        let bytes = decode_hex("8301820203820405");
        let mut r = reader(&bytes);
        assert_eq!(r.read_array_header().unwrap(), 3);
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert_eq!(r.read_i64().unwrap(), 2);
        assert_eq!(r.read_i64().unwrap(), 3);
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert_eq!(r.read_i64().unwrap(), 4);
        assert_eq!(r.read_i64().unwrap(), 5);
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn decodes_appendix_a_sorted_map() {
        let bytes = decode_hex("a56161614161626142616361436164614461656145");
        let mut r = reader(&bytes);
        assert_eq!(r.read_map_header().unwrap(), 5);
        for expected in ["a", "b", "c", "d", "e"] {
            assert_eq!(r.read_string().unwrap(), expected);
            assert_eq!(r.read_string().unwrap(), expected.to_uppercase());
        }
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn decodes_appendix_a_indefinite_array() {
        let bytes = decode_hex("9f018202039f0405ffff");
        let mut r = reader(&bytes);
        assert_eq!(r.data_item().unwrap(), Kind::ArrayStart);
        r.read_array_start().unwrap();
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert_eq!(r.read_i64().unwrap(), 2);
        assert_eq!(r.read_i64().unwrap(), 3);
        assert_eq!(r.data_item().unwrap(), Kind::ArrayStart);
        r.read_array_start().unwrap();
        assert_eq!(r.read_i64().unwrap(), 4);
        assert_eq!(r.read_i64().unwrap(), 5);
        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();
        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn decodes_appendix_a_tagged_epoch() {
        let bytes = decode_hex("c11a514b67b0");
        let mut r = reader(&bytes);
        assert_eq!(r.data_item().unwrap(), Kind::Tag);
        assert_eq!(r.peek_tag().unwrap(), 1);
        assert_eq!(r.read_tag().unwrap(), 1);
        assert_eq!(r.read_i64().unwrap(), 1_363_896_240);
    }

    #[test]
    fn decodes_indefinite_text_string_chunks() {
        // `(_ "ab", "cde")` (RFC 8949 Appendix A).
        let bytes = decode_hex("7f62616263636465ff");
        let mut r = reader(&bytes);
        assert_eq!(r.data_item().unwrap(), Kind::TextStart);
        r.read_text_start_marker().unwrap();
        assert_eq!(r.read_text_chunk().unwrap(), "ab");
        assert_eq!(r.read_text_chunk().unwrap(), "cde");
        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();
    }

    #[test]
    fn rejects_reserved_additional_information() {
        assert!(reader(&decode_hex("1c")).read_i64().is_err());
    }

    #[test]
    fn empty_containers_round_trip() {
        assert_eq!(reader(&decode_hex("80")).read_array_header().unwrap(), 0);
        assert_eq!(reader(&decode_hex("a0")).read_map_header().unwrap(), 0);
    }
}
