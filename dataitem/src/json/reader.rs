// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! A pull parser over RFC 8259 JSON, implementing [`crate::reader::Reader`].
//!
//! Unlike CBOR, JSON containers carry no length prefix on the wire, so
//! every `[`/`{` is surfaced as `ArrayStart`/`MapStart` (never
//! `ArrayHeader`/`MapHeader`) and closed by a synthesized `Break` once
//! the matching `]`/`}` is seen — the reader tracks open containers on
//! an explicit [`Frame`] stack to know whether a comma, a colon, or a
//! closing bracket is grammatically valid at each point. Each look-ahead
//! token is fully scanned (and the underlying bytes consumed) the moment
//! [`Reader::data_item`] buffers it into the [`Receptacle`]; a `read_*`
//! call only validates and extracts.

use crate::{
    config::JsonDecodingConfig,
    error::{Error, Result},
    io::Input,
    item::Kind,
    json::number::{self, Classified},
    json::scanner::{self, StringScanResult},
    position::Position,
    reader::Reader,
    receptacle::Receptacle,
};

#[derive(Clone, Debug)]
enum Frame {
    Array { count: u32 },
    Object { count: u32, awaiting_value: bool },
}

pub struct JsonReader<I> {
    input: I,
    config: JsonDecodingConfig,
    receptacle: Receptacle,
    stack: Vec<Frame>,
    root_done: bool,
}

impl<I: Input> JsonReader<I> {
    pub fn new(input: I) -> Self {
        Self::with_config(input, JsonDecodingConfig::default())
    }

    pub fn with_config(input: I, config: JsonDecodingConfig) -> Self {
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

    fn remaining_if_direct(&self) -> Option<&[u8]> {
        if self.config.allow_direct_parsing {
            self.input.remaining_slice()
        } else {
            None
        }
    }

    fn skip_bytes(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.input.read_byte()?;
        }
        Ok(())
    }

    fn peek_byte(&mut self) -> Result<u8> {
        let b = self.input.read_byte()?;
        self.input.unread(1);
        Ok(b)
    }

    fn skip_ws(&mut self) -> Result<()> {
        loop {
            if let Some(slice) = self.remaining_if_direct() {
                let n = scanner::skip_whitespace(slice);
                if n > 0 {
                    self.skip_bytes(n)?;
                }
                return Ok(());
            }
            match self.input.read_byte() {
                Ok(b) if matches!(b, b' ' | b'\t' | b'\n' | b'\r') => continue,
                Ok(_) => {
                    self.input.unread(1);
                    return Ok(());
                }
                Err(Error::InsufficientInput(_)) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let position = self.input.position();
        let found = self.input.read_byte()?;
        if found != expected {
            return Err(Error::invalid_data(
                position,
                format!("expected '{}', found '{}'", expected as char, found as char),
            ));
        }
        Ok(())
    }

    fn expect_literal(&mut self, literal: &'static str) -> Result<()> {
        for expected in literal.bytes() {
            self.expect_byte(expected)?;
        }
        Ok(())
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        if self.stack.len() as u32 >= self.config.limits.max_nesting_levels {
            return Err(Error::overflow(self.input.position(), "maximum nesting depth exceeded"));
        }
        self.stack.push(frame);
        Ok(())
    }

    fn scan_number_token(&mut self) -> Result<Kind> {
        let position = self.input.position();
        let text = if let Some(len) = self.remaining_if_direct().map(scanner::scan_number) {
            let text = {
                let slice = self.input.remaining_slice().expect("checked Some above");
                std::str::from_utf8(&slice[..len])
                    .expect("JSON number grammar is ASCII")
                    .to_string()
            };
            self.skip_bytes(len)?;
            text
        } else {
            self.scan_number_byte_by_byte()?
        };

        match number::classify(&text, position, &self.config)? {
            Classified::Int(v) => {
                self.receptacle.set_int(v);
                Ok(Kind::Int)
            }
            Classified::Long { negative, magnitude } => {
                self.receptacle.set_long(negative, magnitude);
                Ok(Kind::Long)
            }
            Classified::Double(v) => {
                self.receptacle.set_double(v);
                Ok(Kind::Double)
            }
            Classified::NumberString(s) => {
                self.receptacle.set_number_string(s);
                Ok(Kind::NumberString)
            }
        }
    }

    fn try_read_byte_if(&mut self, pred: impl Fn(u8) -> bool) -> Result<Option<u8>> {
        match self.input.read_byte() {
            Ok(b) if pred(b) => Ok(Some(b)),
            Ok(_) => {
                self.input.unread(1);
                Ok(None)
            }
            Err(Error::InsufficientInput(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn scan_number_byte_by_byte(&mut self) -> Result<String> {
        let mut out = String::new();
        if self.try_read_byte_if(|b| b == b'-')?.is_some() {
            out.push('-');
        }
        match self.try_read_byte_if(|b| b.is_ascii_digit())? {
            Some(b'0') => out.push('0'),
            Some(d) => {
                out.push(d as char);
                while let Some(d) = self.try_read_byte_if(|b| b.is_ascii_digit())? {
                    out.push(d as char);
                }
            }
            None => return Err(Error::invalid_data(self.input.position(), "expected a digit")),
        }
        if self.try_read_byte_if(|b| b == b'.')?.is_some() {
            let mut frac = String::new();
            while let Some(d) = self.try_read_byte_if(|b| b.is_ascii_digit())? {
                frac.push(d as char);
            }
            if frac.is_empty() {
                self.input.unread(1);
            } else {
                out.push('.');
                out.push_str(&frac);
            }
        }
        if let Some(e) = self.try_read_byte_if(|b| b == b'e' || b == b'E')? {
            let mut consumed = 1usize;
            let mut exp = String::new();
            exp.push(e as char);
            if let Some(sign) = self.try_read_byte_if(|b| b == b'+' || b == b'-')? {
                exp.push(sign as char);
                consumed += 1;
            }
            let mut digits = String::new();
            while let Some(d) = self.try_read_byte_if(|b| b.is_ascii_digit())? {
                digits.push(d as char);
            }
            if digits.is_empty() {
                self.input.unread(consumed as u64);
            } else {
                out.push_str(&exp);
                out.push_str(&digits);
            }
        }
        Ok(out)
    }

    fn scan_string(&mut self) -> Result<String> {
        let position = self.input.position();
        if let Some(slice) = self.remaining_if_direct() {
            match scanner::scan_string_body(slice) {
                StringScanResult::Closed { len, has_escapes } => {
                    let body = &self.input.remaining_slice().expect("checked Some above")[..len];
                    let s = if has_escapes {
                        decode_escaped_slice(body, position)?
                    } else {
                        std::str::from_utf8(body)
                            .map_err(|_| Error::invalid_data(position, "invalid UTF-8 in string"))?
                            .to_string()
                    };
                    self.skip_bytes(len + 1)?;
                    Ok(s)
                }
                StringScanResult::InvalidControlChar { at } => Err(Error::invalid_data(
                    Position::new(position.index() + at as u64),
                    "raw control character in string",
                )),
                StringScanResult::Unterminated => Err(Error::UnexpectedEndOfInput(self.input.position())),
            }
        } else {
            self.scan_string_byte_by_byte(position)
        }
    }

    fn scan_string_byte_by_byte(&mut self, position: Position) -> Result<String> {
        let mut out = String::new();
        loop {
            let b = self.input.read_byte().map_err(|_| Error::UnexpectedEndOfInput(self.input.position()))?;
            match b {
                b'"' => return Ok(out),
                b'\\' => {
                    let esc = self.input.read_byte()?;
                    match esc {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'/' => out.push('/'),
                        b'b' => out.push('\u{8}'),
                        b'f' => out.push('\u{c}'),
                        b'n' => out.push('\n'),
                        b'r' => out.push('\r'),
                        b't' => out.push('\t'),
                        b'u' => {
                            let cp = self.read_hex4()?;
                            let c = self.resolve_code_point(cp, position)?;
                            out.push(c);
                        }
                        other => {
                            return Err(Error::invalid_data(
                                self.input.position(),
                                format!("invalid escape '\\{}'", other as char),
                            ))
                        }
                    }
                }
                b if b < 0x20 => return Err(Error::invalid_data(self.input.position(), "raw control character in string")),
                b => {
                    // Re-assemble a (possibly multi-byte) UTF-8 sequence one
                    // byte at a time; JSON text is required to be UTF-8.
                    let len = utf8_len(b).ok_or_else(|| Error::invalid_data(self.input.position(), "invalid UTF-8 in string"))?;
                    let mut buf = vec![b];
                    for _ in 1..len {
                        buf.push(self.input.read_byte()?);
                    }
                    out.push_str(
                        std::str::from_utf8(&buf).map_err(|_| Error::invalid_data(self.input.position(), "invalid UTF-8 in string"))?,
                    );
                }
            }
        }
    }

    fn read_hex4(&mut self) -> Result<u16> {
        let mut value = 0u16;
        for _ in 0..4 {
            let b = self.input.read_byte()?;
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| Error::invalid_data(self.input.position(), "invalid \\u escape"))?;
            value = value * 16 + digit as u16;
        }
        Ok(value)
    }

    fn resolve_code_point(&mut self, cp: u16, position: Position) -> Result<char> {
        if (0xD800..=0xDBFF).contains(&cp) {
            self.expect_byte(b'\\')?;
            self.expect_byte(b'u')?;
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(Error::invalid_data(position, "unpaired UTF-16 surrogate"));
            }
            let c = 0x10000 + (cp - 0xD800) as u32 * 0x400 + (low - 0xDC00) as u32;
            char::from_u32(c).ok_or_else(|| Error::invalid_data(position, "invalid surrogate pair"))
        } else if (0xDC00..=0xDFFF).contains(&cp) {
            Err(Error::invalid_data(position, "unpaired UTF-16 surrogate"))
        } else {
            char::from_u32(cp as u32).ok_or_else(|| Error::invalid_data(position, "invalid code point"))
        }
    }

    fn scan_value(&mut self) -> Result<Kind> {
        let position = self.input.position();
        let byte = self.peek_byte()?;
        match byte {
            b'"' => {
                self.skip_bytes(1)?;
                let s = self.scan_string()?;
                self.receptacle.set_string(s);
                Ok(Kind::String)
            }
            b'{' => {
                self.skip_bytes(1)?;
                self.push_frame(Frame::Object {
                    count: 0,
                    awaiting_value: false,
                })?;
                self.receptacle.set_map_start();
                Ok(Kind::MapStart)
            }
            b'[' => {
                self.skip_bytes(1)?;
                self.push_frame(Frame::Array { count: 0 })?;
                self.receptacle.set_array_start();
                Ok(Kind::ArrayStart)
            }
            b't' => {
                self.expect_literal("true")?;
                self.receptacle.set_bool(true);
                Ok(Kind::Bool)
            }
            b'f' => {
                self.expect_literal("false")?;
                self.receptacle.set_bool(false);
                Ok(Kind::Bool)
            }
            b'n' => {
                self.expect_literal("null")?;
                self.receptacle.set_null();
                Ok(Kind::Null)
            }
            b'-' | b'0'..=b'9' => self.scan_number_token(),
            b'N' | b'I' => Err(Error::invalid_data(position, "NaN/Infinity literals are not valid JSON")),
            _ => Err(Error::invalid_data(position, "expected a JSON value")),
        }
    }

    /// Peek the next token, parsing and fully consuming it into the
    /// receptacle if nothing is buffered yet.
    fn peek_raw(&mut self) -> Result<Kind> {
        if let Some(kind) = self.receptacle.kind() {
            return Ok(kind);
        }

        self.skip_ws()?;

        if self.stack.is_empty() {
            if !self.root_done {
                return self.scan_value();
            }
            return if self.input.is_at_end() {
                self.receptacle.set_end_of_input();
                Ok(Kind::EndOfInput)
            } else {
                Err(Error::invalid_data(self.input.position(), "trailing content after JSON value"))
            };
        }

        let top = self.stack.len() - 1;
        let is_object = matches!(self.stack[top], Frame::Object { .. });

        if let Frame::Object {
            awaiting_value: awaiting @ true,
            ..
        } = &mut self.stack[top]
        {
            *awaiting = false;
            self.skip_ws()?;
            self.expect_byte(b':')?;
            self.skip_ws()?;
            return self.scan_value();
        }

        let count = match self.stack[top] {
            Frame::Array { count } => count,
            Frame::Object { count, .. } => count,
        };
        let closing = if is_object { b'}' } else { b']' };

        if count > 0 {
            match self.peek_byte()? {
                b if b == closing => {
                    self.skip_bytes(1)?;
                    self.stack.pop();
                    self.receptacle.set_break();
                    return Ok(Kind::Break);
                }
                b',' => {
                    self.skip_bytes(1)?;
                    self.skip_ws()?;
                }
                _ => return Err(Error::invalid_data(self.input.position(), "expected ',' or a closing bracket")),
            }
        } else if self.peek_byte()? == closing {
            self.skip_bytes(1)?;
            self.stack.pop();
            self.receptacle.set_break();
            return Ok(Kind::Break);
        }

        match &mut self.stack[top] {
            Frame::Array { count } => *count += 1,
            Frame::Object { count, awaiting_value } => {
                *count += 1;
                *awaiting_value = true;
            }
        }
        if is_object {
            self.skip_ws()?;
            if self.peek_byte()? != b'"' {
                return Err(Error::invalid_data(self.input.position(), "expected an object key (a JSON string)"));
            }
        }
        self.scan_value()
    }

    fn commit(&mut self, expected: &[Kind]) -> Result<Kind> {
        let kind = self.peek_raw()?;
        if !expected.contains(&kind) {
            let position = self.input.position();
            return Err(Error::unexpected_item(position, describe(expected), kind));
        }
        if self.stack.is_empty() {
            self.root_done = true;
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

fn utf8_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7f => Some(1),
        0xc0..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf7 => Some(4),
        _ => None,
    }
}

fn decode_escaped_slice(body: &[u8], position: Position) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\\' {
            i += 1;
            let esc = *body
                .get(i)
                .ok_or_else(|| Error::invalid_data(position, "truncated escape sequence"))?;
            match esc {
                b'"' => {
                    out.push('"');
                    i += 1;
                }
                b'\\' => {
                    out.push('\\');
                    i += 1;
                }
                b'/' => {
                    out.push('/');
                    i += 1;
                }
                b'b' => {
                    out.push('\u{8}');
                    i += 1;
                }
                b'f' => {
                    out.push('\u{c}');
                    i += 1;
                }
                b'n' => {
                    out.push('\n');
                    i += 1;
                }
                b'r' => {
                    out.push('\r');
                    i += 1;
                }
                b't' => {
                    out.push('\t');
                    i += 1;
                }
                b'u' => {
                    i += 1;
                    let cp = parse_hex4(body, i, position)?;
                    i += 4;
                    if (0xD800..=0xDBFF).contains(&cp) {
                        if body.get(i) != Some(&b'\\') || body.get(i + 1) != Some(&b'u') {
                            return Err(Error::invalid_data(position, "unpaired UTF-16 surrogate"));
                        }
                        let low = parse_hex4(body, i + 2, position)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(Error::invalid_data(position, "unpaired UTF-16 surrogate"));
                        }
                        let c = 0x10000 + (cp - 0xD800) as u32 * 0x400 + (low - 0xDC00) as u32;
                        out.push(char::from_u32(c).ok_or_else(|| Error::invalid_data(position, "invalid surrogate pair"))?);
                        i += 6;
                    } else if (0xDC00..=0xDFFF).contains(&cp) {
                        return Err(Error::invalid_data(position, "unpaired UTF-16 surrogate"));
                    } else {
                        out.push(char::from_u32(cp as u32).ok_or_else(|| Error::invalid_data(position, "invalid code point"))?);
                    }
                }
                other => {
                    return Err(Error::invalid_data(
                        position,
                        format!("invalid escape '\\{}'", other as char),
                    ))
                }
            }
        } else {
            let start = i;
            while i < body.len() && body[i] != b'\\' {
                i += 1;
            }
            out.push_str(
                std::str::from_utf8(&body[start..i]).map_err(|_| Error::invalid_data(position, "invalid UTF-8 in string"))?,
            );
        }
    }
    Ok(out)
}

fn parse_hex4(body: &[u8], at: usize, position: Position) -> Result<u16> {
    let bytes = body
        .get(at..at + 4)
        .ok_or_else(|| Error::invalid_data(position, "truncated \\u escape"))?;
    let text = std::str::from_utf8(bytes).map_err(|_| Error::invalid_data(position, "invalid \\u escape"))?;
    u16::from_str_radix(text, 16).map_err(|_| Error::invalid_data(position, "invalid \\u escape"))
}

impl<I: Input> Reader for JsonReader<I> {
    fn is_json(&self) -> bool {
        true
    }

    fn position(&self) -> Position {
        self.input.position()
    }

    fn data_item(&mut self) -> Result<Kind> {
        self.peek_raw()
    }

    fn read_null(&mut self) -> Result<()> {
        self.commit(&[Kind::Null])?;
        self.finish();
        Ok(())
    }

    fn read_undefined(&mut self) -> Result<()> {
        Err(Error::unsupported_element(self.position(), Kind::Undefined))
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.commit(&[Kind::Bool])?;
        let value = self.receptacle.as_bool();
        self.finish();
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64> {
        let position = self.position();
        let kind = self.commit(&[Kind::Int, Kind::Long, Kind::NumberString])?;
        let value = match kind {
            Kind::Int => self.receptacle.as_int(),
            Kind::Long => {
                let (negative, magnitude) = self.receptacle.as_long();
                to_i64(negative, magnitude).ok_or_else(|| Error::overflow(position, "value does not fit in i64"))?
            }
            Kind::NumberString => {
                let text = self.receptacle.as_str().to_string();
                text.parse::<i64>()
                    .map_err(|_| Error::overflow(position, "value does not fit in i64"))?
            }
            _ => unreachable!(),
        };
        self.finish();
        Ok(value)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let position = self.position();
        let kind = self.commit(&[Kind::Int, Kind::Long, Kind::NumberString])?;
        let value = match kind {
            Kind::Int => {
                let v = self.receptacle.as_int();
                u64::try_from(v).map_err(|_| Error::overflow(position, "value is negative"))?
            }
            Kind::Long => {
                let (negative, magnitude) = self.receptacle.as_long();
                if negative {
                    return Err(Error::overflow(position, "value is negative"));
                }
                magnitude
            }
            Kind::NumberString => {
                let text = self.receptacle.as_str().to_string();
                text.parse::<u64>()
                    .map_err(|_| Error::overflow(position, "value does not fit in u64"))?
            }
            _ => unreachable!(),
        };
        self.finish();
        Ok(value)
    }

    fn read_float16_bits(&mut self) -> Result<u16> {
        Err(Error::unsupported_element(self.position(), Kind::Float16))
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(self.read_double()? as f32)
    }

    fn read_double(&mut self) -> Result<f64> {
        let position = self.position();
        let kind = self.commit(&[Kind::Int, Kind::Long, Kind::Double, Kind::NumberString])?;
        let value = match kind {
            Kind::Int => self.receptacle.as_int() as f64,
            Kind::Long => {
                let (negative, magnitude) = self.receptacle.as_long();
                if negative {
                    -(magnitude as f64)
                } else {
                    magnitude as f64
                }
            }
            Kind::Double => self.receptacle.as_double(),
            Kind::NumberString => self
                .receptacle
                .as_str()
                .parse::<f64>()
                .map_err(|_| Error::invalid_data(position, "malformed number literal"))?,
            _ => unreachable!(),
        };
        self.finish();
        Ok(value)
    }

    fn read_number_string(&mut self) -> Result<String> {
        self.commit(&[Kind::NumberString])?;
        let s = self.receptacle.take_string();
        self.finish();
        Ok(s)
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.commit(&[Kind::String])?;
        let text = self.receptacle.take_string();
        self.finish();
        crate::basen::decode(crate::basen::Alphabet::Base64, &text)
    }

    fn read_string(&mut self) -> Result<String> {
        self.commit(&[Kind::String])?;
        let s = self.receptacle.take_string();
        self.finish();
        Ok(s)
    }

    fn read_array_header(&mut self) -> Result<u64> {
        Err(Error::invalid_data(self.position(), "JSON arrays have no length header"))
    }

    fn read_array_start(&mut self) -> Result<()> {
        self.commit(&[Kind::ArrayStart])?;
        self.finish();
        Ok(())
    }

    fn read_map_header(&mut self) -> Result<u64> {
        Err(Error::invalid_data(self.position(), "JSON objects have no length header"))
    }

    fn read_map_start(&mut self) -> Result<()> {
        self.commit(&[Kind::MapStart])?;
        self.finish();
        Ok(())
    }

    fn read_break(&mut self) -> Result<()> {
        self.commit(&[Kind::Break])?;
        self.finish();
        Ok(())
    }

    fn read_tag(&mut self) -> Result<u64> {
        Err(Error::unsupported_element(self.position(), Kind::Tag))
    }

    fn read_simple_value(&mut self) -> Result<u8> {
        Err(Error::unsupported_element(self.position(), Kind::SimpleValue))
    }

    fn peek_tag(&mut self) -> Result<u64> {
        Err(Error::unsupported_element(self.position(), Kind::Tag))
    }

    fn read_bytes_start_marker(&mut self) -> Result<()> {
        Err(Error::unsupported_element(self.position(), Kind::BytesStart))
    }

    fn read_text_start_marker(&mut self) -> Result<()> {
        Err(Error::unsupported_element(self.position(), Kind::TextStart))
    }

    fn read_text_chunk(&mut self) -> Result<String> {
        Err(Error::unsupported_element(self.position(), Kind::Text))
    }

    fn read_bytes_chunk(&mut self) -> Result<Vec<u8>> {
        Err(Error::unsupported_element(self.position(), Kind::Text))
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceInput;

    fn reader(text: &str) -> JsonReader<SliceInput<'_>> {
        JsonReader::new(SliceInput::new(text.as_bytes()))
    }

    #[test]
    fn reads_scalars() {
        let mut r = reader("null");
        assert_eq!(r.data_item().unwrap(), Kind::Null);
        r.read_null().unwrap();
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn reads_nested_array_and_object() {
        let mut r = reader(r#"{"a": [1, 2, true], "b": null}"#);
        assert_eq!(r.data_item().unwrap(), Kind::MapStart);
        r.read_map_start().unwrap();

        assert_eq!(r.data_item().unwrap(), Kind::String);
        assert_eq!(r.read_string().unwrap(), "a");

        assert_eq!(r.data_item().unwrap(), Kind::ArrayStart);
        r.read_array_start().unwrap();
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(r.read_i64().unwrap(), 2);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();

        assert_eq!(r.data_item().unwrap(), Kind::String);
        assert_eq!(r.read_string().unwrap(), "b");
        r.read_null().unwrap();

        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();

        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn reads_escaped_string() {
        let mut r = reader(r#""a\nbA\"c""#);
        assert_eq!(r.read_string().unwrap(), "a\nbA\"c");
    }

    #[test]
    fn reads_surrogate_pair() {
        let mut r = reader(r#""😀""#);
        assert_eq!(r.read_string().unwrap(), "\u{1f600}");
    }

    #[test]
    fn rejects_trailing_content() {
        let mut r = reader("1 2");
        r.read_i64().unwrap();
        assert!(r.data_item().is_err());
    }

    #[test]
    fn rejects_trailing_comma() {
        let mut r = reader("[1,]");
        r.read_array_start().unwrap();
        r.read_i64().unwrap();
        assert!(r.data_item().is_err());
    }

    #[test]
    fn empty_containers_round_trip() {
        let mut r = reader("[]");
        r.read_array_start().unwrap();
        assert_eq!(r.data_item().unwrap(), Kind::Break);
        r.read_break().unwrap();
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }
}
