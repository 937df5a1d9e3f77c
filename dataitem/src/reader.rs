// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The pull-style half of the shared data-item protocol (spec.md §4.3).
//! A `Reader` keeps one look-ahead item buffered in its
//! [`crate::receptacle::Receptacle`]; `data_item()` reports that item's
//! [`Kind`] without consuming it, every `read_*` commits it.

use crate::{error::Error, error::Result, item::Kind, position::Position};

pub trait Reader {
    fn is_json(&self) -> bool;

    fn position(&self) -> Position;

    /// Ensure an item is buffered and report its kind, without consuming
    /// it. Calling this repeatedly without an intervening `read_*` or
    /// `skip_element` returns the same kind.
    fn data_item(&mut self) -> Result<Kind>;

    fn read_null(&mut self) -> Result<()>;

    fn read_undefined(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;

    /// Widening integer read: for CBOR sources this draws from `Int`,
    /// `Long`, `OverLong` (if it fits `i64`), or a `Tag`+`Bytes` big-num
    /// sequence; for JSON sources from `Int`, `Long`, or `NumberString`.
    /// Raises `InvalidInputData` on a non-numeric item, `Overflow` if the
    /// value does not fit `i64`.
    fn read_i64(&mut self) -> Result<i64>;

    /// As `read_i64`, but for values known to be non-negative; also
    /// widens through CBOR positive-bignum tags and JSON `NumberString`s
    /// that fit in `u64`.
    fn read_u64(&mut self) -> Result<u64>;

    fn read_float16_bits(&mut self) -> Result<u16>;

    fn read_float(&mut self) -> Result<f32>;

    fn read_double(&mut self) -> Result<f64>;

    /// The raw text of a `NumberString` item, without attempting any
    /// numeric parse.
    fn read_number_string(&mut self) -> Result<String>;

    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    fn read_string(&mut self) -> Result<String>;

    fn read_array_header(&mut self) -> Result<u64>;

    fn read_array_start(&mut self) -> Result<()>;

    fn read_map_header(&mut self) -> Result<u64>;

    fn read_map_start(&mut self) -> Result<()>;

    fn read_break(&mut self) -> Result<()>;

    fn read_tag(&mut self) -> Result<u64>;

    fn read_simple_value(&mut self) -> Result<u8>;

    /// Discard one complete value — if the look-ahead item opens a
    /// container, its entire contents (recursively) are consumed too.
    fn skip_element(&mut self) -> Result<()> {
        let kind = self.data_item()?;
        match kind {
            Kind::Null => self.read_null(),
            Kind::Undefined => self.read_undefined(),
            Kind::Bool => self.read_bool().map(|_| ()),
            Kind::Int | Kind::Long => self.read_i64().map(|_| ()),
            Kind::Float16 => self.read_float16_bits().map(|_| ()),
            Kind::Float => self.read_float().map(|_| ()),
            Kind::Double => self.read_double().map(|_| ()),
            Kind::NumberString => self.read_number_string().map(|_| ()),
            Kind::Bytes => self.read_bytes().map(|_| ()),
            Kind::String => self.read_string().map(|_| ()),
            Kind::SimpleValue => self.read_simple_value().map(|_| ()),
            Kind::Tag => {
                self.read_tag()?;
                self.skip_element()
            }
            Kind::ArrayHeader => {
                let len = self.read_array_header()?;
                for _ in 0..len {
                    self.skip_element()?;
                }
                Ok(())
            }
            Kind::MapHeader => {
                let len = self.read_map_header()?;
                for _ in 0..len {
                    self.skip_element()?;
                    self.skip_element()?;
                }
                Ok(())
            }
            Kind::ArrayStart => {
                self.read_array_start()?;
                self.skip_until_break()
            }
            Kind::MapStart => {
                self.read_map_start()?;
                self.skip_until_break()
            }
            Kind::BytesStart | Kind::TextStart => {
                if kind == Kind::BytesStart {
                    self.read_bytes_start_marker()?;
                } else {
                    self.read_text_start_marker()?;
                }
                self.skip_until_break()
            }
            Kind::Text => self.read_text_chunk().map(|_| ()),
            Kind::Break => Err(Error::unexpected_item(self.position(), "a value", kind)),
            Kind::EndOfInput => Err(Error::UnexpectedEndOfInput(self.position())),
        }
    }

    fn skip_until_break(&mut self) -> Result<()> {
        loop {
            if self.data_item()? == Kind::Break {
                return self.read_break();
            }
            self.skip_element()?;
        }
    }

    /// Fold an indefinite-length container: calls `step` once per
    /// element until `Break` is encountered, then consumes the `Break`.
    /// Avoids materializing an intermediate `Vec` for containers whose
    /// length was not known up front.
    fn read_until_break<T, F>(&mut self, seed: T, mut step: F) -> Result<T>
    where
        F: FnMut(&mut Self, T) -> Result<T>,
        Self: Sized,
    {
        let mut acc = seed;
        loop {
            if self.data_item()? == Kind::Break {
                self.read_break()?;
                return Ok(acc);
            }
            acc = step(self, acc)?;
        }
    }

    /// If the look-ahead item is `Tag(tag)`, consume it and return
    /// `true`; otherwise leave the reader untouched and return `false`.
    fn try_read_tag(&mut self, tag: u64) -> Result<bool>
    where
        Self: Sized,
    {
        if self.data_item()? == Kind::Tag && self.peek_tag()? == tag {
            self.read_tag()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Peek the numeric value of a buffered `Tag` item without consuming
    /// it. Only meaningful when `data_item()` reports `Kind::Tag`.
    fn peek_tag(&mut self) -> Result<u64>;

    /// Consume a `Null` or a value, mapping presence to `Some`. Built-in
    /// codec for `Option<T>` is layered on top of this.
    fn try_read_null(&mut self) -> Result<bool>
    where
        Self: Sized,
    {
        if self.data_item()? == Kind::Null {
            self.read_null()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn has_break(&mut self) -> Result<bool>
    where
        Self: Sized,
    {
        Ok(self.data_item()? == Kind::Break)
    }

    /// Consume the `BytesStart` marker that opens an indefinite byte
    /// string, without reading any chunk.
    fn read_bytes_start_marker(&mut self) -> Result<()>;

    /// Consume the `TextStart` marker that opens an indefinite text
    /// string, without reading any chunk.
    fn read_text_start_marker(&mut self) -> Result<()>;

    /// Read one chunk of an indefinite-length text string (a `Text`
    /// item). Only valid between a `TextStart` and its matching `Break`.
    fn read_text_chunk(&mut self) -> Result<String>;

    /// Read one chunk of an indefinite-length byte string.
    fn read_bytes_chunk(&mut self) -> Result<Vec<u8>>;
}
