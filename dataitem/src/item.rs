// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The data item model: the language-neutral "tape" of typed items that
//! both the CBOR and the JSON back-end produce and consume.

use std::fmt;

/// One atomic unit of either wire format.
///
/// `BytesStart`/`TextStart`/`ArrayStart`/`MapStart` open an
/// indefinite-length container; each must be closed by exactly one
/// matching [`DataItem::Break`] at the same nesting level. A [`DataItem::Tag`]
/// is an adjective: it attaches to the item that immediately follows it,
/// and tags may chain.
#[derive(Clone, Debug, PartialEq)]
pub enum DataItem {
    Null,
    /// CBOR-only: the "undefined" simple value.
    Undefined,
    Bool(bool),
    Int(i64),
    /// An integer that does not fit in `i64`; carries the raw magnitude.
    /// `negative` distinguishes the CBOR major-type-1 (negative) range.
    Long { negative: bool, magnitude: u64 },
    Float16(u16),
    Float(f32),
    Double(f64),
    /// JSON-only: the literal text of a number too large or too precise
    /// to represent losslessly in any primitive numeric type.
    NumberString(String),
    Bytes(Vec<u8>),
    BytesStart,
    String(String),
    /// A chunk of text belonging to an indefinite-length text string.
    Text(String),
    TextStart,
    ArrayHeader(u64),
    ArrayStart,
    MapHeader(u64),
    MapStart,
    Tag(u64),
    Break,
    SimpleValue(u8),
    EndOfInput,
}

/// The discriminant of a [`DataItem`], without its payload — what
/// `Reader::data_item()` returns so callers can branch without forcing a
/// decode of the (possibly large) payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Undefined,
    Bool,
    Int,
    Long,
    Float16,
    Float,
    Double,
    NumberString,
    Bytes,
    BytesStart,
    String,
    Text,
    TextStart,
    ArrayHeader,
    ArrayStart,
    MapHeader,
    MapStart,
    Tag,
    Break,
    SimpleValue,
    EndOfInput,
}

impl DataItem {
    pub fn kind(&self) -> Kind {
        match self {
            DataItem::Null => Kind::Null,
            DataItem::Undefined => Kind::Undefined,
            DataItem::Bool(_) => Kind::Bool,
            DataItem::Int(_) => Kind::Int,
            DataItem::Long { .. } => Kind::Long,
            DataItem::Float16(_) => Kind::Float16,
            DataItem::Float(_) => Kind::Float,
            DataItem::Double(_) => Kind::Double,
            DataItem::NumberString(_) => Kind::NumberString,
            DataItem::Bytes(_) => Kind::Bytes,
            DataItem::BytesStart => Kind::BytesStart,
            DataItem::String(_) => Kind::String,
            DataItem::Text(_) => Kind::Text,
            DataItem::TextStart => Kind::TextStart,
            DataItem::ArrayHeader(_) => Kind::ArrayHeader,
            DataItem::ArrayStart => Kind::ArrayStart,
            DataItem::MapHeader(_) => Kind::MapHeader,
            DataItem::MapStart => Kind::MapStart,
            DataItem::Tag(_) => Kind::Tag,
            DataItem::Break => Kind::Break,
            DataItem::SimpleValue(_) => Kind::SimpleValue,
            DataItem::EndOfInput => Kind::EndOfInput,
        }
    }

    pub fn is_container_start(&self) -> bool {
        matches!(
            self.kind(),
            Kind::BytesStart | Kind::TextStart | Kind::ArrayStart | Kind::MapStart
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Float16 => "float16",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::NumberString => "number-string",
            Kind::Bytes => "bytes",
            Kind::BytesStart => "bytes-start",
            Kind::String => "string",
            Kind::Text => "text-chunk",
            Kind::TextStart => "text-start",
            Kind::ArrayHeader => "array-header",
            Kind::ArrayStart => "array-start",
            Kind::MapHeader => "map-header",
            Kind::MapStart => "map-start",
            Kind::Tag => "tag",
            Kind::Break => "break",
            Kind::SimpleValue => "simple-value",
            Kind::EndOfInput => "end-of-input",
        };
        f.write_str(name)
    }
}
