// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The single mutable cell holding the most recently parsed data item.
//!
//! A format's parser writes into a [`Receptacle`] instead of allocating a
//! fresh [`DataItem`] per call; a [`crate::reader::Reader`] reads back out
//! of it. Three primitive slots (`i64`, `f64`, a string/byte buffer) plus a
//! `Kind` discriminant cover every variant's payload without a per-item
//! heap allocation for the common (numeric, boolean, short string) case.

use crate::item::Kind;

#[derive(Clone, Debug, Default)]
pub struct Receptacle {
    kind: Option<Kind>,
    int_slot: i64,
    float_slot: f64,
    /// Backs `String`, `Text`, `NumberString`, and (as raw bytes) `Bytes`.
    text_slot: String,
    bytes_slot: Vec<u8>,
}

impl Receptacle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    pub fn clear(&mut self) {
        self.kind = None;
    }

    pub fn set_null(&mut self) {
        self.kind = Some(Kind::Null);
    }

    pub fn set_undefined(&mut self) {
        self.kind = Some(Kind::Undefined);
    }

    pub fn set_bool(&mut self, value: bool) {
        self.int_slot = value as i64;
        self.kind = Some(Kind::Bool);
    }

    pub fn set_int(&mut self, value: i64) {
        self.int_slot = value;
        self.kind = Some(Kind::Int);
    }

    pub fn set_long(&mut self, negative: bool, magnitude: u64) {
        self.int_slot = if negative { -1 } else { 1 };
        self.bytes_slot.clear();
        self.bytes_slot.extend_from_slice(&magnitude.to_be_bytes());
        self.kind = Some(Kind::Long);
    }

    pub fn set_float16(&mut self, bits: u16) {
        self.int_slot = bits as i64;
        self.kind = Some(Kind::Float16);
    }

    pub fn set_float(&mut self, value: f32) {
        self.float_slot = value as f64;
        self.kind = Some(Kind::Float);
    }

    pub fn set_double(&mut self, value: f64) {
        self.float_slot = value;
        self.kind = Some(Kind::Double);
    }

    pub fn set_number_string(&mut self, text: String) {
        self.text_slot = text;
        self.kind = Some(Kind::NumberString);
    }

    pub fn set_bytes(&mut self, bytes: Vec<u8>) {
        self.bytes_slot = bytes;
        self.kind = Some(Kind::Bytes);
    }

    pub fn set_bytes_start(&mut self) {
        self.kind = Some(Kind::BytesStart);
    }

    pub fn set_string(&mut self, text: String) {
        self.text_slot = text;
        self.kind = Some(Kind::String);
    }

    pub fn set_text(&mut self, text: String) {
        self.text_slot = text;
        self.kind = Some(Kind::Text);
    }

    pub fn set_text_start(&mut self) {
        self.kind = Some(Kind::TextStart);
    }

    pub fn set_array_header(&mut self, n: u64) {
        self.int_slot = n as i64;
        self.kind = Some(Kind::ArrayHeader);
    }

    pub fn set_array_start(&mut self) {
        self.kind = Some(Kind::ArrayStart);
    }

    pub fn set_map_header(&mut self, n: u64) {
        self.int_slot = n as i64;
        self.kind = Some(Kind::MapHeader);
    }

    pub fn set_map_start(&mut self) {
        self.kind = Some(Kind::MapStart);
    }

    pub fn set_tag(&mut self, tag: u64) {
        self.bytes_slot.clear();
        self.bytes_slot.extend_from_slice(&tag.to_be_bytes());
        self.kind = Some(Kind::Tag);
    }

    pub fn set_break(&mut self) {
        self.kind = Some(Kind::Break);
    }

    pub fn set_simple_value(&mut self, value: u8) {
        self.int_slot = value as i64;
        self.kind = Some(Kind::SimpleValue);
    }

    pub fn set_end_of_input(&mut self) {
        self.kind = Some(Kind::EndOfInput);
    }

    pub fn as_bool(&self) -> bool {
        self.int_slot != 0
    }

    pub fn as_int(&self) -> i64 {
        self.int_slot
    }

    pub fn as_long(&self) -> (bool, u64) {
        let negative = self.int_slot < 0;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.bytes_slot[..8]);
        (negative, u64::from_be_bytes(buf))
    }

    pub fn as_float16_bits(&self) -> u16 {
        self.int_slot as u16
    }

    pub fn as_float(&self) -> f32 {
        self.float_slot as f32
    }

    pub fn as_double(&self) -> f64 {
        self.float_slot
    }

    pub fn as_str(&self) -> &str {
        &self.text_slot
    }

    pub fn take_string(&mut self) -> String {
        std::mem::take(&mut self.text_slot)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes_slot
    }

    pub fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes_slot)
    }

    pub fn as_header_len(&self) -> u64 {
        self.int_slot as u64
    }

    pub fn as_tag(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.bytes_slot[..8]);
        u64::from_be_bytes(buf)
    }

    pub fn as_simple_value(&self) -> u8 {
        self.int_slot as u8
    }

    /// Zero-allocation comparison of the current `String`/`Text` item
    /// against a caller-supplied candidate — used by derived codecs to
    /// dispatch on field names without allocating the candidate first.
    pub fn string_compare_bytes(&self, candidate: &str) -> bool {
        self.text_slot == candidate
    }
}
