// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The push-style half of the shared data-item protocol (spec.md §4.2).
//! CBOR and JSON each implement `Writer` directly; an `Encoder<T>` is
//! written against this trait alone and never sees format-specific bytes.

use crate::error::Result;

/// Every method returns `Result<&mut Self>` so calls chain the way the
/// teacher's `minicbor`-based glue does (`e.str(k)?.encode(v)?`).
///
/// Sized containers (`write_array_header`/`write_map_header`) must
/// receive exactly the declared number of items before the next sibling
/// item is written; indefinite containers (`write_array_start`/
/// `write_map_start`) must be closed by `write_break` at the same depth.
/// Implementations enforce both invariants defensively, not only in
/// debug builds (spec.md §7).
pub trait Writer {
    /// `true` for the JSON back-end. Lets generic `Encoder` impls (e.g.
    /// `Option<T>`'s encoder, see spec.md §9 Open Question (a)) branch on
    /// which format they are writing into without a second trait.
    fn is_json(&self) -> bool;

    fn write_null(&mut self) -> Result<&mut Self>;

    /// CBOR-only in spirit; on a JSON writer this maps to `null` rather
    /// than failing, since `Undefined` has an obvious nearest
    /// JSON-representable form (spec.md §4.2).
    fn write_undefined(&mut self) -> Result<&mut Self>;

    fn write_bool(&mut self, value: bool) -> Result<&mut Self>;

    fn write_int(&mut self, value: i64) -> Result<&mut Self>;

    /// Semantically the same payload as `write_int`, but flags the value
    /// as "wide" to the back-end: the JSON writer honours
    /// `JsonEncodingConfig::write_longs_as_floating_point` only for
    /// values written through this method.
    fn write_long(&mut self, value: i64) -> Result<&mut Self>;

    /// A CBOR 8-byte unsigned integer outside `i64`'s range. JSON has no
    /// native representation wide enough; per §4.5 policy the JSON writer
    /// emits it as a `NumberString`-shaped literal (the decimal digits,
    /// unquoted) rather than failing, since JSON numbers are textual.
    fn write_over_long(&mut self, negative: bool, magnitude: u64) -> Result<&mut Self>;

    /// CBOR-only; JSON has no half-float wire form, so a JSON writer maps
    /// this to the widened `f32`/`f64` value instead of failing.
    fn write_float16(&mut self, bits: u16) -> Result<&mut Self>;

    fn write_float(&mut self, value: f32) -> Result<&mut Self>;

    fn write_double(&mut self, value: f64) -> Result<&mut Self>;

    /// Emit the literal decimal text of a number verbatim (no
    /// reformatting, no re-validation) — used when a caller already holds
    /// a numeric value as text that must round-trip byte-exact.
    fn write_number_string(&mut self, value: &str) -> Result<&mut Self>;

    /// CBOR writes this as a byte string (major type 2). JSON has no byte
    /// container, so per §4.5 the JSON writer base64-encodes it into a
    /// JSON string (see `crate::basen`).
    fn write_bytes(&mut self, value: &[u8]) -> Result<&mut Self>;

    /// Opens an indefinite-length byte string; CBOR-only. A JSON writer
    /// fails with `UnsupportedElement` — indefinite byte strings have no
    /// streaming JSON counterpart because JSON strings are not chunked on
    /// the wire.
    fn write_bytes_start(&mut self) -> Result<&mut Self>;

    fn write_string(&mut self, value: &str) -> Result<&mut Self>;

    /// Opens an indefinite-length text string; CBOR-only, same rationale
    /// as `write_bytes_start`.
    fn write_text_start(&mut self) -> Result<&mut Self>;

    fn write_array_header(&mut self, len: u64) -> Result<&mut Self>;

    fn write_array_start(&mut self) -> Result<&mut Self>;

    fn write_map_header(&mut self, len: u64) -> Result<&mut Self>;

    fn write_map_start(&mut self) -> Result<&mut Self>;

    /// CBOR-only (head-only write, major type 6); on a JSON writer this
    /// is a no-op that returns `Ok` — tags annotate the following item
    /// and JSON has no slot for the annotation, so it is simply dropped
    /// rather than rejected, matching the "nearest representable form"
    /// policy of §4.2.
    fn write_tag(&mut self, tag: u64) -> Result<&mut Self>;

    fn write_break(&mut self) -> Result<&mut Self>;

    /// CBOR-only simple value outside the named ones (major type 7, info
    /// 0-19, 24). A JSON writer fails with `UnsupportedElement`: there is
    /// no JSON literal for an arbitrary simple-value code point.
    fn write_simple_value(&mut self, value: u8) -> Result<&mut Self>;
}
