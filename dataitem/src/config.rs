// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! Per-format limits shared by all four configuration objects. `Limits`
//! factors the fields common to CBOR and JSON, encoding and decoding;
//! each format's own config struct embeds one.

/// Fields shared by `CborEncodingConfig`, `CborDecodingConfig`,
/// `JsonEncodingConfig`, and `JsonDecodingConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub buffer_size: usize,
    pub allow_buffer_caching: bool,
    pub max_nesting_levels: u32,
    pub max_byte_string_length: u64,
    pub max_array_length: u64,
    pub max_map_length: u64,
}

impl Limits {
    pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;
    pub const DEFAULT_MAX_NESTING_LEVELS: u32 = 1000;
    /// A single container's declared length must never exceed this many
    /// bytes worth of elements, or decoding fails with `Error::Overflow`.
    pub const DEFAULT_MAX_CONTAINER_BYTES: u64 = 2 * 1024 * 1024 * 1024;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            allow_buffer_caching: false,
            max_nesting_levels: Self::DEFAULT_MAX_NESTING_LEVELS,
            max_byte_string_length: Self::DEFAULT_MAX_CONTAINER_BYTES,
            max_array_length: Self::DEFAULT_MAX_CONTAINER_BYTES,
            max_map_length: Self::DEFAULT_MAX_CONTAINER_BYTES,
        }
    }
}

/// Options governing how the JSON back-end writes a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonEncodingConfig {
    pub limits: Limits,
    /// Emit `i64`/`u64` values that would otherwise be written as a JSON
    /// integer literal as floating point instead — for interop with
    /// consumers whose numeric type is always `f64`.
    pub write_longs_as_floating_point: bool,
}

impl Default for JsonEncodingConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            write_longs_as_floating_point: false,
        }
    }
}

impl JsonEncodingConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.limits.buffer_size = buffer_size;
        self
    }

    pub fn with_write_longs_as_floating_point(mut self, value: bool) -> Self {
        self.write_longs_as_floating_point = value;
        self
    }
}

/// Options governing how the JSON back-end reads a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonDecodingConfig {
    pub limits: Limits,
    pub max_number_mantissa_digits: u32,
    pub max_number_abs_exponent: u32,
    /// If set, every JSON number decodes as [`crate::item::DataItem::NumberString`]
    /// rather than attempting an `Int`/`Long`/`Double` classification.
    pub read_decimal_numbers_only_as_number_strings: bool,
    /// Use the contiguous-buffer SWAR fast path when the `Input` is
    /// backed by a byte slice, instead of the generic byte-at-a-time path.
    pub allow_direct_parsing: bool,
}

impl JsonDecodingConfig {
    pub const DEFAULT_MAX_NUMBER_MANTISSA_DIGITS: u32 = 34;
    pub const DEFAULT_MAX_NUMBER_ABS_EXPONENT: u32 = 64;
}

impl Default for JsonDecodingConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            max_number_mantissa_digits: Self::DEFAULT_MAX_NUMBER_MANTISSA_DIGITS,
            max_number_abs_exponent: Self::DEFAULT_MAX_NUMBER_ABS_EXPONENT,
            read_decimal_numbers_only_as_number_strings: false,
            allow_direct_parsing: true,
        }
    }
}

impl JsonDecodingConfig {
    pub fn with_max_nesting_levels(mut self, levels: u32) -> Self {
        self.limits.max_nesting_levels = levels;
        self
    }

    pub fn with_allow_direct_parsing(mut self, value: bool) -> Self {
        self.allow_direct_parsing = value;
        self
    }
}

/// Options governing how the CBOR back-end writes a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CborEncodingConfig {
    pub limits: Limits,
}

impl Default for CborEncodingConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
        }
    }
}

impl CborEncodingConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.limits.buffer_size = buffer_size;
        self
    }
}

/// Options governing how the CBOR back-end reads a stream 
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CborDecodingConfig {
    pub limits: Limits,
}

impl Default for CborDecodingConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
        }
    }
}

impl CborDecodingConfig {
    pub fn with_max_nesting_levels(mut self, levels: u32) -> Self {
        self.limits.max_nesting_levels = levels;
        self
    }
}
