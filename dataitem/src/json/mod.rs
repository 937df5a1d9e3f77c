// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The JSON back-end (spec.md §4.5): [`reader::JsonReader`] and
//! [`writer::JsonWriter`] implement the core [`crate::reader::Reader`]/
//! [`crate::writer::Writer`] traits; [`Json`] is the top-level
//! convenience entry point named in spec.md §6.

pub(crate) mod number;
pub mod reader;
pub(crate) mod scanner;
pub mod writer;

pub use reader::JsonReader;
pub use writer::JsonWriter;

use crate::{
    codec::{Decode, Encode},
    config::{JsonDecodingConfig, JsonEncodingConfig},
    error::Result,
    io::{Input, Output, ReadInput, SliceInput, VecOutput, WriteOutput},
};

/// Entry point for `Cbor.encode(value).to(output).result`-style usage
/// (spec.md §6), specialized to the JSON format.
pub struct Json;

impl Json {
    pub fn encode<T: Encode>(value: &T) -> JsonEncodeBuilder<'_, T> {
        JsonEncodeBuilder {
            value,
            config: JsonEncodingConfig::default(),
        }
    }

    pub fn decode<T: Decode>() -> JsonDecodeBuilder<T> {
        JsonDecodeBuilder {
            config: JsonDecodingConfig::default(),
            _marker: std::marker::PhantomData,
        }
    }
}

pub struct JsonEncodeBuilder<'v, T> {
    value: &'v T,
    config: JsonEncodingConfig,
}

impl<'v, T: Encode> JsonEncodeBuilder<'v, T> {
    pub fn with_config(mut self, config: JsonEncodingConfig) -> Self {
        self.config = config;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn to_vec(self) -> Result<Vec<u8>> {
        let output = VecOutput::with_limits(&self.config.limits);
        let mut writer = JsonWriter::with_config(output, self.config);
        self.value.encode(&mut writer)?;
        Ok(writer.into_inner().result())
    }

    pub fn to<O: Output>(self, output: O) -> Result<O> {
        let mut writer = JsonWriter::with_config(output, self.config);
        self.value.encode(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn to_writer<W: std::io::Write>(self, writer: W) -> Result<()> {
        let mut writer = JsonWriter::with_config(WriteOutput::new(writer), self.config);
        self.value.encode(&mut writer)?;
        Ok(())
    }
}

pub struct JsonDecodeBuilder<T> {
    config: JsonDecodingConfig,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Decode> JsonDecodeBuilder<T> {
    pub fn with_config(mut self, config: JsonDecodingConfig) -> Self {
        self.config = config;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_slice(self, bytes: &[u8]) -> Result<T> {
        let mut reader = JsonReader::with_config(SliceInput::new(bytes), self.config);
        let value = T::decode(&mut reader)?;
        Ok(value)
    }

    pub fn from_reader<R: std::io::Read>(self, reader: R) -> Result<T> {
        let input: ReadInput<R> = ReadInput::new(reader);
        let mut reader = JsonReader::with_config(input, self.config);
        T::decode(&mut reader)
    }

    pub fn from<I: Input>(self, input: I) -> Result<T> {
        let mut reader = JsonReader::with_config(input, self.config);
        T::decode(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_through_the_top_level_entry_point() {
        let bytes = Json::encode(&42i32).to_vec().unwrap();
        assert_eq!(bytes, b"42");
        let value: i32 = Json::decode().from_slice(&bytes).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn round_trips_a_vec_of_strings() {
        let v = vec!["a".to_string(), "b".to_string()];
        let bytes = Json::encode(&v).to_vec().unwrap();
        assert_eq!(bytes, br#"["a","b"]"#);
        let back: Vec<String> = Json::decode().from_slice(&bytes).unwrap();
        assert_eq!(back, v);
    }
}
