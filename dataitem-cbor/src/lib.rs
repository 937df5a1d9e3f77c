// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The CBOR (RFC 8949) back-end: [`reader::CborReader`] and
//! [`writer::CborWriter`] implement dataitem's core `Reader`/`Writer`
//! traits; [`Cbor`] is the top-level convenience entry point, mirroring
//! `dataitem::json::Json`'s builder-style API.

pub mod reader;
pub mod writer;

pub use reader::CborReader;
pub use writer::CborWriter;

use dataitem::{
    codec::{Decode, Encode},
    config::{CborDecodingConfig, CborEncodingConfig},
    error::Result,
    io::{Input, Output, ReadInput, SliceInput, VecOutput, WriteOutput},
};

pub struct Cbor;

impl Cbor {
    pub fn encode<T: Encode>(value: &T) -> CborEncodeBuilder<'_, T> {
        CborEncodeBuilder {
            value,
            config: CborEncodingConfig::default(),
        }
    }

    pub fn decode<T: Decode>() -> CborDecodeBuilder<T> {
        CborDecodeBuilder {
            config: CborDecodingConfig::default(),
            _marker: std::marker::PhantomData,
        }
    }
}

pub struct CborEncodeBuilder<'v, T> {
    value: &'v T,
    config: CborEncodingConfig,
}

impl<'v, T: Encode> CborEncodeBuilder<'v, T> {
    pub fn with_config(mut self, config: CborEncodingConfig) -> Self {
        self.config = config;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn to_vec(self) -> Result<Vec<u8>> {
        let output = VecOutput::with_limits(&self.config.limits);
        let mut writer = CborWriter::with_config(output, self.config);
        self.value.encode(&mut writer)?;
        Ok(writer.into_inner().result())
    }

    pub fn to<O: Output>(self, output: O) -> Result<O> {
        let mut writer = CborWriter::with_config(output, self.config);
        self.value.encode(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn to_writer<W: std::io::Write>(self, writer: W) -> Result<()> {
        let mut writer = CborWriter::with_config(WriteOutput::new(writer), self.config);
        self.value.encode(&mut writer)?;
        Ok(())
    }
}

pub struct CborDecodeBuilder<T> {
    config: CborDecodingConfig,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Decode> CborDecodeBuilder<T> {
    pub fn with_config(mut self, config: CborDecodingConfig) -> Self {
        self.config = config;
        self
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_slice(self, bytes: &[u8]) -> Result<T> {
        let mut reader = CborReader::with_config(SliceInput::new(bytes), self.config);
        let value = T::decode(&mut reader)?;
        Ok(value)
    }

    pub fn from_reader<R: std::io::Read>(self, reader: R) -> Result<T> {
        let input: ReadInput<R> = ReadInput::new(reader);
        let mut reader = CborReader::with_config(input, self.config);
        T::decode(&mut reader)
    }

    pub fn from<I: Input>(self, input: I) -> Result<T> {
        let mut reader = CborReader::with_config(input, self.config);
        T::decode(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_through_the_top_level_entry_point() {
        let bytes = Cbor::encode(&42i32).to_vec().unwrap();
        assert_eq!(bytes, vec![0x18, 0x2a]);
        let value: i32 = Cbor::decode().from_slice(&bytes).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn round_trips_a_vec_of_strings() {
        let v = vec!["a".to_string(), "b".to_string()];
        let bytes = Cbor::encode(&v).to_vec().unwrap();
        let back: Vec<String> = Cbor::decode().from_slice(&bytes).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn round_trips_a_big_integer_via_the_bignum_tag() {
        use dataitem::bignum::BigInt;

        let n = BigInt::from_decimal_str("18446744073709551616").unwrap();
        let bytes = Cbor::encode(&n).to_vec().unwrap();
        let back: BigInt = Cbor::decode().from_slice(&bytes).unwrap();
        assert_eq!(back, n);
    }

    #[test]
    fn round_trips_a_nested_map() {
        use std::collections::BTreeMap;

        let mut m = BTreeMap::new();
        m.insert("a".to_string(), vec![1i32, 2, 3]);
        m.insert("b".to_string(), vec![4, 5]);
        let bytes = Cbor::encode(&m).to_vec().unwrap();
        let back: BTreeMap<String, Vec<i32>> = Cbor::decode().from_slice(&bytes).unwrap();
        assert_eq!(back, m);
    }
}
