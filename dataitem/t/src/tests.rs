//! Example-based integration tests: byte-exact wire vectors, encoder
//! merging, streaming/chunked input equivalence, nesting-depth
//! enforcement, a curated JSON conformance subset, and idempotence.

use std::collections::BTreeMap;
use std::io::Read;

use dataitem::{
    concat::{concat, Lengths},
    config::{CborDecodingConfig, JsonDecodingConfig},
    error::Error,
    io::{SliceInput, VecOutput},
    item::Kind,
    json::JsonReader,
    reader::Reader,
    writer::Writer,
    Json,
};
use dataitem_cbor::{Cbor, CborReader, CborWriter};
use pretty_assertions::assert_eq;

// --- testable property 3: byte-exact RFC 8949 vectors, from outside the
// crate boundary (dataitem-cbor's own reader.rs tests cover the same
// vectors against the Reader trait directly). ---

#[test]
fn rfc8949_vectors_round_trip_through_typed_decode() {
    assert_eq!(Cbor::encode(&0i32).to_vec().unwrap(), vec![0x00]);
    assert_eq!(Cbor::encode(&23i32).to_vec().unwrap(), vec![0x17]);
    assert_eq!(Cbor::encode(&24i32).to_vec().unwrap(), vec![0x18, 0x18]);
    assert_eq!(Cbor::encode(&-1i32).to_vec().unwrap(), vec![0x20]);

    let mut m = BTreeMap::new();
    m.insert("a".to_string(), vec![1i32]);
    m.insert("b".to_string(), vec![2i32, 3]);
    let bytes = Cbor::encode(&m).to_vec().unwrap();
    assert_eq!(
        bytes,
        vec![0xa2, 0x61, 0x61, 0x81, 0x01, 0x61, 0x62, 0x82, 0x02, 0x03]
    );
    let back: BTreeMap<String, Vec<i32>> = Cbor::decode().from_slice(&bytes).unwrap();
    assert_eq!(back, m);
}

// --- testable property 7: encoder-merging, exact hex vectors ---

#[test]
fn concat_two_sized_arrays_sums_their_lengths() {
    let mut writer = CborWriter::new(VecOutput::new());
    concat(
        &mut writer,
        Lengths::array(Some(2)),
        |w| {
            w.write_int(1)?;
            w.write_int(2)?;
            Ok(())
        },
        Lengths::array(Some(2)),
        |w| {
            w.write_int(3)?;
            w.write_int(4)?;
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(writer.into_inner().result(), vec![0x84, 1, 2, 3, 4]);
}

#[test]
fn concat_falls_back_to_indefinite_if_either_side_is_unsized() {
    let mut writer = CborWriter::new(VecOutput::new());
    concat(
        &mut writer,
        Lengths::array(None),
        |w| {
            w.write_int(1)?;
            Ok(())
        },
        Lengths::array(Some(1)),
        |w| {
            w.write_int(2)?;
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(writer.into_inner().result(), vec![0x9f, 1, 2, 0xff]);
}

#[test]
fn concat_two_sized_maps_sums_their_entry_counts() {
    let mut writer = CborWriter::new(VecOutput::new());
    concat(
        &mut writer,
        Lengths::map(Some(1)),
        |w| {
            w.write_string("a")?;
            w.write_int(1)?;
            Ok(())
        },
        Lengths::map(Some(1)),
        |w| {
            w.write_string("b")?;
            w.write_int(2)?;
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(
        writer.into_inner().result(),
        vec![0xa2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02]
    );
}

#[test]
fn concat_array_with_map_is_rejected() {
    let mut writer = CborWriter::new(VecOutput::new());
    let err = concat(
        &mut writer,
        Lengths::array(Some(1)),
        |w| w.write_int(1).map(|_| ()),
        Lengths::map(Some(1)),
        |w| {
            w.write_string("a")?;
            w.write_int(1)?;
            Ok(())
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedEncoderMerging { .. }));
}

// --- testable property 5: streaming/chunked input equivalence ---

/// Feeds a byte slice through `std::io::Read` in chunks of the given
/// sizes (cycling once exhausted); a `0` entry contributes nothing and
/// is skipped rather than returned as a spurious `Ok(0)`, so it never
/// looks like an EOF signal to the caller.
struct ChunkedReader<'a> {
    data: &'a [u8],
    pos: usize,
    sizes: &'a [usize],
    next: usize,
}

impl<'a> ChunkedReader<'a> {
    fn new(data: &'a [u8], sizes: &'a [usize]) -> Self {
        assert!(sizes.iter().any(|&n| n > 0), "chunk sizes must include at least one non-zero entry");
        Self { data, pos: 0, sizes, next: 0 }
    }
}

impl<'a> Read for ChunkedReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        loop {
            let size = self.sizes[self.next % self.sizes.len()];
            self.next += 1;
            let n = size.min(buf.len()).min(self.data.len() - self.pos);
            if n == 0 {
                continue;
            }
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
    }
}

const CHUNK_SIZES: &[usize] = &[5, 0, 11, 7, 2, 0, 0, 1, 23];

#[test]
fn cbor_decoding_is_equivalent_across_arbitrary_chunk_sizes() {
    let mut m: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    m.insert("alpha".into(), vec![1, 2, 3, 4, 5]);
    m.insert("beta".into(), (0..40).collect());
    m.insert("gamma".into(), vec![]);

    let bytes = Cbor::encode(&m).to_vec().unwrap();
    let whole: BTreeMap<String, Vec<i32>> = Cbor::decode().from_slice(&bytes).unwrap();
    let chunked: BTreeMap<String, Vec<i32>> =
        Cbor::decode().from_reader(ChunkedReader::new(&bytes, CHUNK_SIZES)).unwrap();
    assert_eq!(whole, chunked);
}

#[test]
fn json_decoding_is_equivalent_across_arbitrary_chunk_sizes() {
    let mut m: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    m.insert("alpha".into(), vec![1, 2, 3, 4, 5]);
    m.insert("beta".into(), (0..40).collect());
    m.insert("gamma".into(), vec![]);

    let bytes = Json::encode(&m).to_vec().unwrap();
    let whole: BTreeMap<String, Vec<i32>> = Json::decode().from_slice(&bytes).unwrap();
    let chunked: BTreeMap<String, Vec<i32>> =
        Json::decode().from_reader(ChunkedReader::new(&bytes, CHUNK_SIZES)).unwrap();
    assert_eq!(whole, chunked);
}

// --- testable property 6: nesting-depth enforcement ---

fn nested_array_bytes(depth: usize) -> Vec<u8> {
    let mut w = CborWriter::new(VecOutput::new());
    for _ in 0..depth {
        w.write_array_start().unwrap();
    }
    w.write_int(1).unwrap();
    for _ in 0..depth {
        w.write_break().unwrap();
    }
    w.into_inner().result()
}

#[test]
fn cbor_nesting_at_the_configured_limit_succeeds() {
    let bytes = nested_array_bytes(8);
    let config = CborDecodingConfig::default().with_max_nesting_levels(8);
    let mut reader = CborReader::with_config(SliceInput::new(&bytes), config);
    reader.skip_element().unwrap();
}

#[test]
fn cbor_nesting_past_the_configured_limit_overflows() {
    let bytes = nested_array_bytes(9);
    let config = CborDecodingConfig::default().with_max_nesting_levels(8);
    let mut reader = CborReader::with_config(SliceInput::new(&bytes), config);
    let err = reader.skip_element().unwrap_err();
    assert!(matches!(err, Error::Overflow { .. }));
}

#[test]
fn json_nesting_past_the_configured_limit_overflows() {
    let mut text = String::new();
    for _ in 0..9 {
        text.push('[');
    }
    text.push('1');
    for _ in 0..9 {
        text.push(']');
    }
    let config = JsonDecodingConfig::default().with_max_nesting_levels(8);
    let err = Json::decode::<Vec<i32>>()
        .with_config(config)
        .from_slice(text.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::Overflow { .. }));
}

// --- testable property 4: a curated JSON conformance subset ---

/// Reads one top-level value with the raw `Reader` protocol (rather than
/// a concrete `Decode` target, which would beg the question of which
/// shape to require) and confirms nothing but whitespace follows it.
fn accepts(text: &str) -> bool {
    let mut reader = JsonReader::with_config(SliceInput::new(text.as_bytes()), JsonDecodingConfig::default());
    match reader.skip_element() {
        Ok(()) => matches!(reader.data_item(), Ok(Kind::EndOfInput)),
        Err(_) => false,
    }
}

#[test]
fn accepts_well_formed_json() {
    assert!(accepts("[]"));
    assert!(accepts("{}"));
    assert!(accepts("[1,2,3]"));
    assert!(accepts(r#"{"a":1,"b":[true,false,null]}"#));
    assert!(accepts(r#""é""#));
    assert!(accepts("-0"));
    assert!(accepts("1.5e-10"));
    assert!(accepts("0"));
    assert!(accepts(r#""with a \" quote""#));
}

#[test]
fn rejects_trailing_commas() {
    assert!(!accepts("[1,2,]"));
    assert!(!accepts(r#"{"a":1,}"#));
}

#[test]
fn rejects_single_quoted_strings() {
    assert!(!accepts("['a']"));
}

#[test]
fn rejects_unquoted_object_keys() {
    assert!(!accepts("{a:1}"));
}

#[test]
fn rejects_comments() {
    assert!(!accepts("[1 /* comment */]"));
    assert!(!accepts("// leading comment\n[1]"));
}

#[test]
fn rejects_leading_zeroes() {
    assert!(!accepts("01"));
    assert!(!accepts("-01"));
}

#[test]
fn rejects_nan_and_infinity_literals() {
    assert!(!accepts("NaN"));
    assert!(!accepts("Infinity"));
    assert!(!accepts("-Infinity"));
}

#[test]
fn rejects_incomplete_literals() {
    assert!(!accepts("tru"));
    assert!(!accepts("[1,"));
    assert!(!accepts(r#"{"a":"#));
}

#[test]
fn rejects_multiple_top_level_values() {
    assert!(!accepts("1 2"));
    assert!(!accepts("{}{}"));
}

// --- testable property 9: idempotence on canonical input ---

#[test]
fn canonical_cbor_is_idempotent_under_decode_then_encode() {
    let original: BTreeMap<String, i32> =
        [("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)].into();
    let bytes = Cbor::encode(&original).to_vec().unwrap();
    let decoded: BTreeMap<String, i32> = Cbor::decode().from_slice(&bytes).unwrap();
    let re_encoded = Cbor::encode(&decoded).to_vec().unwrap();
    assert_eq!(bytes, re_encoded);
}

#[test]
fn canonical_json_is_idempotent_under_decode_then_encode() {
    let original: Vec<i64> = vec![0, 1, -1, 1_000_000_000_000, i64::MIN];
    let bytes = Json::encode(&original).to_vec().unwrap();
    let decoded: Vec<i64> = Json::decode().from_slice(&bytes).unwrap();
    let re_encoded = Json::encode(&decoded).to_vec().unwrap();
    assert_eq!(bytes, re_encoded);
}
