// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! Built-in big-integer and big-decimal codecs (spec.md §4.1). Magnitudes
//! are stored as big-endian byte buffers — the same shape CBOR's bignum
//! tags (2/3) put on the wire — so the CBOR back-end can write/read them
//! without a base conversion. JSON has no bignum wire form, so these
//! round-trip through `NumberString` there instead (full decimal
//! arithmetic on the resulting digits is out of scope, per spec.md §1
//! Non-goals; only the digit-shifting needed to print/parse one is done
//! here).

use crate::{
    error::{Error, Result},
    item::Kind,
    reader::Reader,
    writer::Writer,
};
use crate::codec::{Decode, Encode};

/// An arbitrary-precision integer, stored as sign plus a big-endian
/// magnitude with no leading zero byte (`0` is `negative: false,
/// magnitude: []`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigInt {
    negative: bool,
    magnitude: Vec<u8>,
}

impl BigInt {
    pub fn from_be_bytes(negative: bool, mut magnitude: Vec<u8>) -> Self {
        while magnitude.first() == Some(&0) {
            magnitude.remove(0);
        }
        let negative = negative && !magnitude.is_empty();
        Self { negative, magnitude }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude_be(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn to_i64(&self) -> Option<i64> {
        if self.magnitude.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[8 - self.magnitude.len()..].copy_from_slice(&self.magnitude);
        let unsigned = u64::from_be_bytes(buf);
        if self.negative {
            if unsigned > i64::MAX as u64 + 1 {
                None
            } else if unsigned == i64::MAX as u64 + 1 {
                Some(i64::MIN)
            } else {
                Some(-(unsigned as i64))
            }
        } else if unsigned > i64::MAX as u64 {
            None
        } else {
            Some(unsigned as i64)
        }
    }

    pub fn from_i64(value: i64) -> Self {
        let negative = value < 0;
        let magnitude = (value as i128).unsigned_abs() as u64;
        Self::from_be_bytes(negative, magnitude.to_be_bytes().to_vec())
    }

    /// Render the magnitude as decimal digits by repeated division by 10
    /// on the byte buffer — the textbook schoolbook "divide a big-endian
    /// base-256 number by a small base" algorithm.
    pub fn to_decimal_string(&self) -> String {
        if self.magnitude.is_empty() {
            return "0".to_string();
        }
        let mut digits = Vec::new();
        let mut work = self.magnitude.clone();
        while work.iter().any(|&b| b != 0) {
            let mut remainder: u32 = 0;
            for byte in work.iter_mut() {
                let acc = (remainder << 8) | *byte as u32;
                *byte = (acc / 10) as u8;
                remainder = acc % 10;
            }
            digits.push(b'0' + remainder as u8);
            while work.first() == Some(&0) && work.len() > 1 {
                work.remove(0);
            }
        }
        digits.reverse();
        let mut s = String::new();
        if self.negative {
            s.push('-');
        }
        s.push_str(std::str::from_utf8(&digits).unwrap());
        s
    }

    /// Parse decimal digits by repeated "multiply the big-endian base-256
    /// accumulator by 10, add the next digit".
    pub fn from_decimal_str(text: &str) -> Option<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut magnitude: Vec<u8> = vec![0];
        for byte in digits.bytes() {
            let digit = (byte - b'0') as u32;
            let mut carry = digit;
            for b in magnitude.iter_mut().rev() {
                let acc = *b as u32 * 10 + carry;
                *b = (acc & 0xff) as u8;
                carry = acc >> 8;
            }
            while carry > 0 {
                magnitude.insert(0, (carry & 0xff) as u8);
                carry >>= 8;
            }
        }
        Some(Self::from_be_bytes(negative, magnitude))
    }
}

impl Encode for BigInt {
    fn encode<W: Writer>(&self, writer: &mut W) -> Result<()> {
        if let Some(small) = self.to_i64() {
            writer.write_long(small)?;
            return Ok(());
        }
        if writer.is_json() {
            writer.write_number_string(&self.to_decimal_string())?;
        } else {
            writer.write_tag(if self.negative { 3 } else { 2 })?;
            writer.write_bytes(&self.magnitude)?;
        }
        Ok(())
    }
}

impl Decode for BigInt {
    fn decode<R: Reader>(reader: &mut R) -> Result<Self> {
        match reader.data_item()? {
            Kind::Int | Kind::Long => Ok(BigInt::from_i64(reader.read_i64()?)),
            Kind::NumberString => {
                let position = reader.position();
                let text = reader.read_number_string()?;
                BigInt::from_decimal_str(&text)
                    .ok_or_else(|| Error::invalid_data(position, "not an integer literal"))
            }
            Kind::Tag => {
                let position = reader.position();
                let tag = reader.read_tag()?;
                let negative = match tag {
                    2 => false,
                    3 => true,
                    _ => return Err(Error::invalid_data(position, "not a bignum tag")),
                };
                let magnitude = reader.read_bytes()?;
                Ok(BigInt::from_be_bytes(negative, magnitude))
            }
            other => Err(Error::unexpected_item(reader.position(), "an integer", other)),
        }
    }
}

/// An arbitrary-precision decimal: `unscaled * 10^-scale`, mirroring
/// CBOR tag 4's `[exponent, mantissa]` pair (exponent stored negated here
/// as `scale` to match the conventional "digits after the point" sense).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i64,
}

impl BigDecimal {
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        Self { unscaled, scale }
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    pub fn to_decimal_string(&self) -> String {
        let digits = self.unscaled.to_decimal_string();
        if self.scale <= 0 {
            let zeros = "0".repeat((-self.scale) as usize);
            return format!("{digits}{zeros}");
        }
        let (sign, digits) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest.to_string()),
            None => ("", digits),
        };
        let scale = self.scale as usize;
        if digits.len() > scale {
            let split = digits.len() - scale;
            format!("{sign}{}.{}", &digits[..split], &digits[split..])
        } else {
            let padding = "0".repeat(scale - digits.len());
            format!("{sign}0.{padding}{digits}")
        }
    }
}

impl Encode for BigDecimal {
    fn encode<W: Writer>(&self, writer: &mut W) -> Result<()> {
        if writer.is_json() {
            writer.write_number_string(&self.to_decimal_string())?;
            return Ok(());
        }
        writer.write_tag(4)?;
        writer.write_array_header(2)?;
        writer.write_int(-self.scale)?;
        self.unscaled.encode(writer)?;
        Ok(())
    }
}

impl Decode for BigDecimal {
    fn decode<R: Reader>(reader: &mut R) -> Result<Self> {
        match reader.data_item()? {
            Kind::NumberString => {
                let position = reader.position();
                let text = reader.read_number_string()?;
                parse_decimal_string(&text)
                    .ok_or_else(|| Error::invalid_data(position, "not a decimal literal"))
            }
            Kind::Tag => {
                let position = reader.position();
                let tag = reader.read_tag()?;
                if tag != 4 {
                    return Err(Error::invalid_data(position, "not a decimal-fraction tag"));
                }
                let len = reader.read_array_header()?;
                if len != 2 {
                    return Err(Error::invalid_data(position, "decimal fraction must have 2 elements"));
                }
                let exponent = reader.read_i64()?;
                let unscaled = BigInt::decode(reader)?;
                Ok(BigDecimal::new(unscaled, -exponent))
            }
            other => Err(Error::unexpected_item(reader.position(), "a decimal number", other)),
        }
    }
}

/// Exposed beyond this module so the CBOR back-end's `write_number_string`
/// can route a decimal literal through the same digit-shifting logic
/// `BigDecimal::decode` uses, rather than duplicating it.
pub fn parse_decimal_string(text: &str) -> Option<BigDecimal> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (integer_part, fraction_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if !integer_part.bytes().all(|b| b.is_ascii_digit()) || !fraction_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{integer_part}{fraction_part}");
    let digits = if digits.is_empty() { "0" } else { digits.trim_start_matches('0') };
    let digits = if digits.is_empty() { "0" } else { digits };
    let signed = if negative { format!("-{digits}") } else { digits.to_string() };
    let unscaled = BigInt::from_decimal_str(&signed)?;
    Some(BigDecimal::new(unscaled, fraction_part.len() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_string_round_trip() {
        let n = BigInt::from_decimal_str("123456789012345678901234567890").unwrap();
        assert_eq!(n.to_decimal_string(), "123456789012345678901234567890");
    }

    #[test]
    fn negative_decimal_string_round_trip() {
        let n = BigInt::from_decimal_str("-42").unwrap();
        assert_eq!(n.to_decimal_string(), "-42");
        assert_eq!(n.to_i64(), Some(-42));
    }

    #[test]
    fn big_decimal_formats_fraction() {
        let unscaled = BigInt::from_decimal_str("27315").unwrap();
        let d = BigDecimal::new(unscaled, 2);
        assert_eq!(d.to_decimal_string(), "273.15");
    }

    #[test]
    fn big_decimal_parses_fraction() {
        let d = parse_decimal_string("-0.015").unwrap();
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_decimal_string(), "-0.015");
    }
}
