// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The JSON numeric classification cascade (spec.md §4.5): a scanned
//! number token becomes `Int` (fits `i32`), `Long` (fits `i64` but not
//! `i32`), `Double` (within the configured mantissa/exponent limits and
//! exactly representable), or `NumberString` (everything else that is
//! still a well-formed literal). Exceeding the configured limits raises
//! `Overflow` — the spec's `NumberOutOfBounds` realized as the nearest
//! variant of the canonical error taxonomy (see DESIGN.md).

use crate::{
    config::JsonDecodingConfig,
    error::{Error, Result},
    position::Position,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Classified {
    Int(i64),
    Long { negative: bool, magnitude: u64 },
    Double(f64),
    NumberString(String),
}

/// A `Double` parse is only trusted up to this many significant decimal
/// digits; beyond it a round-trip through `f64` is not guaranteed exact,
/// so the literal is kept verbatim as a `NumberString` instead. This is a
/// pragmatic approximation (IEEE 754 binary64 carries 15-17 significant
/// decimal digits), not a certified arbitrary-precision boundary — full
/// decimal precision certification is out of scope (see spec.md §1
/// Non-goals on `BigDecimal` arithmetic).
const EXACT_DOUBLE_DIGIT_CEILING: u32 = 17;

pub fn classify(text: &str, position: Position, config: &JsonDecodingConfig) -> Result<Classified> {
    let negative = text.starts_with('-');
    let has_frac_or_exp = text.bytes().any(|b| b == b'.' || b == b'e' || b == b'E');

    if !has_frac_or_exp {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if let Ok(magnitude) = digits.parse::<u64>() {
            return Ok(if fits_i32(negative, magnitude) {
                Classified::Int(if negative { -(magnitude as i64) } else { magnitude as i64 })
            } else {
                Classified::Long { negative, magnitude }
            });
        }
        let mantissa_digits = digits.len() as u32;
        if mantissa_digits > config.max_number_mantissa_digits {
            return Err(Error::overflow(
                position,
                "integer literal exceeds the configured mantissa digit limit",
            ));
        }
        return Ok(Classified::NumberString(text.to_string()));
    }

    if config.read_decimal_numbers_only_as_number_strings {
        return Ok(Classified::NumberString(text.to_string()));
    }

    let mantissa_digits = count_mantissa_digits(text);
    let abs_exponent = extract_abs_exponent(text);
    if mantissa_digits > config.max_number_mantissa_digits || abs_exponent > config.max_number_abs_exponent {
        return Err(Error::overflow(
            position,
            "decimal literal exceeds the configured mantissa digit or exponent limit",
        ));
    }

    let value: f64 = text
        .parse()
        .map_err(|_| Error::invalid_data(position, "malformed number literal"))?;

    if mantissa_digits <= EXACT_DOUBLE_DIGIT_CEILING {
        Ok(Classified::Double(value))
    } else {
        Ok(Classified::NumberString(text.to_string()))
    }
}

fn fits_i32(negative: bool, magnitude: u64) -> bool {
    if negative {
        magnitude <= i32::MAX as u64 + 1
    } else {
        magnitude <= i32::MAX as u64
    }
}

fn count_mantissa_digits(text: &str) -> u32 {
    let mantissa_part = match text.find(['e', 'E']) {
        Some(idx) => &text[..idx],
        None => text,
    };
    mantissa_part.bytes().filter(u8::is_ascii_digit).count() as u32
}

fn extract_abs_exponent(text: &str) -> u32 {
    match text.find(['e', 'E']) {
        Some(idx) => {
            let exp_part = &text[idx + 1..];
            let exp_part = exp_part.strip_prefix('+').unwrap_or(exp_part);
            exp_part.parse::<i64>().map(|v| v.unsigned_abs() as u32).unwrap_or(u32::MAX)
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::zero()
    }

    #[test]
    fn small_integer_classifies_as_int() {
        assert_eq!(
            classify("42", pos(), &JsonDecodingConfig::default()).unwrap(),
            Classified::Int(42)
        );
        assert_eq!(
            classify("-42", pos(), &JsonDecodingConfig::default()).unwrap(),
            Classified::Int(-42)
        );
    }

    #[test]
    fn i32_boundary_tips_into_long() {
        let just_over = (i32::MAX as i64 + 1).to_string();
        match classify(&just_over, pos(), &JsonDecodingConfig::default()).unwrap() {
            Classified::Long { negative, magnitude } => {
                assert!(!negative);
                assert_eq!(magnitude, i32::MAX as u64 + 1);
            }
            other => panic!("expected Long, got {other:?}"),
        }
    }

    #[test]
    fn simple_fraction_classifies_as_double() {
        assert_eq!(
            classify("3.25", pos(), &JsonDecodingConfig::default()).unwrap(),
            Classified::Double(3.25)
        );
    }

    #[test]
    fn oversized_mantissa_falls_back_to_number_string() {
        let text = format!("1.{}", "2".repeat(40));
        match classify(&text, pos(), &JsonDecodingConfig::default()).unwrap() {
            Classified::NumberString(s) => assert_eq!(s, text),
            other => panic!("expected NumberString, got {other:?}"),
        }
    }

    #[test]
    fn exponent_beyond_limit_overflows() {
        let text = "1e999999999";
        let err = classify(text, pos(), &JsonDecodingConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }));
    }

    #[test]
    fn decimal_only_as_number_strings_flag_forces_text() {
        let config = JsonDecodingConfig {
            read_decimal_numbers_only_as_number_strings: true,
            ..JsonDecodingConfig::default()
        };
        match classify("1.5", pos(), &config).unwrap() {
            Classified::NumberString(s) => assert_eq!(s, "1.5"),
            other => panic!("expected NumberString, got {other:?}"),
        }
    }
}
