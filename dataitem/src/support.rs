// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! Helpers called from `dataitem-derive`'s generated code. Kept separate
//! from [`crate::codec`] because these are key-dispatch variants of
//! `codec`'s private `decode_map`/`decode_sequence` helpers, shaped for a
//! fixed, compile-time-known set of fields rather than an arbitrary
//! `Decode` value per entry.

use crate::{error::Error, error::Result, item::Kind, reader::Reader};

/// How many more entries remain in a map whose header has already been
/// consumed by [`open_map`] — a known count for a sized map, or "read
/// until `Break`" for an indefinite one.
pub enum MapTail {
    Sized(u64),
    Indefinite,
}

impl MapTail {
    /// Account for one entry already consumed directly by the caller
    /// (derived enum decode reads the tag entry itself before handing the
    /// rest of the map to [`visit_map_tail`]).
    pub fn minus_one(self) -> MapTail {
        match self {
            MapTail::Sized(n) => MapTail::Sized(n.saturating_sub(1)),
            MapTail::Indefinite => MapTail::Indefinite,
        }
    }
}

/// Consume a map's header (sized or indefinite) without reading any
/// entries, reporting how many (or whether an unknown number of) entries
/// remain.
pub fn open_map<R: Reader>(reader: &mut R) -> Result<MapTail> {
    match reader.data_item()? {
        Kind::MapHeader => Ok(MapTail::Sized(reader.read_map_header()?)),
        Kind::MapStart => {
            reader.read_map_start()?;
            Ok(MapTail::Indefinite)
        }
        other => Err(Error::unexpected_item(reader.position(), "a map", other)),
    }
}

/// Visit the remaining entries of a map opened by [`open_map`], closing
/// it (reading the trailing `Break`, for an indefinite map) once
/// exhausted.
pub fn visit_map_tail<R: Reader>(
    reader: &mut R,
    tail: MapTail,
    mut visit: impl FnMut(&mut R, String) -> Result<()>,
) -> Result<()> {
    match tail {
        MapTail::Sized(n) => {
            for _ in 0..n {
                let key = reader.read_string()?;
                visit(reader, key)?;
            }
            Ok(())
        }
        MapTail::Indefinite => loop {
            if reader.has_break()? {
                return reader.read_break();
            }
            let key = reader.read_string()?;
            visit(reader, key)?;
        },
    }
}

/// Reads a whole map (sized or indefinite) and calls `visit` once per
/// entry with the decoded key string; `visit` is responsible for decoding
/// the value (or skipping it, for an unrecognised key).
pub fn decode_map_entries<R: Reader>(
    reader: &mut R,
    visit: impl FnMut(&mut R, String) -> Result<()>,
) -> Result<()> {
    let tail = open_map(reader)?;
    visit_map_tail(reader, tail, visit)
}

/// Reads an array (sized or indefinite) and calls `visit` once per element
/// with its zero-based index; `visit` decodes (or skips) the element.
pub fn decode_array_elements<R: Reader>(
    reader: &mut R,
    mut visit: impl FnMut(&mut R, usize) -> Result<()>,
) -> Result<()> {
    match reader.data_item()? {
        Kind::ArrayHeader => {
            let len = reader.read_array_header()?;
            for index in 0..len {
                visit(reader, index as usize)?;
            }
            Ok(())
        }
        Kind::ArrayStart => {
            reader.read_array_start()?;
            let mut index = 0usize;
            loop {
                if reader.has_break()? {
                    return reader.read_break();
                }
                visit(reader, index)?;
                index += 1;
            }
        }
        other => Err(Error::unexpected_item(reader.position(), "an array", other)),
    }
}
