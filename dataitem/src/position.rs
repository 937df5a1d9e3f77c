// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

use std::fmt;

/// The point in the input at which a data item starts, or at which an
/// error was raised.
///
/// `index` is a byte offset, not a character offset: for JSON sources this
/// counts UTF-8 bytes, for CBOR sources it counts wire bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    index: u64,
}

impl Position {
    pub const fn new(index: u64) -> Self {
        Self { index }
    }

    pub const fn zero() -> Self {
        Self { index: 0 }
    }

    pub const fn index(self) -> u64 {
        self.index
    }

    pub fn advance(self, by: u64) -> Self {
        Self {
            index: self.index + by,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {}", self.index)
    }
}

impl From<u64> for Position {
    fn from(index: u64) -> Self {
        Self::new(index)
    }
}
