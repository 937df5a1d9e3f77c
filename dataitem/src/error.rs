// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

use thiserror::Error;

use crate::{item::Kind, position::Position};

/// Every error the core can raise, paired with the byte [`Position`] at
/// which decoding or encoding halted.
///
/// `Error` is `#[non_exhaustive]`: new variants may be added without a
/// breaking change. One message per variant, and `#[from]` only for a
/// wrapped lower-level error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("premature end of input at {0}")]
    InsufficientInput(Position),

    #[error("invalid input data at {position}: {message}")]
    InvalidInputData { position: Position, message: String },

    #[error("unexpected end of input at {0}")]
    UnexpectedEndOfInput(Position),

    #[error("at {position}: expected {expected}, found {actual}")]
    UnexpectedDataItem {
        position: Position,
        expected: String,
        actual: Kind,
    },

    #[error("validation failed at {position}: {message}")]
    ValidationFailure { position: Position, message: String },

    #[error("overflow at {position}: {message}")]
    Overflow { position: Position, message: String },

    #[error("at {position}: {kind} cannot be represented in this format")]
    UnsupportedElement { position: Position, kind: Kind },

    #[error("cannot merge encoders: {message}")]
    UnsupportedEncoderMerging { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::InsufficientInput(p)
            | Error::UnexpectedEndOfInput(p)
            | Error::InvalidInputData { position: p, .. }
            | Error::UnexpectedDataItem { position: p, .. }
            | Error::ValidationFailure { position: p, .. }
            | Error::Overflow { position: p, .. }
            | Error::UnsupportedElement { position: p, .. } => Some(*p),
            Error::UnsupportedEncoderMerging { .. } | Error::Io(_) => None,
        }
    }

    pub fn invalid_data(position: Position, message: impl Into<String>) -> Self {
        let err = Error::InvalidInputData {
            position,
            message: message.into(),
        };
        tracing::debug!(%position, %err, "invalid input data");
        err
    }

    pub fn unexpected_item(position: Position, expected: impl Into<String>, actual: Kind) -> Self {
        let err = Error::UnexpectedDataItem {
            position,
            expected: expected.into(),
            actual,
        };
        tracing::debug!(%position, %err, "unexpected data item");
        err
    }

    pub fn validation(position: Position, message: impl Into<String>) -> Self {
        Error::ValidationFailure {
            position,
            message: message.into(),
        }
    }

    pub fn overflow(position: Position, message: impl Into<String>) -> Self {
        let err = Error::Overflow {
            position,
            message: message.into(),
        };
        tracing::debug!(%position, %err, "overflow");
        err
    }

    pub fn unsupported_element(position: Position, kind: Kind) -> Self {
        Error::UnsupportedElement { position, kind }
    }

    pub fn unsupported_merging(message: impl Into<String>) -> Self {
        Error::UnsupportedEncoderMerging {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
