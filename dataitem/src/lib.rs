// Copyright © 2021 The dataitem Contributors
//
// This file is part of dataitem, distributed under the GPLv3 with
// Linking Exception. For full terms see the included LICENSE file.

//! The data-item model and `Reader`/`Writer` protocol shared by the CBOR
//! and JSON codec back-ends (spec.md §1-§3). This crate hosts everything
//! format-neutral: the `DataItem`/`Kind` enumeration, the `Input`/
//! `Output` byte abstractions, the `Reader`/`Writer` traits, the
//! `Receptacle`, the `Encode`/`Decode` type-class layer and its built-in
//! codecs, encoder-merging, the error taxonomy, configuration, and the
//! JSON back-end itself (the CBOR back-end lives in the sibling
//! `dataitem-cbor` crate, since it has no shared code with JSON beyond
//! this crate's traits).

pub mod basen;
pub mod bignum;
pub mod codec;
pub mod concat;
pub mod config;
pub mod error;
pub mod io;
pub mod item;
pub mod json;
mod pool;
pub mod position;
pub mod reader;
pub mod receptacle;
#[doc(hidden)]
pub mod support;
pub mod writer;

#[cfg(feature = "derive")]
pub use dataitem_derive::{Decode, Encode};

pub use codec::{Decode, Encode};
pub use config::{JsonDecodingConfig, JsonEncodingConfig, Limits};
pub use error::{Error, Result};
pub use item::{DataItem, Kind};
pub use json::Json;
pub use position::Position;
pub use reader::Reader;
pub use receptacle::Receptacle;
pub use writer::Writer;
