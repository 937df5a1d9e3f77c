//! Small generic round-trip assertions shared by the property and
//! example-based tests in this crate.

use std::fmt::Debug;

use dataitem::{Decode, Encode};
use dataitem_cbor::Cbor;
use pretty_assertions::assert_eq;

pub fn cbor<A>(a: A)
where
    A: Debug + PartialEq + Encode + Decode,
{
    let bytes = Cbor::encode(&a).to_vec().unwrap();
    let back: A = Cbor::decode().from_slice(&bytes).unwrap();
    assert_eq!(a, back);
}

pub fn json<A>(a: A)
where
    A: Debug + PartialEq + Encode + Decode,
{
    let bytes = dataitem::Json::encode(&a).to_vec().unwrap();
    let back: A = dataitem::Json::decode().from_slice(&bytes).unwrap();
    assert_eq!(a, back);
}
