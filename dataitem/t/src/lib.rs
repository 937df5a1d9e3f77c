//! Integration tests for `dataitem`/`dataitem-cbor` that don't fit inside
//! either crate's own `#[cfg(test)]` modules: round-tripping through the
//! public `Encode`/`Decode` + `Cbor`/`Json` entry points, chunked-input
//! equivalence, nesting limits, and a small curated JSON conformance
//! corpus.

pub mod gen;
mod properties;
mod roundtrip;
mod tests;
