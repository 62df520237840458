//! # sora-codec
//!
//! This crate encodes and decodes the base64 VLQ fields of source maps: the classic
//! `mappings` field and the `originalScopes` / `generatedRanges` fields of the scopes
//! extension.
//!
//! ## Getting Started
//!
//! ```
//! use sora_codec::{decode, encode, Segment};
//!
//! let decoded = decode("AAAA,CAAC;AACA").unwrap();
//! assert_eq!(decoded[0][0], Segment::new(0).with_source(0, 0, 0));
//!
//! assert_eq!(encode(&decoded).unwrap(), "AAAA,CAAC;AACA");
//! ```
//!
//! ## Overview
//!
//! ### `mappings`
//!
//! [decode] returns one [SourceMapLine] per generated line, each a list of [Segment]s.
//! [encode] is its inverse.
//!
//! ### `originalScopes`
//!
//! [decode_original_scopes] and [encode_original_scopes] work on one entry of the
//! `originalScopes` array, which describes the scope tree of one original source
//! as a flat list of [OriginalScope]s in pre-order.
//!
//! ### `generatedRanges`
//!
//! [decode_generated_ranges] and [encode_generated_ranges] work on the
//! `generatedRanges` string, a tree of [GeneratedRange]s in pre-order.
//! Ranges may point at the original scope they come from ([Definition]), the place
//! they were inlined from ([Callsite]) and carry variable [Binding]s.
//!
//! ### `DecodedSourceMap`
//!
//! With the `json` feature, `DecodedSourceMap` parses a whole source map document
//! and decodes all three fields at once.
//!
//! ## Features
//!
//! - `json` (default): Enables `DecodedSourceMap` and the JSON reading and writing
//!   it needs.
//!

mod error;
mod mapping;
mod mappings;
mod ranges;
mod reader;
mod scopes;
#[cfg(feature = "json")]
mod sourcemap;
mod tree;
mod vlq;
mod writer;

pub use error::*;
pub use mapping::*;
pub use mappings::*;
pub use ranges::*;
pub use scopes::*;
#[cfg(feature = "json")]
pub use sourcemap::*;
