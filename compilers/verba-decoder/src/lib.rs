//! Decoder for Perseus-style Latin lexicon dumps.
//!
//! Each line is a headword, a tab, and a run of `{ids<TAB>gloss<TAB>code}`
//! units. Units whose grammar code describes a verb form become
//! [`FeatureRecord`]s in an [`InflectionIndex`]; everything else is skipped.

pub mod classify;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod fields;
pub mod ident;
pub mod index;

pub use classify::{classify, classify_tokens, Category};
pub use decoder::{decode, decode_line, decode_str, decode_unit, Decoded, DecodedUnit, Decoder};
pub use error::{DecodeError, Rejection};
pub use extract::{extract_units, LexiconLine};
pub use fields::AnalysisUnit;
pub use ident::parse_identifiers;
pub use index::{DecodeStats, InflectionIndex};
pub use verba_protocol::FeatureRecord;
