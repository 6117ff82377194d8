use core::fmt;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One word run from an analysis unit's identifier field.
///
/// Headword and part-of-speech ids are numeric in practice, but parse keys
/// carry stem spellings (`ab-e_o_#1` splits into `ab`, `e_o_`, `1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[archive(check_bytes)]
pub enum Ident {
    Number(u32),
    Word(String),
}

impl Ident {
    pub fn from_run(run: &str) -> Self {
        match run.parse::<u32>() {
            Ok(n) if run.bytes().all(|b| b.is_ascii_digit()) => Ident::Number(n),
            _ => Ident::Word(run.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            Ident::Number(n) => Some(*n),
            Ident::Word(_) => None,
        }
    }
}

impl From<u32> for Ident {
    fn from(id: u32) -> Self {
        Ident::Number(id)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Number(n) => write!(f, "{}", n),
            Ident::Word(w) => f.write_str(w),
        }
    }
}

/// Identifiers attached to a single analysis unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct IdentifierInfo {
    pub headword_id: Ident,
    pub pos_id: Ident,
    pub parse_id: Ident,
    pub homograph_id: Option<Ident>,
}
