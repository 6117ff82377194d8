use core::fmt;

use rkyv::{Archive, Deserialize, Serialize};
use crate::morphology::{Case, Gender, MorphFlags, Mood, Number, Person, Tense, Voice};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Bumped whenever the archived layout of [`IndexSnapshot`] changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One decoded grammatical analysis of an inflected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[archive(check_bytes)]
pub enum FeatureRecord {
    FiniteVerb {
        tense: Tense,
        mood: Mood,
        voice: Voice,
        person: Person,
        number: Number,
    },
    /// Gender and number are absent for bare-case participle codes.
    Participle {
        tense: Tense,
        voice: Voice,
        gender: Option<Gender>,
        case: Case,
        number: Option<Number>,
    },
    Infinitive {
        tense: Tense,
        voice: Voice,
    },
    /// Irregular paradigms (ferre and friends) whose codes omit the mood.
    PeriphrasticVerb {
        tense: Tense,
        voice: Voice,
        person: Person,
        number: Number,
    },
}

impl FeatureRecord {
    pub fn tense(&self) -> Tense {
        match *self {
            FeatureRecord::FiniteVerb { tense, .. }
            | FeatureRecord::Participle { tense, .. }
            | FeatureRecord::Infinitive { tense, .. }
            | FeatureRecord::PeriphrasticVerb { tense, .. } => tense,
        }
    }

    pub fn voice(&self) -> Voice {
        match *self {
            FeatureRecord::FiniteVerb { voice, .. }
            | FeatureRecord::Participle { voice, .. }
            | FeatureRecord::Infinitive { voice, .. }
            | FeatureRecord::PeriphrasticVerb { voice, .. } => voice,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeatureRecord::FiniteVerb { .. } => "finite_verb",
            FeatureRecord::Participle { .. } => "participle",
            FeatureRecord::Infinitive { .. } => "infinitive",
            FeatureRecord::PeriphrasticVerb { .. } => "periphrastic_verb",
        }
    }

    /// Collapses the record into a feature set for lemmatizers that match
    /// on flags rather than on record shape.
    pub fn flags(&self) -> MorphFlags {
        match *self {
            FeatureRecord::FiniteVerb { tense, mood, voice, person, number } => {
                MorphFlags::FINITE
                    | tense.flags()
                    | mood.flags()
                    | voice.flags()
                    | person.flags()
                    | number.flags()
            }
            FeatureRecord::Participle { tense, voice, gender, case, number } => {
                let mut flags = MorphFlags::PARTICIPLE | tense.flags() | voice.flags() | case.flags();
                if let Some(gender) = gender {
                    flags |= gender.flags();
                }
                if let Some(number) = number {
                    flags |= number.flags();
                }
                flags
            }
            FeatureRecord::Infinitive { tense, voice } => {
                MorphFlags::INFINITIVE | tense.flags() | voice.flags()
            }
            FeatureRecord::PeriphrasticVerb { tense, voice, person, number } => {
                MorphFlags::PERIPHRASTIC
                    | tense.flags()
                    | voice.flags()
                    | person.flags()
                    | number.flags()
            }
        }
    }
}

/// Renders the record back into grammar-code form, e.g. `pres ind act 1st sg`.
impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureRecord::FiniteVerb { tense, mood, voice, person, number } => {
                write!(f, "{} {} {} {} {}", tense, mood, voice, person, number)
            }
            FeatureRecord::Participle { tense, voice, gender, case, number } => {
                write!(f, "{} part {}", tense, voice)?;
                if let Some(gender) = gender {
                    write!(f, " {}", gender)?;
                }
                write!(f, " {}", case)?;
                if let Some(number) = number {
                    write!(f, " {}", number)?;
                }
                Ok(())
            }
            FeatureRecord::Infinitive { tense, voice } => write!(f, "{} inf {}", tense, voice),
            FeatureRecord::PeriphrasticVerb { tense, voice, person, number } => {
                write!(f, "{} {} {} {}", tense, voice, person, number)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct IndexEntry {
    pub headword: String,
    pub records: Vec<FeatureRecord>,
}

/// Persistable form of a decoded inflection index, sorted by headword.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct IndexSnapshot {
    pub version: u32,
    pub entries: Vec<IndexEntry>,
}
