use core::fmt;
use core::str::FromStr;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

use crate::error::UnknownToken;

/// Declares a closed grammatical vocabulary whose variants map one-to-one
/// onto the tokens used in lexicon grammar codes.
macro_rules! define_tokens {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Archive, Serialize, Deserialize)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[archive(check_bytes)]
        #[repr(u8)]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_token(token: &str) -> Option<Self> {
                match token {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub const fn as_token(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_token(s).ok_or_else(|| UnknownToken::new(stringify!($name), s))
            }
        }
    };
}

define_tokens!(
    Tense {
        Future => "fut",
        FuturePerfect => "futperf",
        Imperfect => "imperf",
        Perfect => "perf",
        Present => "pres",
        Pluperfect => "plup",
    }
);

define_tokens!(
    /// Finite moods. Participles and infinitives are distinct record kinds.
    Mood {
        Indicative => "ind",
        Imperative => "imperat",
        Subjunctive => "subj",
    }
);

define_tokens!(
    Voice {
        Active => "act",
        Passive => "pass",
    }
);

define_tokens!(
    Person {
        First => "1st",
        Second => "2nd",
        Third => "3rd",
    }
);

define_tokens!(
    Number {
        Plural => "pl",
        Singular => "sg",
    }
);

define_tokens!(
    /// Gender tags, including the syncretic forms the dumps emit for
    /// participles that share endings across genders.
    Gender {
        Feminine => "fem",
        Masculine => "masc",
        Neuter => "neut",
        MasculineFeminine => "masc/fem",
        MasculineFeminineNeuter => "masc/fem/neut",
    }
);

define_tokens!(
    /// Case tags, including the syncretic nom/voc and nom/voc/acc forms.
    Case {
        Ablative => "abl",
        Accusative => "acc",
        Dative => "dat",
        Genitive => "gen",
        Vocative => "voc",
        Nominative => "nom",
        NominativeVocative => "nom/voc",
        NominativeVocativeAccusative => "nom/voc/acc",
    }
);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct MorphFlags: u32 {
        // Case (Bits 0-5)
        const NOMINATIVE = 1;
        const GENITIVE = 1 << 1;
        const DATIVE = 1 << 2;
        const ACCUSATIVE = 1 << 3;
        const ABLATIVE = 1 << 4;
        const VOCATIVE = 1 << 5;

        // Gender (Bits 6-8)
        const MASCULINE = 1 << 6;
        const FEMININE = 1 << 7;
        const NEUTER = 1 << 8;

        // Number (Bits 9-10)
        const SINGULAR = 1 << 9;
        const PLURAL = 1 << 10;

        // Person (Bits 11-13)
        const FIRST_PERSON = 1 << 11;
        const SECOND_PERSON = 1 << 12;
        const THIRD_PERSON = 1 << 13;

        // Voice (Bits 14-15)
        const ACTIVE = 1 << 14;
        const PASSIVE = 1 << 15;

        // Tense (Bits 16-21)
        const PRESENT = 1 << 16;
        const IMPERFECT = 1 << 17;
        const FUTURE = 1 << 18;
        const PERFECT = 1 << 19;
        const PLUPERFECT = 1 << 20;
        const FUTURE_PERFECT = 1 << 21;

        // Mood (Bits 22-24)
        const INDICATIVE = 1 << 22;
        const SUBJUNCTIVE = 1 << 23;
        const IMPERATIVE = 1 << 24;

        // Record kind (Bits 25-28)
        const FINITE = 1 << 25;
        const PARTICIPLE = 1 << 26;
        const INFINITIVE = 1 << 27;
        const PERIPHRASTIC = 1 << 28;
    }
}

impl Tense {
    pub const fn flags(self) -> MorphFlags {
        match self {
            Tense::Future => MorphFlags::FUTURE,
            Tense::FuturePerfect => MorphFlags::FUTURE_PERFECT,
            Tense::Imperfect => MorphFlags::IMPERFECT,
            Tense::Perfect => MorphFlags::PERFECT,
            Tense::Present => MorphFlags::PRESENT,
            Tense::Pluperfect => MorphFlags::PLUPERFECT,
        }
    }
}

impl Mood {
    pub const fn flags(self) -> MorphFlags {
        match self {
            Mood::Indicative => MorphFlags::INDICATIVE,
            Mood::Imperative => MorphFlags::IMPERATIVE,
            Mood::Subjunctive => MorphFlags::SUBJUNCTIVE,
        }
    }
}

impl Voice {
    pub const fn flags(self) -> MorphFlags {
        match self {
            Voice::Active => MorphFlags::ACTIVE,
            Voice::Passive => MorphFlags::PASSIVE,
        }
    }
}

impl Person {
    pub const fn flags(self) -> MorphFlags {
        match self {
            Person::First => MorphFlags::FIRST_PERSON,
            Person::Second => MorphFlags::SECOND_PERSON,
            Person::Third => MorphFlags::THIRD_PERSON,
        }
    }
}

impl Number {
    pub const fn flags(self) -> MorphFlags {
        match self {
            Number::Plural => MorphFlags::PLURAL,
            Number::Singular => MorphFlags::SINGULAR,
        }
    }
}

impl Gender {
    /// Syncretic tags expand to the union of their genders.
    pub const fn flags(self) -> MorphFlags {
        match self {
            Gender::Feminine => MorphFlags::FEMININE,
            Gender::Masculine => MorphFlags::MASCULINE,
            Gender::Neuter => MorphFlags::NEUTER,
            Gender::MasculineFeminine => MorphFlags::MASCULINE.union(MorphFlags::FEMININE),
            Gender::MasculineFeminineNeuter => MorphFlags::MASCULINE
                .union(MorphFlags::FEMININE)
                .union(MorphFlags::NEUTER),
        }
    }
}

impl Case {
    /// Syncretic tags expand to the union of their cases.
    pub const fn flags(self) -> MorphFlags {
        match self {
            Case::Ablative => MorphFlags::ABLATIVE,
            Case::Accusative => MorphFlags::ACCUSATIVE,
            Case::Dative => MorphFlags::DATIVE,
            Case::Genitive => MorphFlags::GENITIVE,
            Case::Vocative => MorphFlags::VOCATIVE,
            Case::Nominative => MorphFlags::NOMINATIVE,
            Case::NominativeVocative => MorphFlags::NOMINATIVE.union(MorphFlags::VOCATIVE),
            Case::NominativeVocativeAccusative => MorphFlags::NOMINATIVE
                .union(MorphFlags::VOCATIVE)
                .union(MorphFlags::ACCUSATIVE),
        }
    }
}
