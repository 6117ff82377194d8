//! Grammar-code classifier.
//!
//! A code is a space-separated tag sequence such as `pres part act masc nom sg`.
//! The leading tag selects a category; only tense-led codes can decode, and
//! each verb branch walks the remaining slots against a closed tag set. Any
//! missing or unexpected tag rejects the whole code, so a record is never
//! built from a partial match. Slots past the last one a branch reads are
//! ignored.

use core::fmt;

use verba_protocol::{Case, FeatureRecord, Gender, Mood, Number, Person, Tense, Voice};

/// Number assumed for voiced participles whose code stops after the case
/// (a handful of `-iens` participles are listed this way).
pub const MISSING_PARTICIPLE_NUMBER: Number = Number::Singular;

/// Voice assumed when a participle code skips the voice slot. The dumps only
/// do this for present active participles.
pub const ELIDED_PARTICIPLE_VOICE: Voice = Voice::Active;

const VOICED_PARTICIPLE_GENDERS: &[Gender] = &[Gender::Feminine, Gender::Masculine, Gender::Neuter];

const VOICED_PARTICIPLE_CASES: &[Case] = &[
    Case::Ablative,
    Case::Accusative,
    Case::Dative,
    Case::Genitive,
    Case::Vocative,
    Case::Nominative,
    Case::NominativeVocative,
    Case::NominativeVocativeAccusative,
];

const ELIDED_VOICE_GENDERS: &[Gender] = &[
    Gender::MasculineFeminineNeuter,
    Gender::MasculineFeminine,
    Gender::Neuter,
];

const ELIDED_VOICE_CASES: &[Case] = &[
    Case::Accusative,
    Case::Genitive,
    Case::Ablative,
    Case::Dative,
    Case::NominativeVocativeAccusative,
    Case::NominativeVocative,
];

const BARE_PARTICIPLE_CASES: &[Case] = &[Case::Ablative, Case::Dative, Case::Genitive];

/// What the leading tag of a code says about the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A verb form led by its tense; the only category that can decode.
    Tense(Tense),
    /// Gerundives, supines, indeclinables, adverbials, movable nu.
    Nominal,
    /// Noun and adjective endings led by gender.
    BareInflection,
    /// Codes led by a case, number, comparison or mood tag alone.
    InsufficientContext,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tense(tense) => write!(f, "verb form, tense {}", tense),
            Category::Nominal => f.write_str("nominal or indeclinable form"),
            Category::BareInflection => f.write_str("bare nominal inflection"),
            Category::InsufficientContext => f.write_str("insufficient context"),
            Category::Unknown => f.write_str("unknown leading tag"),
        }
    }
}

pub fn categorize(lead: &str) -> Category {
    if let Some(tense) = Tense::from_token(lead) {
        return Category::Tense(tense);
    }
    match lead {
        "gerundive" | "supine" | "indeclform" | "adverbial" | "nu_movable" => Category::Nominal,
        "fem" | "masc" | "neut" | "masc/fem/neut" | "masc/fem" | "masc/neut" => {
            Category::BareInflection
        }
        "nom" | "abl" | "gen" | "dat" | "nom/acc" | "nom/voc" | "sg" | "comp" | "subj" | "ind" => {
            Category::InsufficientContext
        }
        _ => Category::Unknown,
    }
}

/// Splits a code on single spaces and classifies it.
pub fn classify(code: &str) -> Option<FeatureRecord> {
    let tokens: Vec<&str> = code.split(' ').collect();
    classify_tokens(&tokens)
}

pub fn classify_tokens(pos: &[&str]) -> Option<FeatureRecord> {
    let (lead, rest) = pos.split_first()?;
    match categorize(lead) {
        Category::Tense(tense) => verb_form(tense, rest),
        _ => None,
    }
}

/// Dispatches on the slot after the tense.
fn verb_form(tense: Tense, rest: &[&str]) -> Option<FeatureRecord> {
    let (head, rest) = rest.split_first()?;
    match *head {
        "part" => participle(tense, rest),
        "inf" => infinitive(tense, rest),
        token => {
            if let Some(mood) = Mood::from_token(token) {
                finite_verb(tense, mood, rest)
            } else if let Some(voice) = Voice::from_token(token) {
                periphrastic_verb(tense, voice, rest)
            } else {
                None
            }
        }
    }
}

/// Reads one slot and accepts it only if it parses into `accepted`.
fn accept<T: Copy + PartialEq>(
    slot: Option<&&str>,
    parse: fn(&str) -> Option<T>,
    accepted: &[T],
) -> Option<T> {
    let value = parse(slot?)?;
    accepted.contains(&value).then_some(value)
}

/// `TENSE MOOD | VOICE PERSON NUMBER`
pub fn finite_verb(tense: Tense, mood: Mood, rest: &[&str]) -> Option<FeatureRecord> {
    let voice = accept(rest.first(), Voice::from_token, Voice::ALL)?;
    let person = accept(rest.get(1), Person::from_token, Person::ALL)?;
    let number = accept(rest.get(2), Number::from_token, Number::ALL)?;
    Some(FeatureRecord::FiniteVerb { tense, mood, voice, person, number })
}

/// `TENSE part | ...`, three shapes depending on what fills the voice slot.
pub fn participle(tense: Tense, rest: &[&str]) -> Option<FeatureRecord> {
    let slot = rest.first()?;
    if let Some(voice) = Voice::from_token(slot) {
        voiced_participle(tense, voice, &rest[1..])
    } else if let Some(gender) = accept(Some(slot), Gender::from_token, ELIDED_VOICE_GENDERS) {
        elided_voice_participle(tense, gender, &rest[1..])
    } else {
        bare_case_participle(tense, rest)
    }
}

/// `TENSE part VOICE | GENDER CASE [NUMBER]`
pub fn voiced_participle(tense: Tense, voice: Voice, rest: &[&str]) -> Option<FeatureRecord> {
    let gender = accept(rest.first(), Gender::from_token, VOICED_PARTICIPLE_GENDERS)?;
    let case = accept(rest.get(1), Case::from_token, VOICED_PARTICIPLE_CASES)?;
    let number = match rest.get(2) {
        None => MISSING_PARTICIPLE_NUMBER,
        slot => accept(slot, Number::from_token, Number::ALL)?,
    };
    Some(FeatureRecord::Participle {
        tense,
        voice,
        gender: Some(gender),
        case,
        number: Some(number),
    })
}

/// `TENSE part GENDER | CASE NUMBER`, voice implied.
///
/// The number comes from the slot right after the case and is required;
/// the missing-number default only covers the voiced shape.
pub fn elided_voice_participle(tense: Tense, gender: Gender, rest: &[&str]) -> Option<FeatureRecord> {
    let case = accept(rest.first(), Case::from_token, ELIDED_VOICE_CASES)?;
    let number = accept(rest.get(1), Number::from_token, Number::ALL)?;
    Some(FeatureRecord::Participle {
        tense,
        voice: ELIDED_PARTICIPLE_VOICE,
        gender: Some(gender),
        case,
        number: Some(number),
    })
}

/// `TENSE part | CASE`, voice implied, gender and number unknown.
pub fn bare_case_participle(tense: Tense, rest: &[&str]) -> Option<FeatureRecord> {
    let case = accept(rest.first(), Case::from_token, BARE_PARTICIPLE_CASES)?;
    Some(FeatureRecord::Participle {
        tense,
        voice: ELIDED_PARTICIPLE_VOICE,
        gender: None,
        case,
        number: None,
    })
}

/// `TENSE inf | VOICE`
pub fn infinitive(tense: Tense, rest: &[&str]) -> Option<FeatureRecord> {
    let voice = accept(rest.first(), Voice::from_token, Voice::ALL)?;
    Some(FeatureRecord::Infinitive { tense, voice })
}

/// `TENSE VOICE | PERSON NUMBER`
pub fn periphrastic_verb(tense: Tense, voice: Voice, rest: &[&str]) -> Option<FeatureRecord> {
    let person = accept(rest.first(), Person::from_token, Person::ALL)?;
    let number = accept(rest.get(1), Number::from_token, Number::ALL)?;
    Some(FeatureRecord::PeriphrasticVerb { tense, voice, person, number })
}
