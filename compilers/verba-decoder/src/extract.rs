use nom::{
    bytes::complete::{take_till, take_until},
    character::complete::char,
    combinator::recognize,
    multi::many0,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::Rejection;

/// A raw lexicon line split into its headword and analysis blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconLine<'a> {
    pub headword: &'a str,
    pub analyses_blob: &'a str,
}

impl<'a> LexiconLine<'a> {
    /// Splits on the first tab. The headword is taken verbatim.
    pub fn split(line: &'a str) -> Result<Self, Rejection> {
        let (headword, analyses_blob) = line
            .split_once('\t')
            .ok_or(Rejection::MalformedLine("no tab after headword"))?;

        if headword.is_empty() {
            return Err(Rejection::MalformedLine("empty headword"));
        }

        Ok(Self { headword, analyses_blob })
    }

    pub fn units(&self) -> Vec<&'a str> {
        extract_units(self.analyses_blob)
    }
}

/// `{` up to the first following `}`, braces included. Leading noise is skipped.
fn analysis_unit(input: &str) -> IResult<&str, &str> {
    preceded(
        take_till(|c| c == '{'),
        recognize(tuple((char('{'), take_until("}"), char('}')))),
    )(input)
}

/// Returns every brace-delimited unit in the blob, in order of appearance.
/// An unterminated trailing `{` is ignored.
pub fn extract_units(blob: &str) -> Vec<&str> {
    match many0(analysis_unit)(blob) {
        Ok((_, units)) => units,
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line() {
        let line = LexiconLine::split("amo\t{1 2 3\tto love\tpres ind act 1st sg}").unwrap();
        assert_eq!(line.headword, "amo");
        assert_eq!(line.units(), vec!["{1 2 3\tto love\tpres ind act 1st sg}"]);

        assert_eq!(
            LexiconLine::split("amo {1 2 3}"),
            Err(Rejection::MalformedLine("no tab after headword"))
        );
        assert_eq!(
            LexiconLine::split("\t{1 2 3}"),
            Err(Rejection::MalformedLine("empty headword"))
        );
    }

    #[test]
    fn test_concatenated_units_keep_order() {
        let blob = "{a\tb\tpres inf act}{c\td\tperf inf pass}";
        assert_eq!(
            extract_units(blob),
            vec!["{a\tb\tpres inf act}", "{c\td\tperf inf pass}"]
        );
    }

    #[test]
    fn test_text_between_units_is_ignored() {
        assert_eq!(extract_units("x {one} y {two} z"), vec!["{one}", "{two}"]);
    }

    #[test]
    fn test_no_matching_pair() {
        assert!(extract_units("").is_empty());
        assert!(extract_units("no braces here").is_empty());
        assert!(extract_units("}{").is_empty());
        assert_eq!(extract_units("{closed}{open"), vec!["{closed}"]);
    }

    #[test]
    fn test_units_do_not_nest() {
        // The first closing brace ends the unit
        assert_eq!(extract_units("{a{b}c}"), vec!["{a{b}"]);
    }
}
