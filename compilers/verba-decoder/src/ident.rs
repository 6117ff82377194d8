use nom::{
    bytes::complete::{take_till, take_while1},
    multi::many0,
    sequence::preceded,
    IResult,
};
use verba_protocol::{Ident, IdentifierInfo};

use crate::error::Rejection;

/// Word characters of the dump's identifier field: letters, digits and `_`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_run(input: &str) -> IResult<&str, &str> {
    preceded(take_till(is_word_char), take_while1(is_word_char))(input)
}

/// All maximal word runs, in order.
pub fn word_runs(id_info: &str) -> Vec<&str> {
    match many0(word_run)(id_info) {
        Ok((_, runs)) => runs,
        Err(_) => Vec::new(),
    }
}

/// Runs 0-2 are required; run 3 is the optional homograph id and anything
/// after it is ignored.
pub fn parse_identifiers(id_info: &str) -> Result<IdentifierInfo, Rejection> {
    let runs = word_runs(id_info);
    let [headword_id, pos_id, parse_id, rest @ ..] = runs.as_slice() else {
        return Err(Rejection::MalformedUnit("fewer than three identifier runs"));
    };

    Ok(IdentifierInfo {
        headword_id: Ident::from_run(headword_id),
        pos_id: Ident::from_run(pos_id),
        parse_id: Ident::from_run(parse_id),
        homograph_id: rest.first().map(|run| Ident::from_run(run)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_without_homograph() {
        let ids = parse_identifiers("1 2 3").unwrap();
        assert_eq!(ids.headword_id, Ident::Number(1));
        assert_eq!(ids.pos_id, Ident::Number(2));
        assert_eq!(ids.parse_id, Ident::Number(3));
        assert_eq!(ids.homograph_id, None);
    }

    #[test]
    fn test_perseus_parse_key() {
        let ids = parse_identifiers("1206629 9 ab-e_o_#1").unwrap();
        assert_eq!(ids.headword_id, Ident::Number(1206629));
        assert_eq!(ids.parse_id, Ident::Word("ab".to_string()));
        assert_eq!(ids.homograph_id, Some(Ident::Word("e_o_".to_string())));
    }

    #[test]
    fn test_runs_skip_punctuation() {
        assert_eq!(word_runs("  a-b,,c_d  7 "), vec!["a", "b", "c_d", "7"]);
        assert!(word_runs("--").is_empty());
    }

    #[test]
    fn test_too_few_runs() {
        assert_eq!(
            parse_identifiers("12 9"),
            Err(Rejection::MalformedUnit("fewer than three identifier runs"))
        );
        assert!(parse_identifiers("").is_err());
    }
}
