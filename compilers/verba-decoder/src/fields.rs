use crate::error::Rejection;

/// One analysis unit split into its three tab-delimited fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisUnit<'a> {
    pub id_info: &'a str,
    pub gloss: &'a str,
    /// The grammar code with its closing delimiter removed.
    pub code: &'a str,
}

impl<'a> AnalysisUnit<'a> {
    /// Splits on the first two tabs; anything after the second tab belongs
    /// to the code tail.
    pub fn tokenize(unit: &'a str) -> Result<Self, Rejection> {
        let mut parts = unit.splitn(3, '\t');
        let (Some(first), Some(gloss), Some(tail)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Rejection::MalformedUnit("fewer than three fields"));
        };

        Ok(Self {
            id_info: first.strip_prefix('{').unwrap_or(first),
            gloss,
            code: strip_last_char(tail),
        })
    }

    /// The code split on single spaces. Always yields at least one token.
    pub fn tokens(&self) -> Vec<&'a str> {
        self.code.split(' ').collect()
    }
}

fn strip_last_char(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
