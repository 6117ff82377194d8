use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, trace};
use verba_protocol::{FeatureRecord, IdentifierInfo};

use crate::classify::{categorize, classify_tokens, Category};
use crate::error::{DecodeError, Rejection};
use crate::extract::LexiconLine;
use crate::fields::AnalysisUnit;
use crate::ident::parse_identifiers;
use crate::index::{DecodeStats, InflectionIndex};

/// Everything recovered from a single accepted analysis unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedUnit<'a> {
    pub ids: IdentifierInfo,
    pub gloss: &'a str,
    pub record: FeatureRecord,
}

/// Decodes one `{ids<TAB>gloss<TAB>code}` unit.
pub fn decode_unit(unit: &str) -> Result<DecodedUnit<'_>, Rejection> {
    let fields = AnalysisUnit::tokenize(unit)?;
    let ids = parse_identifiers(fields.id_info)?;
    let tokens = fields.tokens();
    let record = classify_tokens(&tokens).ok_or_else(|| {
        let category = tokens.first().map_or(Category::Unknown, |lead| categorize(lead));
        Rejection::UnrecognizedGrammarPath(category)
    })?;

    Ok(DecodedUnit {
        ids,
        gloss: fields.gloss,
        record,
    })
}

/// Decodes every unit of a line, skipping rejected units.
pub fn decode_line<'a>(
    line: &'a str,
    stats: &mut DecodeStats,
) -> Result<(&'a str, Vec<FeatureRecord>), Rejection> {
    let line = LexiconLine::split(line)?;
    let mut records = Vec::new();

    for unit in line.units() {
        stats.units += 1;
        match decode_unit(unit) {
            Ok(decoded) => {
                stats.records += 1;
                records.push(decoded.record);
            }
            Err(rejection) => {
                trace!(headword = line.headword, unit, %rejection, "dropped analysis unit");
                stats.reject(&rejection);
            }
        }
    }

    Ok((line.headword, records))
}

/// Result of a decode run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub index: InflectionIndex,
    pub stats: DecodeStats,
    /// Set when the abort flag stopped the run early. The index still holds
    /// every line decoded before that point.
    pub aborted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    abort: Option<Arc<AtomicBool>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checked between lines; setting it stops the decode after the
    /// current line.
    pub fn with_abort(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    fn is_aborted(&self) -> bool {
        self.abort
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Streams lines from `reader`. Bytes that are not UTF-8 are replaced
    /// rather than rejected; only a failing read aborts with an error.
    pub fn decode<R: BufRead>(&self, mut reader: R) -> Result<Decoded, DecodeError> {
        let mut decoded = Decoded::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            if self.is_aborted() {
                decoded.aborted = true;
                break;
            }

            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            absorb_line(trim_line_end(&line), line_no, &mut decoded.index, &mut decoded.stats);
        }

        log_summary(&decoded);
        Ok(decoded)
    }

    pub fn decode_str(&self, input: &str) -> Decoded {
        let mut decoded = Decoded::default();

        for (idx, line) in input.lines().enumerate() {
            if self.is_aborted() {
                decoded.aborted = true;
                break;
            }
            absorb_line(line, idx + 1, &mut decoded.index, &mut decoded.stats);
        }

        log_summary(&decoded);
        decoded
    }

    /// Decodes lines on the current rayon pool.
    ///
    /// Records carry their line number until the final merge, so each
    /// headword's list comes out in input order, identical to
    /// [`Decoder::decode_str`]. Lines not yet started when the abort flag is
    /// seen are skipped.
    pub fn decode_parallel(&self, input: &str) -> Decoded {
        let lines: Vec<&str> = input.lines().collect();
        let abort = self.abort.as_deref();

        let shard = lines
            .par_iter()
            .enumerate()
            .fold(Shard::default, |mut shard, (idx, line)| {
                if abort.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                    shard.aborted = true;
                } else {
                    shard.absorb(line, idx + 1);
                }
                shard
            })
            .reduce(Shard::default, Shard::merge);

        let decoded = shard.finish();
        log_summary(&decoded);
        decoded
    }
}

/// Decodes a whole stream with no abort flag.
pub fn decode<R: BufRead>(reader: R) -> Result<InflectionIndex, DecodeError> {
    Decoder::new().decode(reader).map(|decoded| decoded.index)
}

pub fn decode_str(input: &str) -> InflectionIndex {
    Decoder::new().decode_str(input).index
}

fn trim_line_end(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Per-line bookkeeping for every decode path. Returns the accepted
/// records so the parallel path can key them itself.
fn decode_counted<'a>(
    line: &'a str,
    line_no: usize,
    stats: &mut DecodeStats,
) -> Option<(&'a str, Vec<FeatureRecord>)> {
    if line.trim().is_empty() {
        stats.blank_lines += 1;
        return None;
    }

    stats.lines += 1;
    match decode_line(line, stats) {
        Ok(decoded) => Some(decoded),
        Err(rejection) => {
            debug!(line_no, %rejection, "skipped lexicon line");
            stats.reject(&rejection);
            None
        }
    }
}

fn absorb_line(line: &str, line_no: usize, index: &mut InflectionIndex, stats: &mut DecodeStats) {
    if let Some((headword, records)) = decode_counted(line, line_no, stats) {
        index.append(headword, records);
    }
}

fn log_summary(decoded: &Decoded) {
    let stats = &decoded.stats;
    info!(
        lines = stats.lines,
        units = stats.units,
        records = stats.records,
        headwords = decoded.index.len(),
        malformed_lines = stats.malformed_lines,
        malformed_units = stats.malformed_units,
        unrecognized_units = stats.unrecognized_units,
        aborted = decoded.aborted,
        "decoded lexicon"
    );
}

/// Partial result of one rayon fold.
#[derive(Default)]
struct Shard {
    entries: BTreeMap<String, Vec<(usize, FeatureRecord)>>,
    stats: DecodeStats,
    aborted: bool,
}

impl Shard {
    fn absorb(&mut self, line: &str, line_no: usize) {
        if let Some((headword, records)) = decode_counted(line, line_no, &mut self.stats) {
            if records.is_empty() {
                return;
            }
            self.entries
                .entry(headword.to_string())
                .or_default()
                .extend(records.into_iter().map(|record| (line_no, record)));
        }
    }

    fn merge(mut self, other: Shard) -> Shard {
        for (headword, records) in other.entries {
            self.entries.entry(headword).or_default().extend(records);
        }
        self.stats.merge(&other.stats);
        self.aborted |= other.aborted;
        self
    }

    fn finish(self) -> Decoded {
        let entries = self
            .entries
            .into_iter()
            .map(|(headword, mut keyed)| {
                // Stable, so units of one line keep their order
                keyed.sort_by_key(|(line_no, _)| *line_no);
                (headword, keyed.into_iter().map(|(_, record)| record).collect())
            })
            .collect();

        Decoded {
            index: InflectionIndex::from_entries(entries),
            stats: self.stats,
            aborted: self.aborted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use proptest::prelude::*;
    use verba_protocol::{Case, Gender, Ident, Mood, Number, Person, Tense, Voice};

    const AMO: &str = "amo\t{1 2 3\tto love\tpres ind act 1st sg}";

    fn amo_record() -> FeatureRecord {
        FeatureRecord::FiniteVerb {
            tense: Tense::Present,
            mood: Mood::Indicative,
            voice: Voice::Active,
            person: Person::First,
            number: Number::Singular,
        }
    }

    fn sample_lexicon() -> String {
        [
            AMO,
            "amantis\t{4 9 amo_#1\tloving\tpres part masc/fem/neut gen sg}{4 9 amo_#1\tloving\tgerundive}",
            "broken line without tab",
            "",
            "amo\t{1 2 3\tto love\tpres inf act}{1 2\tno parse id\tpres inf pass}",
            "ferunt\t{7 9 fero\tto carry\tpres act 3rd pl}",
            "laudandum\t{8 9 laudo\tto praise\tgerundive}",
            "amatus\t{1 9 3\tloved\tperf part pass masc nom}{1 9 3\tloved\tperf part pass masc nom sg}",
        ]
        .join("\n")
    }

    #[test]
    fn test_single_finite_verb_line() {
        let index = decode_str(AMO);
        assert_eq!(index.get("amo"), Some(&[amo_record()][..]));
    }

    #[test]
    fn test_decode_unit_keeps_ids_and_gloss() {
        let decoded = decode_unit("{1 2 3 4\tto love\tpres ind act 1st sg}").unwrap();
        assert_eq!(decoded.gloss, "to love");
        assert_eq!(decoded.ids.homograph_id, Some(Ident::Number(4)));
        assert_eq!(decoded.record, amo_record());

        assert_eq!(
            decode_unit("{1 2 3\tmisc\tgerundive}"),
            Err(Rejection::UnrecognizedGrammarPath(Category::Nominal))
        );
    }

    #[test]
    fn test_dropped_only_unit_leaves_no_entry() {
        let decoded = Decoder::new().decode_str("headword\t{1 2 3\tgloss\tgerundive}");
        assert!(decoded.index.is_empty());
        assert!(!decoded.index.contains("headword"));
        assert_eq!(decoded.stats.unrecognized_units, 1);
        assert_eq!(decoded.stats.records, 0);
    }

    #[test]
    fn test_repeated_headword_accumulates() {
        let input = format!("{}\n{}", AMO, "amo\t{1 2 3\tto love\tpres inf act}");
        let index = decode_str(&input);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("amo"),
            Some(&[amo_record(), FeatureRecord::Infinitive { tense: Tense::Present, voice: Voice::Active }][..])
        );
    }

    #[test]
    fn test_sample_lexicon() {
        let decoded = Decoder::new().decode_str(&sample_lexicon());
        let index = &decoded.index;

        assert_eq!(index.headwords().collect::<Vec<_>>(), vec!["amantis", "amatus", "amo", "ferunt"]);
        assert_eq!(
            index.get("amantis"),
            Some(&[FeatureRecord::Participle {
                tense: Tense::Present,
                voice: Voice::Active,
                gender: Some(Gender::MasculineFeminineNeuter),
                case: Case::Genitive,
                number: Some(Number::Singular),
            }][..])
        );
        assert_eq!(index.get("amo").map(<[_]>::len), Some(2));
        assert_eq!(index.get("amatus").map(<[_]>::len), Some(2));
        assert!(!index.contains("laudandum"));

        assert_eq!(
            decoded.stats,
            DecodeStats {
                lines: 7,
                blank_lines: 1,
                malformed_lines: 1,
                units: 9,
                malformed_units: 1,
                unrecognized_units: 2,
                records: 6,
            }
        );
        assert!(!decoded.aborted);
    }

    #[test]
    fn test_reader_matches_str_and_handles_crlf() {
        let text = sample_lexicon().replace('\n', "\r\n");
        let from_reader = Decoder::new().decode(text.as_bytes()).unwrap();
        let from_str = Decoder::new().decode_str(&sample_lexicon());
        assert_eq!(from_reader, from_str);
    }

    #[test]
    fn test_invalid_utf8_in_gloss_is_tolerated() {
        let mut bytes = b"amo\t{1 2 3\tto l".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"ve\tpres ind act 1st sg}\n");
        let index = decode(&bytes[..]).unwrap();
        assert_eq!(index.get("amo"), Some(&[amo_record()][..]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = format!("{}\n", sample_lexicon()).repeat(25);
        let sequential = Decoder::new().decode_str(&input);
        let parallel = Decoder::new().decode_parallel(&input);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_abort_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let decoder = Decoder::new().with_abort(flag);

        let decoded = decoder.decode(sample_lexicon().as_bytes()).unwrap();
        assert!(decoded.aborted);
        assert!(decoded.index.is_empty());

        let decoded = decoder.decode_parallel(&sample_lexicon());
        assert!(decoded.aborted);
        assert!(decoded.index.is_empty());
    }

    /// Sets the abort flag once the first line has been handed out.
    struct AbortAfterFirstLine {
        inner: io::Cursor<Vec<u8>>,
        flag: Arc<AtomicBool>,
    }

    impl Read for AbortAfterFirstLine {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl BufRead for AbortAfterFirstLine {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            self.inner.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.inner.consume(amt);
            self.flag.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_abort_keeps_partial_index() {
        let flag = Arc::new(AtomicBool::new(false));
        let reader = AbortAfterFirstLine {
            inner: io::Cursor::new(sample_lexicon().into_bytes()),
            flag: Arc::clone(&flag),
        };

        let decoded = Decoder::new().with_abort(flag).decode(reader).unwrap();
        assert!(decoded.aborted);
        assert_eq!(decoded.stats.lines, 1);
        assert_eq!(decoded.index.get("amo"), Some(&[amo_record()][..]));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_io_failure_is_fatal() {
        let err = decode(io::BufReader::new(FailingReader)).unwrap_err();
        match err {
            DecodeError::Io(inner) => assert_eq!(inner.to_string(), "disk on fire"),
        }
    }

    proptest! {
        #[test]
        fn test_decode_is_deterministic(lines in prop::collection::vec(
            (
                "[a-z]{1,6}",
                prop::sample::select(vec![
                    "pres ind act 1st sg",
                    "perf part pass fem abl",
                    "pres part neut gen pl",
                    "fut inf pass",
                    "imperf pass 2nd sg",
                    "gerundive",
                    "masc nom sg",
                    "pres part act",
                ]),
            ),
            0..40,
        )) {
            let input = lines
                .iter()
                .map(|(headword, code)| format!("{}\t{{1 2 3\tgloss\t{}}}", headword, code))
                .collect::<Vec<_>>()
                .join("\n");

            let first = Decoder::new().decode_str(&input);
            let second = Decoder::new().decode_str(&input);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&Decoder::new().decode_parallel(&input), &first);
        }
    }
}
