use std::collections::btree_map::{self, BTreeMap};

use verba_protocol::{FeatureRecord, IndexEntry, IndexSnapshot, SNAPSHOT_VERSION};

use crate::error::Rejection;

/// Headword → decoded analyses, in input order per headword.
///
/// Only the decoder appends; callers receive the finished index by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InflectionIndex {
    entries: BTreeMap<String, Vec<FeatureRecord>>,
}

impl InflectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repeated headwords accumulate. An empty batch creates no entry.
    pub(crate) fn append(&mut self, headword: &str, records: Vec<FeatureRecord>) {
        if records.is_empty() {
            return;
        }
        match self.entries.get_mut(headword) {
            Some(existing) => existing.extend(records),
            None => {
                self.entries.insert(headword.to_string(), records);
            }
        }
    }

    pub(crate) fn from_entries(entries: BTreeMap<String, Vec<FeatureRecord>>) -> Self {
        Self { entries }
    }

    pub fn get(&self, headword: &str) -> Option<&[FeatureRecord]> {
        self.entries.get(headword).map(Vec::as_slice)
    }

    pub fn contains(&self, headword: &str) -> bool {
        self.entries.contains_key(headword)
    }

    /// Number of distinct headwords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.entries.iter() }
    }

    pub fn to_snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            version: SNAPSHOT_VERSION,
            entries: self
                .iter()
                .map(|(headword, records)| IndexEntry {
                    headword: headword.to_string(),
                    records: records.to_vec(),
                })
                .collect(),
        }
    }
}

impl From<InflectionIndex> for IndexSnapshot {
    fn from(index: InflectionIndex) -> Self {
        IndexSnapshot {
            version: SNAPSHOT_VERSION,
            entries: index
                .entries
                .into_iter()
                .map(|(headword, records)| IndexEntry { headword, records })
                .collect(),
        }
    }
}

pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Vec<FeatureRecord>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [FeatureRecord]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(headword, records)| (headword.as_str(), records.as_slice()))
    }
}

impl<'a> IntoIterator for &'a InflectionIndex {
    type Item = (&'a str, &'a [FeatureRecord]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Counters kept while decoding. Merging is field-wise addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub lines: usize,
    pub blank_lines: usize,
    pub malformed_lines: usize,
    pub units: usize,
    pub malformed_units: usize,
    pub unrecognized_units: usize,
    pub records: usize,
}

impl DecodeStats {
    pub fn merge(&mut self, other: &DecodeStats) {
        self.lines += other.lines;
        self.blank_lines += other.blank_lines;
        self.malformed_lines += other.malformed_lines;
        self.units += other.units;
        self.malformed_units += other.malformed_units;
        self.unrecognized_units += other.unrecognized_units;
        self.records += other.records;
    }

    pub(crate) fn reject(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::MalformedLine(_) => self.malformed_lines += 1,
            Rejection::MalformedUnit(_) => self.malformed_units += 1,
            Rejection::UnrecognizedGrammarPath(_) => self.unrecognized_units += 1,
        }
    }
}
