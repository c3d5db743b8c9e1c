//! Parser for the record-oriented text `rac` prints for list commands.
//!
//! ```text
//! cluster : 1619820a-d36f-4b1b-9c2e-53d23e5f5d2c
//! host    : srv1
//! port    : 1541
//!
//! cluster : 7e4c8d1a-...
//! ```
//!
//! Records are separated by blank lines; each line is `key : value`.

use indexmap::IndexMap;

/// One block of `key: value` lines.
///
/// Keys keep the position of their first occurrence; a repeated key
/// overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Value for `key`, or an empty string when the key is absent
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Split `text` into records.
///
/// Lines without a colon are skipped, a final record without a closing blank
/// line is still returned, and empty input gives an empty vector.
pub fn parse(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            current.insert(key.trim(), value.trim());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}
