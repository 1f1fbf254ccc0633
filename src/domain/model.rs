use chrono::NaiveDate;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// The indices maintained by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Banco Nación "tasa activa", rebuilt daily from the published T.N.A.
    Activa,
    /// BCRA "Coeficiente de Estabilización de Referencia".
    Cer,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Activa, IndexKind::Cer];

    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Activa => "activa",
            IndexKind::Cer => "cer",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Date -> value mapping. Keys are unique and iterate in ascending order,
/// which is also the persisted order.
///
/// Deserialization only accepts canonical `YYYY-MM-DD` keys and rejects a date
/// that appears twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexSeries {
    entries: BTreeMap<NaiveDate, f64>,
}

impl IndexSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.entries.get(date).copied()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.entries.contains_key(date)
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.entries
            .last_key_value()
            .map(|(date, value)| (*date, *value))
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.last_key_value().map(|(date, _)| *date)
    }

    /// Adds an entry only when the date is new. Returns whether it was added;
    /// existing history is never overwritten.
    pub fn insert_if_absent(&mut self, date: NaiveDate, value: f64) -> bool {
        if self.entries.contains_key(&date) {
            return false;
        }
        self.entries.insert(date, value);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.entries.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.entries.keys()
    }
}

impl FromIterator<(NaiveDate, f64)> for IndexSeries {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, f64)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for IndexSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SeriesVisitor)
    }
}

struct SeriesVisitor;

impl<'de> Visitor<'de> for SeriesVisitor {
    type Value = IndexSeries;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of \"YYYY-MM-DD\": number pairs")
    }

    fn visit_map<A>(self, mut map: A) -> Result<IndexSeries, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, f64>()? {
            let date = parse_date_key(&key)
                .ok_or_else(|| de::Error::custom(format!("invalid date key {:?}", key)))?;
            if entries.insert(date, value).is_some() {
                return Err(de::Error::custom(format!("duplicate date key {:?}", key)));
            }
        }
        Ok(IndexSeries { entries })
    }
}

/// Parses `key` only if it is already in canonical form; chrono alone would
/// also take `2025-1-5` or a leading space.
fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_KEY_FORMAT).to_string() == key)
}

/// What an extractor read from a source page.
///
/// For Activa `rate` is a daily compounding rate expressed as a fraction
/// (`0.0012` = 0.12% per day). For CER it is the index value itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateObservation {
    pub effective_date: NaiveDate,
    pub rate: f64,
}

/// Result of merging an observation into a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    Changed { inserted: Vec<NaiveDate> },
}

impl UpdateOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, UpdateOutcome::Changed { .. })
    }

    pub fn inserted(&self) -> &[NaiveDate] {
        match self {
            UpdateOutcome::Unchanged => &[],
            UpdateOutcome::Changed { inserted } => inserted,
        }
    }
}

/// A content update for the remote repository.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Repository-relative path, e.g. `indices/activa.json`.
    pub path: String,
    pub content: Vec<u8>,
    pub repo: String,
    pub branch: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Version token the update was based on; `None` when the file was created.
    pub previous_sha: Option<String>,
    pub new_sha: Option<String>,
}

/// What one index update did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub index: IndexKind,
    pub observation: RateObservation,
    pub outcome: UpdateOutcome,
    pub entries: usize,
    pub receipt: Option<PublishReceipt>,
}
