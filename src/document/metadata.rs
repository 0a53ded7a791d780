use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TITLE_KEY: &str = "title";
pub const YEAR_KEY: &str = "year";
pub const TYPE_KEY: &str = "type";
pub const AUTHORS_KEY: &str = "authors";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Number(i64),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            MetadataValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            MetadataValue::Number(n) => Some(*n),
            MetadataValue::String(_) => None,
        }
    }
}

/// Document metadata attached to every stored chunk at storage time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    inner: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata {
            inner: BTreeMap::new(),
        }
    }

    /// Builds the metadata the ingestion step stores for a paper.
    pub fn for_paper<A, S>(title: impl Into<String>, year: i64, doc_type: impl Into<String>, authors: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut meta = Metadata::new();
        meta.insert_string(TITLE_KEY, title);
        meta.insert_number(YEAR_KEY, year);
        meta.insert_string(TYPE_KEY, doc_type);
        let joined = authors
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        meta.insert_string(AUTHORS_KEY, joined);
        meta
    }

    pub fn insert_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), MetadataValue::String(value.into()));
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: i64) {
        self.inner.insert(key.into(), MetadataValue::Number(value));
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.inner.get(key)
    }

    pub fn title(&self) -> &str {
        self.get(TITLE_KEY).and_then(MetadataValue::as_str).unwrap_or("")
    }

    pub fn year(&self) -> Option<i64> {
        self.get(YEAR_KEY).and_then(MetadataValue::as_number)
    }

    pub fn doc_type(&self) -> Option<&str> {
        self.get(TYPE_KEY).and_then(MetadataValue::as_str)
    }

    /// Authors as stored: one string, names joined with `", "`.
    pub fn authors(&self) -> &str {
        self.get(AUTHORS_KEY).and_then(MetadataValue::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.inner.iter()
    }
}
