use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::Metadata;
use crate::types::SourceId;

/// Caller-facing filters; every present field must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    /// Case-insensitive substring of the stored authors field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl RetrievalFilters {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.author.is_none() && self.doc_type.is_none()
    }
}

/// Predicate handed to the vector index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexFilter {
    YearEq(i64),
    TypeEq(String),
    SourceIn(BTreeSet<SourceId>),
    And(Vec<IndexFilter>),
}

impl IndexFilter {
    pub fn matches(&self, source_id: &SourceId, metadata: &Metadata) -> bool {
        match self {
            IndexFilter::YearEq(year) => metadata.year() == Some(*year),
            IndexFilter::TypeEq(doc_type) => metadata.doc_type() == Some(doc_type.as_str()),
            IndexFilter::SourceIn(sources) => sources.contains(source_id),
            IndexFilter::And(all) => all.iter().all(|f| f.matches(source_id, metadata)),
        }
    }
}

/// Outcome of resolving [`RetrievalFilters`] against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPlan {
    Unfiltered,
    Filtered(IndexFilter),
    /// The author filter matched no source; the query must return nothing.
    NoMatch,
}

impl FilterPlan {
    /// One condition is passed bare, several are combined with `And`.
    pub fn from_conditions(mut conditions: Vec<IndexFilter>) -> Self {
        match conditions.len() {
            0 => FilterPlan::Unfiltered,
            1 => FilterPlan::Filtered(conditions.remove(0)),
            _ => FilterPlan::Filtered(IndexFilter::And(conditions)),
        }
    }
}

/// Sources whose authors field contains `author`, ignoring case.
pub fn sources_by_author<'a, I>(metadata: I, author: &str) -> BTreeSet<SourceId>
where
    I: IntoIterator<Item = &'a (SourceId, Metadata)>,
{
    let needle = author.to_lowercase();
    metadata
        .into_iter()
        .filter(|(_, meta)| meta.authors().to_lowercase().contains(&needle))
        .map(|(source_id, _)| source_id.clone())
        .collect()
}
