use tracing::debug;

use super::diversify::{diversify, OVERSAMPLE_FACTOR};
use super::filter::{sources_by_author, FilterPlan, IndexFilter, RetrievalFilters};
use super::service::{Embedder, VectorIndex};
use super::{RetrievalConfig, RetrievalError};
use crate::types::RetrievedChunk;

/// Query embedding + filtered nearest-neighbour search + per-source cap.
pub struct DiversifiedRetriever<E, V> {
    embedder: E,
    index: V,
    config: RetrievalConfig,
}

impl<E, V> DiversifiedRetriever<E, V>
where
    E: Embedder,
    V: VectorIndex,
{
    pub fn new(embedder: E, index: V, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// [`Self::retrieve_with`] using the configured `top_k` and `max_per_source`.
    pub fn retrieve(&self, query: &str, filters: &RetrievalFilters) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        self.retrieve_with(query, self.config.top_k, self.config.max_per_source, filters)
    }

    /// Fetches `2 * desired_k` candidates and keeps at most `max_per_source`
    /// of them per source, in rank order, up to `desired_k`.
    pub fn retrieve_with(
        &self,
        query: &str,
        desired_k: usize,
        max_per_source: usize,
        filters: &RetrievalFilters,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if desired_k == 0 || max_per_source == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.retrieve_raw(query, desired_k.saturating_mul(OVERSAMPLE_FACTOR), filters)?;
        let candidate_count = candidates.len();
        let selected = diversify(candidates, desired_k, max_per_source);

        debug!(
            candidates = candidate_count,
            accepted = selected.len(),
            desired_k,
            max_per_source,
            "diversified retrieval"
        );

        Ok(selected)
    }

    /// Plain filtered nearest-neighbour search, no diversification.
    pub fn retrieve_raw(
        &self,
        query: &str,
        k: usize,
        filters: &RetrievalFilters,
    ) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let filter = match self.plan_filter(filters)? {
            FilterPlan::NoMatch => return Ok(Vec::new()),
            FilterPlan::Unfiltered => None,
            FilterPlan::Filtered(filter) => Some(filter),
        };

        let vector = self.embed_query(query)?;
        self.index.search(&vector, filter.as_ref(), k)
    }

    fn plan_filter(&self, filters: &RetrievalFilters) -> Result<FilterPlan, RetrievalError> {
        let mut conditions = Vec::new();

        if let Some(year) = filters.year {
            conditions.push(IndexFilter::YearEq(year));
        }
        if let Some(author) = &filters.author {
            let metadata = self.index.scan_metadata()?;
            let sources = sources_by_author(&metadata, author);
            if sources.is_empty() {
                debug!(author = author.as_str(), "author filter matched no source");
                return Ok(FilterPlan::NoMatch);
            }
            debug!(author = author.as_str(), sources = sources.len(), "author filter resolved");
            conditions.push(IndexFilter::SourceIn(sources));
        }
        if let Some(doc_type) = &filters.doc_type {
            conditions.push(IndexFilter::TypeEq(doc_type.clone()));
        }

        Ok(FilterPlan::from_conditions(conditions))
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        let prompted = format!("{}{}", self.config.query_prefix, query);
        let mut vector = self.embedder.embed(&prompted)?;
        if let Some(dim) = self.config.embedding_dim {
            vector.truncate(dim);
        }
        Ok(vector)
    }
}
