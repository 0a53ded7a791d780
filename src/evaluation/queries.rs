use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::EvaluationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Direct,
    Synthesis,
    EdgeCase,
}

/// One entry of the fixed evaluation query set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalQuery {
    pub id: String,
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub query: String,
    /// Empty means the corpus holds no valid evidence for this query.
    #[serde(default)]
    pub expected_sources: Vec<String>,
}

/// Reads a JSON array of queries, keeping file order.
pub fn load_query_set(path: &Path) -> Result<Vec<EvalQuery>, EvaluationError> {
    let f = std::fs::File::open(path)?;
    let queries: Vec<EvalQuery> = serde_json::from_reader(f)?;

    let mut seen = BTreeSet::new();
    for query in &queries {
        if !seen.insert(query.id.as_str()) {
            return Err(EvaluationError::DuplicateQueryId(query.id.clone()));
        }
    }

    Ok(queries)
}
