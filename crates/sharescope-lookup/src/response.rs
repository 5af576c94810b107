//! Search endpoint payload (`odata=nometadata` JSON).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `/_api/search/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    /// Main result block; absent on some empty responses
    #[serde(default)]
    pub primary_query_result: Option<PrimaryQueryResult>,
}

/// The primary result block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrimaryQueryResult {
    /// Ranked document results
    #[serde(default)]
    pub relevant_results: RelevantResults,
}

/// Ranked results with their total count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelevantResults {
    /// Rows returned in this page
    #[serde(default)]
    pub row_count: u64,
    /// Result table
    #[serde(default)]
    pub table: Table,
}

/// Result table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    /// Result rows
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// One document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Row {
    /// Managed property cells
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// One managed property of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cell {
    /// Property name, e.g. `Title`
    pub key: String,
    /// Property value; usually a string or null
    #[serde(default)]
    pub value: Value,
}

impl SearchResponse {
    /// Reported row count, zero when the result block is missing.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.primary_query_result
            .as_ref()
            .map_or(0, |result| result.relevant_results.row_count)
    }

    /// Result rows, empty when the result block is missing.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        self.primary_query_result
            .as_ref()
            .map_or(&[][..], |result| result.relevant_results.table.rows.as_slice())
    }
}
