//! Batch lookups with bounded parallelism.

use crate::error::Result;
use crate::executor::SearchBackend;
use crate::filter::BlocklistFilter;
use crate::normalizer::{normalize, NormalizedRecord};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sharescope_auth::{AccessToken, TokenSource};
use sharescope_core::{Entity, IntegrationOptions};
use std::sync::Arc;

/// Queries in flight at once per lookup call.
pub const MAX_CONCURRENT_LOOKUPS: usize = 10;

/// Records named in a result summary before the overflow tag.
const SUMMARY_TAGS: usize = 3;

/// Outcome for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    /// The entity searched for
    pub entity: Entity,
    /// `None` (serialized as `null`) when nothing matched
    pub data: Option<LookupData>,
}

/// Matches for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupData {
    /// Short tags for the first records, e.g. `Report.pdf`, `+4 more`
    pub summary: Vec<String>,
    /// Normalized records
    pub details: Vec<NormalizedRecord>,
}

/// Runs the filter, token and search steps for a batch of entities.
///
/// Holds the process-wide blocklist state. Token caching lives behind the
/// [`TokenSource`].
pub struct LookupOrchestrator {
    tokens: Arc<dyn TokenSource>,
    backend: Arc<dyn SearchBackend>,
    filter: BlocklistFilter,
    max_concurrent: usize,
}

impl LookupOrchestrator {
    /// Create an orchestrator over a token source and a search backend.
    pub fn new(tokens: Arc<dyn TokenSource>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            tokens,
            backend,
            filter: BlocklistFilter::new(),
            max_concurrent: MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Change the parallelism ceiling (minimum 1).
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// The blocklist filter shared by all calls.
    #[must_use]
    pub fn filter(&self) -> &BlocklistFilter {
        &self.filter
    }

    /// Look up every entity that survives the blocklist.
    ///
    /// Results arrive in completion order, one per surviving entity. The
    /// first failing query fails the whole call and drops the others.
    pub async fn do_lookup(
        &self,
        entities: &[Entity],
        options: &IntegrationOptions,
    ) -> Result<Vec<LookupResult>> {
        let mut options = options.clone();
        options.normalize_subsite();

        let allowed = self.filter.retain_allowed(&options, entities)?;
        let token = self.tokens.get_auth_token(&options).await?;

        let mut pending = FuturesUnordered::new();
        let mut results = Vec::new();

        for entity in allowed {
            pending.push(self.lookup_entity(entity, &token, &options));

            // Respect concurrency limit
            while pending.len() >= self.max_concurrent {
                if let Some(result) = pending.next().await {
                    results.push(result?);
                }
            }
        }

        while let Some(result) = pending.next().await {
            results.push(result?);
        }

        tracing::debug!(
            requested = entities.len(),
            returned = results.len(),
            "lookup complete"
        );
        Ok(results)
    }

    async fn lookup_entity(
        &self,
        entity: &Entity,
        token: &AccessToken,
        options: &IntegrationOptions,
    ) -> Result<LookupResult> {
        let response = self.backend.search(entity, token, options).await?;

        let details = if response.row_count() == 0 {
            Vec::new()
        } else {
            normalize(&response)
        };

        if details.is_empty() {
            tracing::debug!(entity = %entity.value, "no results");
            return Ok(LookupResult {
                entity: entity.clone(),
                data: None,
            });
        }

        tracing::debug!(entity = %entity.value, records = details.len(), "found results");
        Ok(LookupResult {
            entity: entity.clone(),
            data: Some(LookupData {
                summary: summarize(&details),
                details,
            }),
        })
    }
}

/// `Title.FileType` tags for the first records plus a `+N more` overflow tag.
fn summarize(details: &[NormalizedRecord]) -> Vec<String> {
    let mut summary: Vec<String> = details.iter().take(SUMMARY_TAGS).map(tag).collect();
    if details.len() > SUMMARY_TAGS {
        summary.push(format!("+{} more", details.len() - SUMMARY_TAGS));
    }
    summary
}

fn tag(record: &NormalizedRecord) -> String {
    let title = record
        .get("Title")
        .and_then(Value::as_str)
        .unwrap_or("Untitled");

    match record
        .get("FileType")
        .and_then(Value::as_str)
        .filter(|file_type| !file_type.is_empty())
    {
        Some(file_type) => format!("{title}.{file_type}"),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(title: &str, file_type: Option<&str>) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        record.insert("Title".to_string(), json!(title));
        if let Some(file_type) = file_type {
            record.insert("FileType".to_string(), json!(file_type));
        }
        record
    }

    #[test]
    fn test_summary_tags() {
        let details = vec![record("Foo", Some("pdf")), record("Notes", None)];
        assert_eq!(summarize(&details), vec!["Foo.pdf", "Notes"]);
    }

    #[test]
    fn test_summary_overflow() {
        let details: Vec<_> = (0..7)
            .map(|i| record(&format!("doc{i}"), Some("docx")))
            .collect();
        assert_eq!(
            summarize(&details),
            vec!["doc0.docx", "doc1.docx", "doc2.docx", "+4 more"]
        );
    }

    #[test]
    fn test_null_data_serialization() {
        let result = LookupResult {
            entity: Entity::new("8.8.8.8", sharescope_core::EntityType::Ip),
            data: None,
        };
        let json = serde_json::to_value(&result).expect("serialize result");
        assert!(json["data"].is_null());
        assert_eq!(json["entity"]["value"], "8.8.8.8");
    }
}
