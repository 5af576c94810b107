//! Blocklist filtering of entities before any network call.
//!
//! The compiled state is rebuilt lazily: each option is compared against the
//! raw string it was last compiled from, and only a changed option is
//! recompiled. An empty option disables that part of the filter.

use crate::error::{LookupError, Result};
use regex::{Regex, RegexBuilder};
use sharescope_core::{Entity, IntegrationOptions};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct CompiledBlocklists {
    raw_values: String,
    values: HashSet<String>,
    raw_domain_regex: String,
    domain_regex: Option<Regex>,
    raw_ip_regex: String,
    ip_regex: Option<Regex>,
    rebuilds: usize,
}

impl CompiledBlocklists {
    fn refresh(&mut self, options: &IntegrationOptions) -> Result<()> {
        if options.blocklist != self.raw_values {
            self.values = options
                .blocklist
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            self.raw_values.clone_from(&options.blocklist);
            self.rebuilds += 1;
            tracing::debug!(entries = self.values.len(), "updated entity blocklist");
        }

        if options.domain_blocklist_regex != self.raw_domain_regex {
            self.domain_regex = compile(&options.domain_blocklist_regex, "domainBlocklistRegex")?;
            self.raw_domain_regex
                .clone_from(&options.domain_blocklist_regex);
            self.rebuilds += 1;
            tracing::debug!(
                domain_blocklist_regex = %options.domain_blocklist_regex,
                "updated domain blocklist regex"
            );
        }

        if options.ip_blocklist_regex != self.raw_ip_regex {
            self.ip_regex = compile(&options.ip_blocklist_regex, "ipBlocklistRegex")?;
            self.raw_ip_regex.clone_from(&options.ip_blocklist_regex);
            self.rebuilds += 1;
            tracing::debug!(
                ip_blocklist_regex = %options.ip_blocklist_regex,
                "updated IP blocklist regex"
            );
        }

        Ok(())
    }

    fn should_skip(&self, entity: &Entity) -> bool {
        if self.values.contains(&entity.value) {
            tracing::debug!(value = %entity.value, "blocked blocklisted entity lookup");
            return true;
        }

        if entity.is_ipv4 && !entity.is_private_ip {
            if let Some(regex) = &self.ip_regex {
                if regex.is_match(&entity.value) {
                    tracing::debug!(ip = %entity.value, "blocked blocklisted IP lookup");
                    return true;
                }
            }
        }

        if entity.is_domain {
            if let Some(regex) = &self.domain_regex {
                if regex.is_match(&entity.value) {
                    tracing::debug!(domain = %entity.value, "blocked blocklisted domain lookup");
                    return true;
                }
            }
        }

        false
    }
}

/// Decides which entities are never looked up.
#[derive(Debug, Default)]
pub struct BlocklistFilter {
    state: Mutex<CompiledBlocklists>,
}

impl BlocklistFilter {
    /// Create a filter that blocks nothing until refreshed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the compiled state in line with `options`.
    ///
    /// A regex that fails to compile leaves the previous state for that
    /// option in place, so the next refresh tries it again.
    pub fn refresh(&self, options: &IntegrationOptions) -> Result<()> {
        self.lock().refresh(options)
    }

    /// Whether `entity` must be skipped under the current state.
    ///
    /// Blocked when the literal value is listed, when it is a public IPv4
    /// address matching the IP regex, or when it is a domain matching the
    /// domain regex.
    pub fn should_skip(&self, entity: &Entity) -> bool {
        self.lock().should_skip(entity)
    }

    /// Refresh from `options` and keep the entities that are not blocked.
    ///
    /// The refresh and every decision happen under one lock, so a concurrent
    /// call with other blocklists cannot change the outcome for this batch.
    pub fn retain_allowed<'a>(
        &self,
        options: &IntegrationOptions,
        entities: &'a [Entity],
    ) -> Result<Vec<&'a Entity>> {
        let mut state = self.lock();
        state.refresh(options)?;
        Ok(entities
            .iter()
            .filter(|entity| !state.should_skip(entity))
            .collect())
    }

    /// How many times any part of the state has been rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.lock().rebuilds
    }

    fn lock(&self) -> MutexGuard<'_, CompiledBlocklists> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn compile(pattern: &str, field: &'static str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|source| LookupError::InvalidPattern { field, source })
}
