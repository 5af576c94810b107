//! Sharescope Lookup - entity enrichment against a document search backend.
//!
//! This crate turns a batch of entities into per-entity search results:
//!
//! 1. [`BlocklistFilter`] drops entities the operator never wants looked up.
//! 2. A single bearer token is obtained through a [`TokenSource`].
//! 3. Each surviving entity becomes one query ([`build_query`]) executed by a
//!    [`SearchBackend`] with throttling-aware retries ([`QueryExecutor`]).
//! 4. Rows are flattened and decorated for display ([`normalize`]).
//!
//! [`LookupOrchestrator`] runs at most ten queries at a time and fails the
//! whole batch on the first error. [`Integration`] wraps it with the shared
//! HTTP transport and the caller-safe error shape.
//!
//! [`TokenSource`]: sharescope_auth::TokenSource

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod executor;
pub mod filter;
pub mod integration;
pub mod normalizer;
pub mod orchestrator;
pub mod query_builder;
pub mod response;
pub mod transport;

pub use error::{ErrorSummary, LookupError, LookupFailure, Result};
pub use executor::{QueryExecutor, RetryPolicy, SearchBackend, ROW_LIMIT};
pub use filter::BlocklistFilter;
pub use integration::Integration;
pub use normalizer::{human_readable_size, normalize, NormalizedRecord, MAX_RECORDS};
pub use orchestrator::{LookupData, LookupOrchestrator, LookupResult, MAX_CONCURRENT_LOOKUPS};
pub use query_builder::{build_query, resolve_site_path};
pub use response::SearchResponse;
pub use transport::build_http_client;
