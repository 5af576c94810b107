//! Inbound contract: `startup`, `validate_options`, `do_lookup`.

use crate::error::{LookupFailure, Result};
use crate::executor::QueryExecutor;
use crate::orchestrator::{LookupOrchestrator, LookupResult};
use crate::transport::build_http_client;
use sharescope_auth::Authenticator;
use sharescope_core::{Entity, IntegrationOptions, RequestConfig, ValidationError};
use std::sync::Arc;

/// A started integration: shared transport, token cache and blocklist state.
pub struct Integration {
    orchestrator: LookupOrchestrator,
}

impl Integration {
    /// Build the shared transport and the lookup pipeline.
    ///
    /// Must be called once before any lookup.
    pub fn startup(request: &RequestConfig) -> Result<Self> {
        let http = build_http_client(request)?;
        Ok(Self::with_authenticator(
            http.clone(),
            Authenticator::new(http),
        ))
    }

    /// Build the pipeline around an explicit authenticator.
    #[must_use]
    pub fn with_authenticator(http: reqwest::Client, authenticator: Authenticator) -> Self {
        Self::from_orchestrator(LookupOrchestrator::new(
            Arc::new(authenticator),
            Arc::new(QueryExecutor::new(http)),
        ))
    }

    /// Wrap an already assembled orchestrator.
    #[must_use]
    pub fn from_orchestrator(orchestrator: LookupOrchestrator) -> Self {
        tracing::info!("integration started");
        Self { orchestrator }
    }

    /// Field-level validation of `options`.
    #[must_use]
    pub fn validate_options(options: &IntegrationOptions) -> Vec<ValidationError> {
        sharescope_core::validate_options(options)
    }

    /// Look up `entities`, flattening any failure into a [`LookupFailure`].
    pub async fn do_lookup(
        &self,
        entities: &[Entity],
        options: &IntegrationOptions,
    ) -> std::result::Result<Vec<LookupResult>, LookupFailure> {
        tracing::trace!(entities = entities.len(), options = ?options, "starting lookup");

        self.orchestrator
            .do_lookup(entities, options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "lookup failed");
                LookupFailure::from(e)
            })
    }
}
