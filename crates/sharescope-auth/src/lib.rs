//! Sharescope Auth - access token acquisition for the search backend.
//!
//! Tokens are obtained with an OAuth2 client-credential flow in one of two
//! modes and cached process-wide for a fixed time-to-live:
//!
//! - **Shared secret**: `client_id@tenant` and the client secret are posted to
//!   the tenant-scoped token endpoint of the configured authentication host.
//! - **Certificate**: a confidential client signs a JWT client assertion with
//!   the configured certificate's private key and requests `{host}/.default`.
//!
//! # Token Cache
//!
//! The cache key is derived from the identifying subset of the options only
//! (hosts, tenant, client, and the secret or certificate identity), so edits
//! to unrelated options such as blocklists never force a new token request.
//!
//! ```text
//! get_auth_token(options)
//!        │
//!        ├── cache hit ─────────────────────────────▶ AccessToken
//!        │
//!        └── miss ─┬─ secret mode ──▶ POST {authHost}/{tenant}/tokens/OAuth/2
//!                  └─ cert mode ────▶ ConfidentialClient (built once)
//!                                         │
//!                      cache for 600s ◀───┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod authenticator;
pub mod cache;
pub mod certificate;
pub mod error;
pub mod keys;
pub mod secret;
pub mod token;

// Re-export commonly used types
pub use authenticator::{Authenticator, DEFAULT_AUTHORITY_HOST, TOKEN_TTL};
pub use cache::{cache_key, TokenCache};
pub use certificate::ConfidentialClient;
pub use error::{AuthError, Result};
pub use token::{AccessToken, TokenSource};
