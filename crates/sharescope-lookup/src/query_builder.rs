//! Search query construction.
//!
//! The backend expects the whole query wrapped in single quotes. A subsite
//! scope prepends `path:<site>`; exact-match mode wraps the term in double
//! quotes.

use sharescope_core::{Entity, IntegrationOptions};
use url::Url;

/// Build the `querytext` value for one entity.
#[must_use]
pub fn build_query(entity: &Entity, options: &IntegrationOptions) -> String {
    let term = if options.direct_search {
        format!("\"{}\"", entity.value)
    } else {
        entity.value.clone()
    };

    match resolve_site_path(options.host_trimmed(), &options.subsite) {
        Some(site) => format!("'path:{site} {term}'"),
        None => format!("'{term}'"),
    }
}

/// Resolve a subsite option to a percent-encoded absolute site URL.
///
/// Accepts an absolute URL, a path on `host`, or a bare site name. Returns
/// `None` when no subsite is configured.
#[must_use]
pub fn resolve_site_path(host: &str, subsite: &str) -> Option<String> {
    let site = subsite.trim();
    let site = site.strip_suffix('/').unwrap_or(site);
    if site.is_empty() {
        return None;
    }

    let absolute = if is_absolute_url(site) {
        site.to_string()
    } else if site.starts_with('/') {
        format!("{host}{site}")
    } else {
        format!("{host}/{site}")
    };

    Some(urlencoding::encode(&absolute).into_owned())
}

fn is_absolute_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
