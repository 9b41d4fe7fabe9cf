use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes a crawlable target may use
pub const ACCEPTED_SCHEMES: &[&str] = &["https", "http"];

/// Returns true if the URL uses an accepted scheme
pub fn has_accepted_scheme(url: &Url) -> bool {
    ACCEPTED_SCHEMES.contains(&url.scheme())
}

/// Normalizes a command-line host into the crawl root URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `https://` when the input has no `http`/`https` scheme
/// 3. Parse; reject if malformed or without a host
/// 4. Reset path to `/` and drop query and fragment
///
/// # Examples
///
/// ```
/// use cache_probe::url::normalize_host;
///
/// let root = normalize_host("example.com").unwrap();
/// assert_eq!(root.as_str(), "https://example.com/");
///
/// let root = normalize_host("http://example.com/some/page?x=1").unwrap();
/// assert_eq!(root.as_str(), "http://example.com/");
/// ```
pub fn normalize_host(host: &str) -> UrlResult<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(UrlError::Parse("empty host".to_string()));
    }

    let mut url = match Url::parse(host) {
        Ok(url) if has_accepted_scheme(&url) => url,
        _ => Url::parse(&format!("https://{}", host))
            .map_err(|e| UrlError::Parse(format!("{}: {}", host, e)))?,
    };

    if !has_accepted_scheme(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Resolves a raw `href`/`action` value into a dedup-ready URL
///
/// Absolute-path links (`/a/b`) are joined to the crawl root; anything else
/// must already be an absolute URL. The query string and fragment are
/// removed, so `/a?x=1` and `/a?y=2` resolve to the same URL.
///
/// Returns `None` for empty input and for values that are neither
/// absolute-path nor absolute URLs.
pub fn resolve_candidate(root: &Url, candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let mut url = if candidate.starts_with('/') {
        root.join(candidate).ok()?
    } else {
        Url::parse(candidate).ok()?
    };

    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}
