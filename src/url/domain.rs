use url::{Host, Url};

/// Extracts the registrable domain from a URL
///
/// The registrable domain is the public suffix plus one label, computed from
/// the public suffix list rather than by splitting on dots, so
/// `shop.example.co.uk` yields `example.co.uk`. Hosts without a registrable
/// part (IP addresses, `localhost`) yield the host itself so that a crawl of
/// such a host still recognises its own pages.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use cache_probe::url::registrable_domain;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://shop.example.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            let registrable = psl::domain_str(&domain)
                .map(str::to_string)
                .unwrap_or_else(|| domain.clone());
            Some(registrable)
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Returns the label used to name a host's report file
///
/// This is the registrable domain without its public suffix
/// (`sub.example.com` → `example`). IP addresses and single-label hosts fall
/// back to the full host text with `:` replaced so the label is a valid file
/// name on every platform.
pub fn report_label(url: &Url) -> String {
    if let Some(Host::Domain(domain)) = url.host() {
        let domain = domain.trim_end_matches('.').to_lowercase();
        if let (Some(registrable), Some(suffix)) =
            (psl::domain_str(&domain), psl::suffix_str(&domain))
        {
            if let Some(label) = registrable.strip_suffix(suffix) {
                let label = label.trim_end_matches('.');
                if !label.is_empty() {
                    return label.to_string();
                }
            }
        }
        return domain.replace(':', "_");
    }

    url.host_str()
        .unwrap_or("unknown")
        .trim_start_matches('[')
        .trim_end_matches(']')
        .replace(':', "_")
}
