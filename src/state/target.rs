/// Target descriptors: the unit of work fetched by the crawler
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// HTTP method a target is requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    /// Lowercase name used in reports and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }

    /// Parses a form `method` attribute
    ///
    /// Matching is case-insensitive. A missing or empty attribute means
    /// `post`; values other than `get` and `post` return `None`.
    pub fn from_form_attr(attr: Option<&str>) -> Option<Self> {
        let attr = attr.map(str::trim).unwrap_or_default();
        if attr.is_empty() {
            return Some(Self::Post);
        }
        match attr.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One crawlable unit plus the measurements taken for it
///
/// Created by the link extractor (or as the seed), filled in by the fetcher,
/// and written to the result sink exactly once. Every instance owns its own
/// payload map.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Absolute URL with query and fragment removed
    pub url: Url,

    /// Request method
    pub method: Method,

    /// Form field name → sampled value (empty for links)
    pub payload: BTreeMap<String, String>,

    /// Elapsed time of the first fetch
    pub first_load: Duration,

    /// Elapsed time of the second fetch
    pub second_load: Duration,

    /// `Cache-Control` header from the second response
    pub cache_control: Option<String>,

    /// `Expires` header from the second response
    pub expires: Option<String>,

    /// `ETag` header from the second response
    pub etag: Option<String>,

    /// `Last-Modified` header from the second response
    pub last_modified: Option<String>,
}

impl Target {
    /// Creates an unmeasured target with an empty payload
    pub fn new(url: Url, method: Method) -> Self {
        Self {
            url,
            method,
            payload: BTreeMap::new(),
            first_load: Duration::ZERO,
            second_load: Duration::ZERO,
            cache_control: None,
            expires: None,
            etag: None,
            last_modified: None,
        }
    }

    /// The seed target of a crawl: `GET` of the host root
    pub fn seed(root: &Url) -> Self {
        Self::new(root.clone(), Method::Get)
    }

    /// Attaches a form payload
    pub fn with_payload(mut self, payload: BTreeMap<String, String>) -> Self {
        self.payload = payload;
        self
    }

    /// The `(url, method)` pair used by the visited set
    pub fn dedup_key(&self) -> (String, Method) {
        (self.url.as_str().to_string(), self.method)
    }
}
