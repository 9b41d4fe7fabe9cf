//! Link validation and admission
//!
//! Every raw link or form action found on a page passes through
//! [`LinkValidator::validate`] before it can join the frontier. The checks run
//! in a fixed order:
//!
//! 1. Resolve against the crawl root and strip query and fragment
//! 2. Reject `(url, method)` pairs already in the visited set
//! 3. Reject URLs outside the root's registrable domain
//! 4. Reject paths ending in a skipped extension
//! 5. Reject non-`http(s)` schemes
//! 6. For forms, sample one payload value per visible input
//! 7. Insert the pair into the visited set and return the target
//!
//! Steps 2 through 7 run under one lock, so two callers racing on the same
//! pair cannot both be admitted.

use crate::payload::PayloadPool;
use crate::state::{Method, Target};
use crate::url::{has_accepted_scheme, registrable_domain, resolve_candidate};
use crate::{CrawlError, UrlError, UrlResult};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// A raw link or form found in a document, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// `<a href="...">`
    Link { href: String },

    /// `<form action="..." method="...">` with its visible input names
    Form {
        action: String,
        method: Option<String>,
        fields: Vec<String>,
    },
}

/// Why a candidate was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Neither an absolute-path link nor an absolute URL
    Unresolvable,

    /// Form method other than `get`/`post`
    UnsupportedMethod,

    /// `(url, method)` was admitted before
    AlreadyVisited,

    /// Registrable domain differs from the crawl root's
    ForeignDomain,

    /// Path ends with a skipped (non-HTML) extension
    SkippedExtension,

    /// Scheme is not `http` or `https`
    UnsupportedScheme,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Unresolvable => "unresolvable",
            Self::UnsupportedMethod => "unsupported method",
            Self::AlreadyVisited => "already visited",
            Self::ForeignDomain => "foreign domain",
            Self::SkippedExtension => "skipped extension",
            Self::UnsupportedScheme => "unsupported scheme",
        };
        f.write_str(reason)
    }
}

/// Result of validating one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(Target),
    Rejected(Rejection),
}

impl Verdict {
    /// Returns the admitted target, if any
    pub fn accepted(self) -> Option<Target> {
        match self {
            Self::Accepted(target) => Some(target),
            Self::Rejected(_) => None,
        }
    }
}

/// Filters candidates and owns the visited set of one crawl run
pub struct LinkValidator {
    root: Url,
    root_domain: String,
    skip_extensions: Vec<String>,
    payloads: Arc<PayloadPool>,
    visited: Mutex<HashSet<(String, Method)>>,
}

impl LinkValidator {
    /// Creates a validator scoped to the registrable domain of `root`
    ///
    /// # Arguments
    ///
    /// * `root` - The crawl root (normalized host URL)
    /// * `skip_extensions` - Path suffixes never admitted (matched case-insensitively)
    /// * `payloads` - Pool used to fill form fields
    pub fn new(
        root: Url,
        skip_extensions: &[String],
        payloads: Arc<PayloadPool>,
    ) -> UrlResult<Self> {
        let root_domain = registrable_domain(&root).ok_or(UrlError::MissingHost)?;

        Ok(Self {
            root,
            root_domain,
            skip_extensions: skip_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            payloads,
            visited: Mutex::new(HashSet::new()),
        })
    }

    /// The crawl root
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Registrable domain every admitted target shares
    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Admits the seed target (`GET` of the root) and returns it
    pub fn admit_seed(&self) -> Result<Target, CrawlError> {
        let seed = Target::seed(&self.root);
        self.lock_visited()?.insert(seed.dedup_key());
        Ok(seed)
    }

    /// Number of pairs admitted so far
    pub fn visited_len(&self) -> usize {
        self.visited.lock().map(|v| v.len()).unwrap_or_default()
    }

    /// Returns true if `(url, method)` has been admitted
    pub fn is_visited(&self, url: &Url, method: Method) -> bool {
        self.visited
            .lock()
            .map(|v| v.contains(&(url.as_str().to_string(), method)))
            .unwrap_or(false)
    }

    /// Validates one candidate, admitting it to the visited set on acceptance
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict::Accepted(target))` - New target for the frontier
    /// * `Ok(Verdict::Rejected(reason))` - Candidate filtered out
    /// * `Err(CrawlError::EmptyPayloadPool)` - A form needs values but the pool is empty
    pub fn validate(&self, candidate: &Candidate) -> Result<Verdict, CrawlError> {
        let (raw, method, fields) = match candidate {
            Candidate::Link { href } => (href.as_str(), Method::Get, &[][..]),
            Candidate::Form {
                action,
                method,
                fields,
            } => match Method::from_form_attr(method.as_deref()) {
                Some(method) => (action.as_str(), method, fields.as_slice()),
                None => return Ok(Verdict::Rejected(Rejection::UnsupportedMethod)),
            },
        };

        let Some(url) = resolve_candidate(&self.root, raw) else {
            return Ok(Verdict::Rejected(Rejection::Unresolvable));
        };

        let key = (url.as_str().to_string(), method);
        let mut visited = self.lock_visited()?;

        if visited.contains(&key) {
            return Ok(Verdict::Rejected(Rejection::AlreadyVisited));
        }
        if registrable_domain(&url).as_deref() != Some(self.root_domain.as_str()) {
            return Ok(Verdict::Rejected(Rejection::ForeignDomain));
        }
        if self.has_skipped_extension(&url) {
            return Ok(Verdict::Rejected(Rejection::SkippedExtension));
        }
        if !has_accepted_scheme(&url) {
            return Ok(Verdict::Rejected(Rejection::UnsupportedScheme));
        }

        let payload = self.sample_payload(fields, &url)?;

        visited.insert(key);
        Ok(Verdict::Accepted(Target::new(url, method).with_payload(payload)))
    }

    fn has_skipped_extension(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.skip_extensions.iter().any(|ext| path.ends_with(ext))
    }

    fn sample_payload(
        &self,
        fields: &[String],
        url: &Url,
    ) -> Result<BTreeMap<String, String>, CrawlError> {
        let mut rng = rand::thread_rng();
        fields
            .iter()
            .map(|name| {
                self.payloads
                    .sample(&mut rng)
                    .map(|value| (name.clone(), value.to_string()))
                    .ok_or_else(|| CrawlError::EmptyPayloadPool {
                        url: url.to_string(),
                    })
            })
            .collect()
    }

    fn lock_visited(&self) -> Result<MutexGuard<'_, HashSet<(String, Method)>>, CrawlError> {
        self.visited
            .lock()
            .map_err(|_| CrawlError::Poisoned("visited set"))
    }
}
