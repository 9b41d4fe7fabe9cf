/// Crawl run lifecycle
///
/// One coordinator instance moves through these phases exactly once:
/// `Seeded → Draining → Done`. There is no way back to `Seeded`.
use std::fmt;

/// Phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Frontier holds only the host root
    Seeded,

    /// Probes are being issued and their links fed back
    Draining,

    /// Frontier is empty and no probe is in flight
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Seeded, Self::Draining) | (Self::Draining, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
