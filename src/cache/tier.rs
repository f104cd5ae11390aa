// src/cache/tier.rs

use std::time::Duration;

/// Expiration class assigned to a cached resource, chosen by how often the
/// underlying rows change. Ordered from longest to shortest retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTier {
    /// Near-static reference data.
    Long,
    Standard,
    Fast,
    Blazing,
    /// Per-request filtered listings.
    Instant,
}

impl CacheTier {
    pub const ALL: [CacheTier; 5] = [
        CacheTier::Long,
        CacheTier::Standard,
        CacheTier::Fast,
        CacheTier::Blazing,
        CacheTier::Instant,
    ];

    pub fn ttl(self) -> Duration {
        match self {
            CacheTier::Long => Duration::from_secs(24 * 60 * 60),
            CacheTier::Standard => Duration::from_secs(10 * 60),
            CacheTier::Fast => Duration::from_secs(5 * 60),
            CacheTier::Blazing => Duration::from_secs(3 * 60),
            CacheTier::Instant => Duration::from_secs(60),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CacheTier::Long => "long",
            CacheTier::Standard => "standard",
            CacheTier::Fast => "fast",
            CacheTier::Blazing => "blazing",
            CacheTier::Instant => "instant",
        }
    }
}
