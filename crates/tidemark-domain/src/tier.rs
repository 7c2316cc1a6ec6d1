//! Tier module - retention buckets for snapshots

/// Retention tier of a snapshot at one evaluation instant
///
/// Tiers are derived from age and never stored:
/// - Hourly: within the hourly window, always kept
/// - Daily: within the daily window, one kept per UTC day
/// - Expired: beyond the daily window, always deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Tier {
    /// Recent snapshots (default: last 24 hours)
    Hourly,

    /// Day-deduplicated snapshots (default: 1 to 14 days old)
    Daily,

    /// Past every retention window
    Expired,
}

impl Tier {
    /// All tiers, youngest first
    pub const ALL: [Tier; 3] = [Tier::Hourly, Tier::Daily, Tier::Expired];

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Expired => "expired",
        }
    }

    /// Whether snapshots in this tier can survive a cycle at all
    pub fn is_retained(&self) -> bool {
        !matches!(self, Tier::Expired)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
