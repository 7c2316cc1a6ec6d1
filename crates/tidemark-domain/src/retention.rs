//! Retention policy module
//!
//! Maps every snapshot in an inventory to a [`Tier`] and a keep/delete
//! [`Verdict`] for one evaluation instant. The result depends only on the
//! inventory and `now`, so the same inputs always yield the same decisions.
//!
//! Rules, applied per snapshot with `age = now - created_at`:
//!
//! | Age                                  | Tier    | Verdict                      |
//! |--------------------------------------|---------|------------------------------|
//! | `age <= hourly_window`               | Hourly  | Retain                       |
//! | `hourly_window < age <= daily_window`| Daily   | Retain earliest of its day   |
//! | `age > daily_window`                 | Expired | Delete                       |
//!
//! Within the Daily tier, snapshots are grouped by UTC calendar date. Each
//! group keeps the snapshot with the smallest `created_at`; identical
//! instants fall back to the smallest identifier.

use crate::{Snapshot, SnapshotId, Tier};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Default width of the Hourly window, in hours
pub const DEFAULT_HOURLY_WINDOW_HOURS: i64 = 24;

/// Default outer edge of the Daily window, in days
pub const DEFAULT_DAILY_WINDOW_DAYS: i64 = 14;

/// Tier boundaries for one classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    hourly_window: TimeDelta,
    daily_window: TimeDelta,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            hourly_window: TimeDelta::hours(DEFAULT_HOURLY_WINDOW_HOURS),
            daily_window: TimeDelta::days(DEFAULT_DAILY_WINDOW_DAYS),
        }
    }
}

impl RetentionPolicy {
    /// Create a policy from explicit windows
    ///
    /// The hourly window must be positive and the daily window must not be
    /// shorter than it. Equal windows leave the Daily tier empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::TimeDelta;
    /// use tidemark_domain::RetentionPolicy;
    ///
    /// let policy = RetentionPolicy::new(TimeDelta::hours(12), TimeDelta::days(7)).unwrap();
    /// assert_eq!(policy.daily_window(), TimeDelta::days(7));
    ///
    /// assert!(RetentionPolicy::new(TimeDelta::days(2), TimeDelta::days(1)).is_err());
    /// ```
    pub fn new(hourly_window: TimeDelta, daily_window: TimeDelta) -> Result<Self, String> {
        if hourly_window <= TimeDelta::zero() {
            return Err(format!(
                "hourly window must be positive, got {}",
                hourly_window
            ));
        }
        if daily_window < hourly_window {
            return Err(format!(
                "daily window ({}) must not be shorter than hourly window ({})",
                daily_window, hourly_window
            ));
        }
        Ok(Self {
            hourly_window,
            daily_window,
        })
    }

    /// Upper edge of the Hourly tier (inclusive)
    pub fn hourly_window(&self) -> TimeDelta {
        self.hourly_window
    }

    /// Upper edge of the Daily tier (inclusive)
    pub fn daily_window(&self) -> TimeDelta {
        self.daily_window
    }

    /// Tier for a snapshot of the given age
    ///
    /// Negative ages (mtime in the future) land in the Hourly tier.
    pub fn tier_for(&self, age: TimeDelta) -> Tier {
        if age <= self.hourly_window {
            Tier::Hourly
        } else if age <= self.daily_window {
            Tier::Daily
        } else {
            Tier::Expired
        }
    }
}

/// Why a snapshot was selected for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteReason {
    /// Older than the daily window
    Expired,

    /// Another Daily snapshot from the same UTC day was kept
    SupersededSameDay {
        /// The shared day bucket
        day: NaiveDate,
        /// The snapshot that won the day
        kept: SnapshotId,
    },
}

impl std::fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteReason::Expired => f.write_str("expired"),
            DeleteReason::SupersededSameDay { day, kept } => {
                write!(f, "superseded by {} on {}", kept, day)
            }
        }
    }
}

/// Keep/delete outcome for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Keep the snapshot
    Retain,
    /// Remove the snapshot
    Delete(DeleteReason),
}

impl Verdict {
    /// Whether this verdict keeps the snapshot
    pub fn is_retain(&self) -> bool {
        matches!(self, Verdict::Retain)
    }
}

/// Classification of a single snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The snapshot being judged
    pub snapshot: Snapshot,
    /// Age at the evaluation instant
    pub age: TimeDelta,
    /// Tier at the evaluation instant
    pub tier: Tier,
    /// Final verdict after same-day dedup
    pub verdict: Verdict,
}

/// Result of classifying a whole inventory
///
/// Holds exactly one [`Decision`] per input snapshot, ordered by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Evaluation instant shared by every decision
    pub now: DateTime<Utc>,
    decisions: Vec<Decision>,
}

impl Classification {
    /// All decisions, ordered by identifier
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Decisions that keep their snapshot
    pub fn retained(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| d.verdict.is_retain())
    }

    /// Decisions that remove their snapshot
    pub fn deleted(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| !d.verdict.is_retain())
    }

    /// Identifiers of kept snapshots
    pub fn retain_set(&self) -> BTreeSet<SnapshotId> {
        self.retained().map(|d| d.snapshot.id.clone()).collect()
    }

    /// Identifiers of snapshots to remove
    pub fn delete_set(&self) -> BTreeSet<SnapshotId> {
        self.deleted().map(|d| d.snapshot.id.clone()).collect()
    }

    /// Number of snapshots classified
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Whether the inventory was empty
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Classify an inventory against a single evaluation instant
///
/// Identifiers in `inventory` are expected to be unique (they are file names
/// within one directory). Input order does not matter.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tidemark_domain::{classify, RetentionPolicy, Snapshot};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
/// let inventory = vec![
///     Snapshot::new("a", Utc.with_ymd_and_hms(2024, 1, 13, 8, 0, 0).unwrap(), 0),
///     Snapshot::new("b", Utc.with_ymd_and_hms(2024, 1, 13, 20, 0, 0).unwrap(), 0),
/// ];
///
/// let result = classify(&inventory, now, &RetentionPolicy::default());
/// assert_eq!(result.retain_set().len(), 1);
/// assert_eq!(result.delete_set().len(), 1);
/// ```
pub fn classify(
    inventory: &[Snapshot],
    now: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> Classification {
    let mut decisions: Vec<Decision> = inventory
        .iter()
        .map(|snapshot| {
            let age = snapshot.age(now);
            let tier = policy.tier_for(age);
            let verdict = if tier.is_retained() {
                Verdict::Retain
            } else {
                Verdict::Delete(DeleteReason::Expired)
            };
            Decision {
                snapshot: snapshot.clone(),
                age,
                tier,
                verdict,
            }
        })
        .collect();

    decisions.sort_by(|a, b| a.snapshot.id.cmp(&b.snapshot.id));

    // Group Daily decisions by day; BTreeMap keeps the walk order stable.
    let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (index, decision) in decisions.iter().enumerate() {
        if decision.tier == Tier::Daily {
            by_day
                .entry(decision.snapshot.day_bucket())
                .or_default()
                .push(index);
        }
    }

    for (day, members) in by_day {
        let Some(&winner) = members.iter().min_by(|&&a, &&b| {
            let (a, b) = (&decisions[a].snapshot, &decisions[b].snapshot);
            a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
        }) else {
            continue;
        };

        let kept = decisions[winner].snapshot.id.clone();
        for index in members.into_iter().filter(|&i| i != winner) {
            decisions[index].verdict = Verdict::Delete(DeleteReason::SupersededSameDay {
                day,
                kept: kept.clone(),
            });
        }
    }

    Classification { now, decisions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn snap(id: &str, created_at: DateTime<Utc>) -> Snapshot {
        Snapshot::new(id, created_at, 0)
    }

    fn ids(names: &[&str]) -> BTreeSet<SnapshotId> {
        names.iter().map(|n| SnapshotId::new(*n)).collect()
    }

    #[test]
    fn test_reference_scenario() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory = vec![
            snap("A", at(2024, 1, 13, 8, 0, 0)),
            snap("B", at(2024, 1, 13, 20, 0, 0)),
            snap("C", at(2024, 1, 1, 0, 0, 0)),
            snap("D", at(2024, 1, 15, 11, 0, 0)),
        ];

        let result = classify(&inventory, now, &RetentionPolicy::default());

        assert_eq!(result.retain_set(), ids(&["A", "D"]));
        assert_eq!(result.delete_set(), ids(&["B", "C"]));

        let tiers: Vec<Tier> = result.decisions().iter().map(|d| d.tier).collect();
        assert_eq!(tiers, vec![Tier::Daily, Tier::Daily, Tier::Expired, Tier::Hourly]);

        let b = &result.decisions()[1];
        assert_eq!(
            b.verdict,
            Verdict::Delete(DeleteReason::SupersededSameDay {
                day: NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
                kept: SnapshotId::new("A"),
            })
        );
        assert_eq!(result.decisions()[2].verdict, Verdict::Delete(DeleteReason::Expired));
    }

    #[test]
    fn test_empty_inventory() {
        let result = classify(&[], at(2024, 1, 15, 12, 0, 0), &RetentionPolicy::default());
        assert!(result.is_empty());
        assert!(result.delete_set().is_empty());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let policy = RetentionPolicy::default();

        let exactly_one_day = snap("h", now - TimeDelta::hours(24));
        let just_over_one_day = snap("d", now - TimeDelta::hours(24) - TimeDelta::nanoseconds(1));
        let exactly_fourteen_days = snap("x", now - TimeDelta::days(14));
        let just_over_fourteen = snap("z", now - TimeDelta::days(14) - TimeDelta::seconds(1));

        assert_eq!(policy.tier_for(exactly_one_day.age(now)), Tier::Hourly);
        assert_eq!(policy.tier_for(just_over_one_day.age(now)), Tier::Daily);
        assert_eq!(policy.tier_for(exactly_fourteen_days.age(now)), Tier::Daily);
        assert_eq!(policy.tier_for(just_over_fourteen.age(now)), Tier::Expired);
    }

    #[test]
    fn test_hourly_tier_is_never_deduplicated() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory: Vec<Snapshot> = (0..24)
            .map(|h| snap(&format!("s{:02}", h), now - TimeDelta::hours(h)))
            .collect();

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.retained().count(), 24);
        assert!(result.retained().all(|d| d.tier == Tier::Hourly));
    }

    #[test]
    fn test_identical_mtime_tie_breaks_on_identifier() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let same = at(2024, 1, 12, 6, 30, 0);
        let inventory = vec![snap("b", same), snap("c", same), snap("a", same)];

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.retain_set(), ids(&["a"]));
        assert_eq!(result.delete_set(), ids(&["b", "c"]));
    }

    #[test]
    fn test_earliest_mtime_wins_over_identifier_order() {
        // Names out of step with mtimes (touched files): mtime decides.
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory = vec![
            snap("backup-1", at(2024, 1, 10, 18, 0, 0)),
            snap("backup-2", at(2024, 1, 10, 3, 0, 0)),
        ];

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.retain_set(), ids(&["backup-2"]));
    }

    #[test]
    fn test_day_buckets_use_utc_dates() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory = vec![
            snap("late", at(2024, 1, 10, 23, 59, 59)),
            snap("early", at(2024, 1, 11, 0, 0, 0)),
        ];

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.retain_set(), ids(&["early", "late"]));
    }

    #[test]
    fn test_same_day_split_across_tiers() {
        // 2024-01-14 straddles the 24h edge: the Hourly half is untouched and
        // the Daily half still keeps its own earliest member.
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory = vec![
            snap("d1", at(2024, 1, 14, 1, 0, 0)),
            snap("d2", at(2024, 1, 14, 2, 0, 0)),
            snap("h1", at(2024, 1, 14, 13, 0, 0)),
            snap("h2", at(2024, 1, 14, 14, 0, 0)),
        ];

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.retain_set(), ids(&["d1", "h1", "h2"]));
        assert_eq!(result.delete_set(), ids(&["d2"]));
    }

    #[test]
    fn test_future_mtime_is_hourly() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let inventory = vec![snap("skewed", at(2024, 2, 1, 0, 0, 0))];

        let result = classify(&inventory, now, &RetentionPolicy::default());
        assert_eq!(result.decisions()[0].tier, Tier::Hourly);
        assert!(result.decisions()[0].verdict.is_retain());
    }

    #[test]
    fn test_custom_windows() {
        let now = at(2024, 1, 15, 12, 0, 0);
        let policy = RetentionPolicy::new(TimeDelta::hours(6), TimeDelta::days(3)).unwrap();
        let inventory = vec![
            snap("fresh", now - TimeDelta::hours(5)),
            snap("daily", now - TimeDelta::hours(30)),
            snap("old", now - TimeDelta::days(4)),
        ];

        let result = classify(&inventory, now, &policy);
        assert_eq!(result.retain_set(), ids(&["daily", "fresh"]));
        assert_eq!(result.delete_set(), ids(&["old"]));
    }

    #[test]
    fn test_equal_windows_leave_no_daily_tier() {
        let policy = RetentionPolicy::new(TimeDelta::days(1), TimeDelta::days(1)).unwrap();
        assert_eq!(policy.tier_for(TimeDelta::days(1)), Tier::Hourly);
        assert_eq!(
            policy.tier_for(TimeDelta::days(1) + TimeDelta::seconds(1)),
            Tier::Expired
        );
    }

    #[test]
    fn test_policy_validation() {
        assert!(RetentionPolicy::new(TimeDelta::zero(), TimeDelta::days(14)).is_err());
        assert!(RetentionPolicy::new(TimeDelta::hours(-1), TimeDelta::days(14)).is_err());
        assert!(RetentionPolicy::new(TimeDelta::days(15), TimeDelta::days(14)).is_err());
    }

    #[test]
    fn test_delete_reason_display() {
        let reason = DeleteReason::SupersededSameDay {
            day: NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
            kept: SnapshotId::new("A"),
        };
        assert_eq!(reason.to_string(), "superseded by A on 2024-01-13");
        assert_eq!(DeleteReason::Expired.to_string(), "expired");
    }
}
