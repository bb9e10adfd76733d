//! Combo module - group counting and payout tables
//!
//! A combo episode spans every destruction pass between one piece commit
//! and the next spawn. Groups are counted on two parallel counters: strict
//! (only groups that contained an enemy) and permissive (all groups,
//! including all-catalyst ones), because modes weigh enemy-clearing groups
//! differently from freebie catalyst matches.
//!
//! Payouts are table lookups on the *adjusted group count*
//! (`verticals + 2 x horizontals` - horizontal groups are rarer and pay
//! double weight). Past the tabulated range, each further step's delta
//! keeps growing by the difference of the last two tabulated deltas.

/// Running group counts for one side of the strict/permissive split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Combo {
    pub verticals: u32,
    pub horizontals: u32,
    pub enemies: u32,
}

impl Combo {
    /// The payout key: horizontal groups count double.
    pub fn adjusted_group_count(&self) -> u32 {
        self.verticals + 2 * self.horizontals
    }

    pub fn total_groups(&self) -> u32 {
        self.verticals + self.horizontals
    }

    pub fn is_empty(&self) -> bool {
        *self == Combo::default()
    }
}

/// Both counters of one combo episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboInfo {
    /// Groups that destroyed at least one enemy.
    pub strict: Combo,
    /// All groups.
    pub permissive: Combo,
}

impl ComboInfo {
    pub fn is_empty(&self) -> bool {
        self.permissive.is_empty()
    }
}

/// Maps an adjusted group count to a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutTable {
    entries: Vec<u32>,
}

/// Tabulated rewards for adjusted group counts 0..=5.
const REWARD_ENTRIES: [u32; 6] = [0, 100, 300, 700, 1300, 2100];

impl PayoutTable {
    /// Build from explicit entries (index = adjusted group count). At least
    /// two entries are required so a delta exists to extrapolate from, and
    /// the entries must be non-decreasing or the extrapolation deltas have
    /// no meaning.
    pub fn new(entries: Vec<u32>) -> Self {
        assert!(entries.len() >= 2, "payout table needs at least 2 entries");
        assert!(
            entries.windows(2).all(|pair| pair[0] <= pair[1]),
            "payout table entries must be non-decreasing"
        );
        Self { entries }
    }

    /// The built-in combo reward table.
    pub fn reward() -> Self {
        Self::new(REWARD_ENTRIES.to_vec())
    }

    /// Payout for an adjusted group count. Tabulated values verbatim;
    /// beyond the table the last delta keeps growing by the table's final
    /// delta difference (constant growth for short tables).
    pub fn payout(&self, adjusted_count: u32) -> u32 {
        let n = adjusted_count as usize;
        if n < self.entries.len() {
            return self.entries[n];
        }

        let last = self.entries.len() - 1;
        let mut delta = (self.entries[last] - self.entries[last - 1]) as u64;
        let growth = if last >= 2 {
            delta.saturating_sub((self.entries[last - 1] - self.entries[last - 2]) as u64)
        } else {
            0
        };

        let mut value = self.entries[last] as u64;
        for _ in last..n {
            delta += growth;
            value += delta;
        }
        value.min(u32::MAX as u64) as u32
    }
}
