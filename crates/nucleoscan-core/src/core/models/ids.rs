use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, externally assigned 1-based ordinal of a residue.
///
/// Legacy indices drive every deterministic iteration and tie-break in the engine,
/// and are independent of where a residue happens to be stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LegacyIndex(usize);

impl LegacyIndex {
    /// Creates a legacy index, returning `None` for zero (indices are 1-based).
    pub fn new(value: usize) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(slot + 1)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Zero-based position in a contiguous legacy-index-keyed arena.
    #[inline]
    pub fn slot(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for LegacyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-independent key of a residue pair; the lower legacy index always comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: LegacyIndex,
    high: LegacyIndex,
}

impl PairKey {
    pub fn new(a: LegacyIndex, b: LegacyIndex) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> LegacyIndex {
        self.low
    }

    pub fn high(&self) -> LegacyIndex {
        self.high
    }

    /// Returns the member of the pair that is not `index`, if `index` belongs to it.
    pub fn partner_of(&self, index: LegacyIndex) -> Option<LegacyIndex> {
        if index == self.low {
            Some(self.high)
        } else if index == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: usize) -> LegacyIndex {
        LegacyIndex::new(n).unwrap()
    }

    #[test]
    fn zero_is_not_a_legacy_index() {
        assert!(LegacyIndex::new(0).is_none());
        assert_eq!(idx(3).slot(), 2);
        assert_eq!(LegacyIndex::from_slot(2), idx(3));
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(PairKey::new(idx(7), idx(2)), PairKey::new(idx(2), idx(7)));
        let key = PairKey::new(idx(7), idx(2));
        assert_eq!(key.low(), idx(2));
        assert_eq!(key.high(), idx(7));
    }

    #[test]
    fn partner_of_returns_the_other_member() {
        let key = PairKey::new(idx(4), idx(9));
        assert_eq!(key.partner_of(idx(4)), Some(idx(9)));
        assert_eq!(key.partner_of(idx(9)), Some(idx(4)));
        assert_eq!(key.partner_of(idx(5)), None);
    }
}
