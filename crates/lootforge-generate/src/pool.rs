//! Level-partitioned pool of known effects.
//!
//! Entries are kept sorted by level, so the cumulative pool for a level is
//! always a prefix of the entry list. Prefix lengths are precomputed for
//! every level up to the plan's cache bound.

use std::collections::BTreeSet;

use lootforge_core::{EffectRecord, RecordId};
use tracing::debug;

/// Dedup key of a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnchantmentKey {
    pub level: u16,
    pub amount: u16,
    pub effect: RecordId,
}

/// Effect record usable by items at `level` and above.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEnchantment {
    pub level: u16,
    pub amount: u16,
    pub effect: EffectRecord,
}

#[derive(Debug, Clone, Default)]
pub struct EffectPool {
    entries: Vec<ResolvedEnchantment>,
    cumulative: Vec<usize>,
    levels: Vec<u16>,
    unresolved: usize,
}

impl EffectPool {
    /// Build the pool from raw keys, dropping keys whose effect cannot be
    /// resolved.
    pub fn build<I, F>(keys: I, mut resolve: F, max_cached_level: u16) -> Self
    where
        I: IntoIterator<Item = EnchantmentKey>,
        F: FnMut(RecordId) -> Option<EffectRecord>,
    {
        let distinct: BTreeSet<EnchantmentKey> = keys.into_iter().collect();
        let mut entries = Vec::with_capacity(distinct.len());
        let mut unresolved = 0;

        for key in distinct {
            match resolve(key.effect) {
                Some(effect) => entries.push(ResolvedEnchantment {
                    level: key.level,
                    amount: key.amount,
                    effect,
                }),
                None => {
                    debug!(effect = %key.effect, level = key.level, "dropping unresolved effect");
                    unresolved += 1;
                }
            }
        }

        let mut levels: Vec<u16> = entries.iter().map(|entry| entry.level).collect();
        levels.dedup();

        let cumulative = (0..=max_cached_level)
            .map(|level| entries.partition_point(|entry| entry.level <= level))
            .collect();

        Self {
            entries,
            cumulative,
            levels,
            unresolved,
        }
    }

    /// Every entry whose level is at most `level`.
    pub fn by_level(&self, level: u16) -> &[ResolvedEnchantment] {
        let end = match self.cumulative.get(usize::from(level)) {
            Some(end) => *end,
            None => self.entries.partition_point(|entry| entry.level <= level),
        };
        &self.entries[..end]
    }

    pub fn entries(&self) -> &[ResolvedEnchantment] {
        &self.entries
    }

    /// Distinct levels present in the pool, ascending.
    pub fn levels(&self) -> &[u16] {
        &self.levels
    }

    /// Keys dropped because their effect id did not resolve.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(id: u32) -> EffectRecord {
        EffectRecord {
            id: RecordId(id),
            editor_id: Some(format!("Ench{id}")),
            name: Some(format!("Effect {id}")),
            effects: Vec::new(),
            worn_restrictions: None,
        }
    }

    fn key(level: u16, amount: u16, effect: u32) -> EnchantmentKey {
        EnchantmentKey {
            level,
            amount,
            effect: RecordId(effect),
        }
    }

    #[test]
    fn identical_keys_collapse() {
        let pool = EffectPool::build(
            vec![key(1, 100, 7), key(1, 100, 7), key(1, 200, 7)],
            |id| Some(effect(id.0)),
            99,
        );
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn unresolved_effects_are_dropped() {
        let pool = EffectPool::build(
            vec![key(1, 0, 7), key(3, 0, 8)],
            |id| (id.0 == 7).then(|| effect(7)),
            99,
        );
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.unresolved(), 1);
    }

    #[test]
    fn cumulative_pools_include_lower_levels() {
        let pool = EffectPool::build(
            vec![key(10, 0, 1), key(1, 0, 2), key(5, 0, 3)],
            |id| Some(effect(id.0)),
            99,
        );
        assert_eq!(pool.levels(), &[1, 5, 10]);
        assert!(pool.by_level(0).is_empty());
        assert_eq!(pool.by_level(1).len(), 1);
        assert_eq!(pool.by_level(7).len(), 2);
        assert_eq!(pool.by_level(99).len(), 3);
    }

    #[test]
    fn levels_above_cache_bound_still_resolve() {
        let pool = EffectPool::build(
            vec![key(1, 0, 1), key(120, 0, 2), key(150, 0, 3)],
            |id| Some(effect(id.0)),
            99,
        );
        assert_eq!(pool.by_level(99).len(), 1);
        assert_eq!(pool.by_level(130).len(), 2);
        assert_eq!(pool.by_level(u16::MAX).len(), 3);
    }
}
