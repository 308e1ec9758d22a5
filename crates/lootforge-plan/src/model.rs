use lootforge_core::ItemKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Current contract version for plan documents.
pub const PLAN_VERSION: &str = "0.1";

/// Generation plan: everything a run needs besides the catalog itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LootPlan {
    pub plan_version: String,
    /// Seed for the run; each item kind derives its own stream from it.
    pub seed: u64,
    /// Entries in every generated top-level list.
    pub total_budget: u32,
    /// Hard ceiling on composite items generated per item kind.
    pub max_generated: u32,
    /// Highest level with a precomputed cumulative effect pool.
    pub max_cached_level: u16,
    /// Prefix for editor ids of generated records.
    pub editor_id_prefix: String,
    /// Items carrying any of these keywords are never processed.
    pub disallow_keywords: Vec<String>,
    /// Item kinds processed by a run, in order.
    pub kinds: Vec<ItemKind>,
    /// Rarity tiers in declared order.
    pub rarities: Vec<RarityTier>,
    pub naming: NamingRules,
}

impl Default for LootPlan {
    fn default() -> Self {
        Self {
            plan_version: PLAN_VERSION.to_string(),
            seed: 42,
            total_budget: 240,
            max_generated: 100_000,
            max_cached_level: 99,
            editor_id_prefix: "LOOT".to_string(),
            disallow_keywords: vec!["MagicDisallowEnchanting".to_string()],
            kinds: vec![ItemKind::Armor],
            rarities: RarityTier::reference_set(),
            naming: NamingRules::default(),
        }
    }
}

impl LootPlan {
    /// Sum of every tier weight, widened so that no tier set can overflow it.
    pub fn tier_weight_sum(&self) -> u64 {
        self.rarities.iter().map(|tier| u64::from(tier.weight)).sum()
    }

    /// Top-level slots left for the unmodified source item, clamped at zero.
    pub fn remainder_slots(&self) -> u64 {
        u64::from(self.total_budget).saturating_sub(self.tier_weight_sum())
    }

    /// Entries a generated top-level list ends up with.
    pub fn top_level_entries(&self) -> u64 {
        self.tier_weight_sum() + self.remainder_slots()
    }

    /// Parse a TOML plan document. Missing fields take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

/// Named class controlling how many effects compose a synthesized item and
/// how many top-level slots it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RarityTier {
    pub name: String,
    /// Distinct effects merged into one composite item.
    pub effect_count: u32,
    /// Top-level list slots reserved for this tier.
    pub weight: u32,
}

impl RarityTier {
    pub fn new(name: impl Into<String>, effect_count: u32, weight: u32) -> Self {
        Self {
            name: name.into(),
            effect_count,
            weight,
        }
    }

    pub fn reference_set() -> Vec<RarityTier> {
        vec![
            RarityTier::new("Magical", 1, 150),
            RarityTier::new("Rare", 2, 40),
            RarityTier::new("Epic", 3, 15),
            RarityTier::new("Legendary", 4, 2),
        ]
    }
}

/// Rules used to derive display names from editor ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NamingRules {
    /// Structural tokens dropped from editor ids.
    pub stop_tokens: Vec<String>,
    /// Leading token dropped when it is redundant (e.g. `Clothes`).
    pub marker_token: String,
    pub armor_fallback: String,
    pub weapon_fallback: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            stop_tokens: vec!["DLC".to_string(), "Armor".to_string(), "Variant".to_string()],
            marker_token: "Clothes".to_string(),
            armor_fallback: "Armor".to_string(),
            weapon_fallback: "Weapon".to_string(),
        }
    }
}

impl NamingRules {
    /// Name used when an item has neither a display name nor an editor id.
    pub fn fallback_for(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Armor => &self.armor_fallback,
            ItemKind::Weapon => &self.weapon_fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_plan_leaves_33_remainder_slots() {
        let plan = LootPlan::default();
        assert_eq!(plan.tier_weight_sum(), 207);
        assert_eq!(plan.remainder_slots(), 33);
        assert_eq!(plan.top_level_entries(), 240);
    }

    #[test]
    fn remainder_clamps_when_weights_exceed_budget() {
        let plan = LootPlan {
            total_budget: 100,
            rarities: vec![RarityTier::new("Common", 1, 80), RarityTier::new("Rare", 2, 50)],
            ..LootPlan::default()
        };
        assert_eq!(plan.remainder_slots(), 0);
        assert_eq!(plan.top_level_entries(), 130);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let plan = LootPlan::from_toml_str(
            r#"
seed = 7
kinds = ["armor", "weapon"]

[naming]
marker_token = "Robes"
"#,
        )
        .expect("parse plan");
        assert_eq!(plan.seed, 7);
        assert_eq!(plan.kinds, vec![ItemKind::Armor, ItemKind::Weapon]);
        assert_eq!(plan.naming.marker_token, "Robes");
        assert_eq!(plan.naming.stop_tokens.len(), 3);
        assert_eq!(plan.rarities, RarityTier::reference_set());
    }
}
