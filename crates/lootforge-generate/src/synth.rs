use lootforge_core::{EffectRecord, Item, ItemKind, Record, RecordId, WorldModel};
use lootforge_plan::RarityTier;
use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::analyzer::ResolvedListItem;
use crate::errors::GenerationError;
use crate::naming::NameDeriver;
use crate::pool::{EffectPool, ResolvedEnchantment};

/// Composite item created by one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedItem {
    pub item: RecordId,
    pub effect: RecordId,
    pub name: String,
    /// The item name came from the name deriver instead of the catalog.
    pub derived_name: bool,
}

/// Combines random effects from the pool into new composite items.
pub struct ItemSynthesizer<'a> {
    pool: &'a EffectPool,
    names: NameDeriver,
    prefix: String,
}

impl<'a> ItemSynthesizer<'a> {
    pub fn new(pool: &'a EffectPool, names: NameDeriver, editor_id_prefix: &str, kind: ItemKind) -> Self {
        Self {
            pool,
            names,
            prefix: format!("{editor_id_prefix}_{}", kind.as_str().to_uppercase()),
        }
    }

    pub fn names(&self) -> &NameDeriver {
        &self.names
    }

    /// Draw `tier.effect_count` distinct effects for the source's level and
    /// insert one new effect record and one new item into `world`.
    pub fn synthesize<W, R>(
        &mut self,
        world: &mut W,
        rng: &mut R,
        source: &ResolvedListItem,
        tier: &RarityTier,
    ) -> Result<SynthesizedItem, GenerationError>
    where
        W: WorldModel,
        R: Rng + ?Sized,
    {
        let drawn = self.draw(rng, source.entry.level, tier)?;
        let primary = &drawn[0].effect;
        let primary_name = primary.name.clone().unwrap_or_default();

        let effect_id = world.allocate_id()?;
        let mut effect = primary.copy_as(effect_id);
        effect.editor_id = Some(format!(
            "{}_ENCH_{}",
            self.prefix,
            primary.editor_id.as_deref().unwrap_or_default()
        ));
        effect.name = Some(prefixed(&tier.name, &primary_name));
        effect.effects = drawn
            .iter()
            .flat_map(|entry| entry.effect.effects.iter().cloned())
            .collect();
        world.add_new::<EffectRecord>(effect)?;

        let (item_name, derived_name) = match source.item.name.as_deref() {
            Some(name) if !name.is_empty() => (name.to_string(), false),
            _ => (self.names.derive(source.item.editor_id.as_deref()), true),
        };

        let item_id = world.allocate_id()?;
        let mut item = source.item.copy_as(item_id);
        item.editor_id = Some(format!(
            "{}_{}",
            self.prefix,
            source.item.editor_id.as_deref().unwrap_or_default()
        ));
        item.object_effect = Some(effect_id);
        let name = format!("{} {item_name} of {primary_name}", tier.name);
        item.name = Some(name.clone());
        world.add_new::<Item>(item)?;

        Ok(SynthesizedItem {
            item: item_id,
            effect: effect_id,
            name,
            derived_name,
        })
    }

    /// Distinct pool entries in random order; the first one is the primary.
    fn draw<R>(
        &self,
        rng: &mut R,
        level: u16,
        tier: &RarityTier,
    ) -> Result<Vec<&'a ResolvedEnchantment>, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let available = self.pool.by_level(level);
        if available.is_empty() {
            return Err(GenerationError::NoEffectsAvailable { level });
        }

        let required = (tier.effect_count as usize).max(1);
        if available.len() < required {
            return Err(GenerationError::InsufficientEffectPool {
                level,
                available: available.len(),
                required,
            });
        }

        let mut drawn: Vec<&ResolvedEnchantment> = index::sample(rng, available.len(), required)
            .into_iter()
            .map(|idx| &available[idx])
            .collect();
        drawn.shuffle(rng);
        Ok(drawn)
    }
}

fn prefixed(tier: &str, name: &str) -> String {
    if name.is_empty() {
        tier.to_string()
    } else {
        format!("{tier} {name}")
    }
}
