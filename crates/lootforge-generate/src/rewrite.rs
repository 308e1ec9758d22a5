use lootforge_core::{Entry, ItemKind, ListFlag, Record, RecordId, SelectionList, WorldModel};
use lootforge_plan::{LootPlan, MAX_WEIGHT_SUM, RarityTier};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::analyzer::ResolvedListItem;
use crate::errors::GenerationError;
use crate::model::{GenerationIssue, GenerationReport, RewiredSource, TierReport};
use crate::synth::ItemSynthesizer;

/// Composite items a single source item may spawn across all tiers.
pub fn quota_per_source(
    max_generated: u32,
    eligible: usize,
    kind: ItemKind,
) -> Result<u32, GenerationError> {
    if eligible == 0 {
        return Err(GenerationError::NoEligibleItems { kind });
    }
    let eligible = u32::try_from(eligible).unwrap_or(u32::MAX);
    Ok(max_generated / eligible)
}

/// Composite items generated for one tier of one source item.
pub fn tier_entry_count(weight: u32, quota: u32, weight_sum: u64) -> u64 {
    if weight_sum == 0 {
        return 0;
    }
    u64::from(weight) * u64::from(quota) / weight_sum
}

/// Builds tiered selection lists for every eligible source item and points
/// the source's owning list at them.
pub struct CatalogRewriter<'p> {
    plan: &'p LootPlan,
    kind: ItemKind,
}

impl<'p> CatalogRewriter<'p> {
    pub fn new(plan: &'p LootPlan, kind: ItemKind) -> Self {
        Self { plan, kind }
    }

    pub fn rewrite<W, R>(
        &self,
        world: &mut W,
        rng: &mut R,
        synthesizer: &mut ItemSynthesizer<'_>,
        sources: &[ResolvedListItem],
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError>
    where
        W: WorldModel,
        R: Rng + ?Sized,
    {
        let quota = quota_per_source(self.plan.max_generated, sources.len(), self.kind)?;
        let weight_sum = self.plan.tier_weight_sum();
        if weight_sum == 0 {
            return Err(GenerationError::InvalidPlan(
                "rarity weights must not all be zero".to_string(),
            ));
        }
        if weight_sum > MAX_WEIGHT_SUM {
            return Err(GenerationError::InvalidPlan(format!(
                "rarity weights sum to {weight_sum}, above the limit of {MAX_WEIGHT_SUM}"
            )));
        }

        report.quota_per_source = quota;
        report.tiers = self
            .plan
            .rarities
            .iter()
            .map(|tier| {
                let per_source = tier_entry_count(tier.weight, quota, weight_sum);
                TierReport {
                    name: tier.name.clone(),
                    effect_count: tier.effect_count,
                    weight: tier.weight,
                    entries_per_source: per_source,
                    planned: per_source * sources.len() as u64,
                    created: 0,
                    skipped: 0,
                }
            })
            .collect();

        info!(
            kind = %self.kind,
            sources = sources.len(),
            quota,
            weight_sum,
            "rewriting selection lists"
        );

        for source in sources {
            let rewired = self.rewrite_source(world, rng, synthesizer, source, quota, report)?;
            report.sources_processed += 1;
            report.entries_rewired += rewired.entries_rewired;
            report.rewired.push(rewired);
        }

        Ok(())
    }

    fn rewrite_source<W, R>(
        &self,
        world: &mut W,
        rng: &mut R,
        synthesizer: &mut ItemSynthesizer<'_>,
        source: &ResolvedListItem,
        quota: u32,
        report: &mut GenerationReport,
    ) -> Result<RewiredSource, GenerationError>
    where
        W: WorldModel,
        R: Rng + ?Sized,
    {
        let editor_id = source.item.editor_id.as_deref().unwrap_or_default();
        let prefix = &self.plan.editor_id_prefix;
        let weight_sum = self.plan.tier_weight_sum();

        let mut top = self.empty_list_like(world, &source.list)?;
        top.editor_id = Some(format!("{prefix}_TOP_LList{editor_id}"));

        for (tier_index, tier) in self.plan.rarities.iter().enumerate() {
            let mut nested = self.empty_list_like(world, &source.list)?;
            nested.editor_id = Some(format!("{prefix}_LList_{}_{editor_id}", tier.name));

            let planned = tier_entry_count(tier.weight, quota, weight_sum);
            let mut skipped = 0_u64;
            let mut last_shortage = None;

            for _ in 0..planned {
                match synthesizer.synthesize(world, rng, source, tier) {
                    Ok(created) => {
                        report.items_created += 1;
                        report.effects_created += 1;
                        if created.derived_name {
                            report.name_fallbacks += 1;
                        }
                        nested.entries.push(Entry {
                            reference: created.item,
                            ..source.entry.clone()
                        });
                    }
                    Err(err) if err.is_supply_shortage() => {
                        debug!(item = %source.item.id, tier = %tier.name, error = %err, "draw skipped");
                        report.record_skip(err.code());
                        skipped += 1;
                        last_shortage = Some(err);
                    }
                    Err(err) => return Err(err),
                }
            }

            if let Some(tier_report) = report.tiers.get_mut(tier_index) {
                tier_report.created += planned - skipped;
                tier_report.skipped += skipped;
            }
            if let Some(err) = last_shortage {
                record_shortage(report, source, tier, planned, skipped, &err);
            }

            let nested_id = world.add_new::<SelectionList>(nested)?;
            report.lists_created += 1;
            top.entries.extend(
                std::iter::repeat_n(nested_id, tier.weight as usize).map(|reference| Entry {
                    reference,
                    ..source.entry.clone()
                }),
            );
        }

        top.entries.extend(
            std::iter::repeat_n(source.item.id, self.plan.remainder_slots() as usize).map(
                |reference| Entry {
                    reference,
                    ..source.entry.clone()
                },
            ),
        );

        let top_id = world.add_new::<SelectionList>(top)?;
        report.lists_created += 1;

        let owning = world.get_or_create_override::<SelectionList>(source.list.id)?;
        let mut entries_rewired = 0;
        for entry in owning
            .entries
            .iter_mut()
            .filter(|entry| entry.reference == source.item.id)
        {
            entry.reference = top_id;
            entries_rewired += 1;
        }

        debug!(
            list = %source.list.id,
            item = %source.item.id,
            top_list = %top_id,
            entries_rewired,
            "source rewired"
        );

        Ok(RewiredSource {
            list: source.list.id,
            source_item: source.item.id,
            top_list: top_id,
            entries_rewired,
        })
    }

    /// Copy of `template` under a fresh id, without entries and without
    /// the use-all flag so that weighted selection applies.
    fn empty_list_like<W: WorldModel>(
        &self,
        world: &mut W,
        template: &SelectionList,
    ) -> Result<SelectionList, GenerationError> {
        let id: RecordId = world.allocate_id()?;
        let mut list = template.copy_as(id);
        list.entries.clear();
        list.flags.remove(&ListFlag::UseAll);
        Ok(list)
    }
}

fn record_shortage(
    report: &mut GenerationReport,
    source: &ResolvedListItem,
    tier: &RarityTier,
    planned: u64,
    skipped: u64,
    err: &GenerationError,
) {
    warn!(
        item = %source.item.id,
        tier = %tier.name,
        planned,
        skipped,
        error = %err,
        "tier list under-populated"
    );
    report.record_issue(GenerationIssue {
        level: "warning".to_string(),
        code: err.code().to_string(),
        message: format!(
            "{skipped} of {planned} {} composite(s) skipped for item {}: {err}",
            tier.name, source.item.id
        ),
        record: Some(source.item.id),
    });
}
