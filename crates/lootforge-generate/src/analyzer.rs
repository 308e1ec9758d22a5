use lootforge_core::{EffectRecord, Entry, Item, ItemKind, SelectionList, WorldModel};
use lootforge_plan::LootPlan;
use rand::Rng;
use tracing::info;

use crate::errors::GenerationError;
use crate::model::{GenerationReport, ScanSummary};
use crate::naming::NameDeriver;
use crate::pool::{EffectPool, EnchantmentKey};
use crate::rewrite::CatalogRewriter;
use crate::synth::ItemSynthesizer;

/// A list entry resolved to the item it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedListItem {
    pub list: SelectionList,
    pub entry: Entry,
    pub item: Item,
}

/// Pipeline entry point for one item kind.
///
/// `analyze` produces a [`ScannedCatalog`]; generating consumes it, so a scan
/// can only ever be generated once.
#[derive(Debug, Clone)]
pub struct Analyzer<'p> {
    plan: &'p LootPlan,
    kind: ItemKind,
}

impl<'p> Analyzer<'p> {
    pub fn new(plan: &'p LootPlan, kind: ItemKind) -> Self {
        Self { plan, kind }
    }

    /// Snapshot every list entry that resolves to an eligible item of this
    /// kind and index the effects found on enchanted ones.
    pub fn analyze<W: WorldModel>(self, world: &W) -> ScannedCatalog<'p> {
        let lists = world.winning_overrides::<SelectionList>();
        let mut enchanted = Vec::new();
        let mut unenchanted = Vec::new();

        for list in &lists {
            for entry in &list.entries {
                if entry.reference.is_null() {
                    continue;
                }
                let Some(item) = world.resolve::<Item>(entry.reference) else {
                    continue;
                };
                if item.kind != self.kind || self.is_disallowed(item) {
                    continue;
                }

                let resolved = ResolvedListItem {
                    list: (*list).clone(),
                    entry: entry.clone(),
                    item: item.clone(),
                };
                if item.is_enchanted() {
                    enchanted.push(resolved);
                } else {
                    unenchanted.push(resolved);
                }
            }
        }

        let keys = enchanted.iter().filter_map(|resolved| {
            resolved.item.object_effect.map(|effect| EnchantmentKey {
                level: resolved.entry.level,
                amount: resolved.item.enchantment_amount,
                effect,
            })
        });
        let pool = EffectPool::build(
            keys,
            |id| world.resolve::<EffectRecord>(id).cloned(),
            self.plan.max_cached_level,
        );

        let scanned = ScannedCatalog {
            plan: self.plan,
            kind: self.kind,
            lists: lists.len(),
            enchanted,
            unenchanted,
            pool,
        };

        let summary = scanned.report();
        info!(
            kind = %summary.kind,
            lists = summary.lists,
            items = summary.items,
            unenchanted = summary.unenchanted,
            enchanted = summary.enchanted,
            pool_size = summary.pool_size,
            unresolved_effects = summary.unresolved_effects,
            "scan completed"
        );

        scanned
    }

    fn is_disallowed(&self, item: &Item) -> bool {
        self.plan
            .disallow_keywords
            .iter()
            .any(|keyword| item.has_keyword(keyword))
    }
}

/// Frozen result of a catalog scan for one item kind.
#[derive(Debug, Clone)]
pub struct ScannedCatalog<'p> {
    plan: &'p LootPlan,
    kind: ItemKind,
    lists: usize,
    enchanted: Vec<ResolvedListItem>,
    unenchanted: Vec<ResolvedListItem>,
    pool: EffectPool,
}

impl<'p> ScannedCatalog<'p> {
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn enchanted(&self) -> &[ResolvedListItem] {
        &self.enchanted
    }

    pub fn unenchanted(&self) -> &[ResolvedListItem] {
        &self.unenchanted
    }

    pub fn pool(&self) -> &EffectPool {
        &self.pool
    }

    pub fn report(&self) -> ScanSummary {
        ScanSummary {
            kind: self.kind,
            lists: self.lists,
            items: self.enchanted.len() + self.unenchanted.len(),
            unenchanted: self.unenchanted.len(),
            enchanted: self.enchanted.len(),
            pool_size: self.pool.len(),
            pool_levels: self.pool.levels().len(),
            unresolved_effects: self.pool.unresolved(),
        }
    }

    /// Synthesize composite items and rewire the catalog.
    pub fn generate<W, R>(self, world: &mut W, rng: &mut R) -> Result<GenerationReport, GenerationError>
    where
        W: WorldModel,
        R: Rng + ?Sized,
    {
        let mut report = GenerationReport::new(self.report());
        if self.unenchanted.is_empty() {
            return Err(GenerationError::NoEligibleItems { kind: self.kind });
        }

        let names = NameDeriver::new(
            self.plan.naming.clone(),
            self.plan.naming.fallback_for(self.kind),
        );
        let mut synthesizer =
            ItemSynthesizer::new(&self.pool, names, &self.plan.editor_id_prefix, self.kind);
        let rewriter = CatalogRewriter::new(self.plan, self.kind);
        rewriter.rewrite(world, rng, &mut synthesizer, &self.unenchanted, &mut report)?;

        info!(
            kind = %self.kind,
            items_created = report.items_created,
            lists_created = report.lists_created,
            entries_rewired = report.entries_rewired,
            skipped = report.skipped_total(),
            names_derived = synthesizer.names().derivations(),
            "generation completed"
        );

        Ok(report)
    }
}
