use std::collections::BTreeSet;
use std::time::Instant;

use lootforge_core::{ItemKind, WorldModel};
use lootforge_plan::LootPlan;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::errors::GenerationError;
use crate::model::{GenerationResult, ScanSummary};

/// Runs the scan and generate pipeline for every item kind of a plan.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    plan: LootPlan,
    run_id: Option<String>,
}

impl GenerationEngine {
    pub fn new(plan: LootPlan) -> Self {
        Self { plan, run_id: None }
    }

    /// Reuse an externally assigned run id instead of generating one.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn plan(&self) -> &LootPlan {
        &self.plan
    }

    /// Scan only; the catalog is left untouched.
    pub fn analyze<W: WorldModel>(&self, world: &W) -> Vec<ScanSummary> {
        self.kinds()
            .into_iter()
            .map(|kind| Analyzer::new(&self.plan, kind).analyze(world).report())
            .collect()
    }

    pub fn run<W: WorldModel>(&self, world: &mut W) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = self
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let started_at = chrono::Utc::now().to_rfc3339();

        info!(run_id = %run_id, seed = self.plan.seed, kinds = self.plan.kinds.len(), "generation started");

        let kinds = self.kinds();
        if let Some(kind) = kinds.iter().copied().find(|kind| {
            Analyzer::new(&self.plan, *kind)
                .analyze(world)
                .unenchanted()
                .is_empty()
        }) {
            let err = GenerationError::NoEligibleItems { kind };
            warn!(run_id = %run_id, kind = %kind, error = %err, "generation aborted before any write");
            return Err(err);
        }

        let mut reports = Vec::new();
        for kind in kinds {
            let mut rng = ChaCha8Rng::seed_from_u64(kind_seed(self.plan.seed, kind));
            let scanned = Analyzer::new(&self.plan, kind).analyze(world);
            match scanned.generate(world, &mut rng) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(run_id = %run_id, kind = %kind, error = %err, "generation failed");
                    return Err(err);
                }
            }
        }

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(run_id = %run_id, duration_ms, "generation finished");

        Ok(GenerationResult {
            run_id,
            started_at,
            seed: self.plan.seed,
            duration_ms,
            reports,
        })
    }

    /// Configured kinds without duplicates, in declared order.
    fn kinds(&self) -> Vec<ItemKind> {
        let mut seen = BTreeSet::new();
        self.plan
            .kinds
            .iter()
            .copied()
            .filter(|kind| seen.insert(*kind))
            .collect()
    }
}

/// Independent RNG stream per item kind.
pub fn kind_seed(seed: u64, kind: ItemKind) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in kind.as_str().as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
