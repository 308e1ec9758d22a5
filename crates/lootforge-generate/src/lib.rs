//! Tiered magical-item synthesis for Lootforge.
//!
//! This crate scans a catalog for un-enchanted items, indexes the effects
//! found on enchanted ones, synthesizes composite items per rarity tier and
//! rewires the selection lists that referenced the originals.

pub mod analyzer;
pub mod engine;
pub mod errors;
pub mod model;
pub mod naming;
pub mod pool;
pub mod rewrite;
pub mod synth;

pub use analyzer::{Analyzer, ResolvedListItem, ScannedCatalog};
pub use engine::{GenerationEngine, kind_seed};
pub use errors::GenerationError;
pub use model::{GenerationReport, GenerationResult, ScanSummary, TierReport};
pub use naming::NameDeriver;
pub use pool::{EffectPool, EnchantmentKey, ResolvedEnchantment};
pub use rewrite::{CatalogRewriter, quota_per_source, tier_entry_count};
pub use synth::{ItemSynthesizer, SynthesizedItem};
