use lootforge_core::ItemKind;
use thiserror::Error;

/// Errors emitted by the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no effects available at level {level}")]
    NoEffectsAvailable { level: u16 },
    #[error("effect pool at level {level} holds {available} effect(s) but {required} are required")]
    InsufficientEffectPool {
        level: u16,
        available: usize,
        required: usize,
    },
    #[error("no eligible un-enchanted {kind} items found")]
    NoEligibleItems { kind: ItemKind },
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("catalog error: {0}")]
    Core(#[from] lootforge_core::Error),
}

impl GenerationError {
    /// Stable code used in reports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::NoEffectsAvailable { .. } => "no_effects_available",
            GenerationError::InsufficientEffectPool { .. } => "insufficient_effect_pool",
            GenerationError::NoEligibleItems { .. } => "no_eligible_items",
            GenerationError::InvalidPlan(_) => "invalid_plan",
            GenerationError::Core(_) => "catalog_error",
        }
    }

    /// Effect supply shortages only abort a single composite item.
    pub fn is_supply_shortage(&self) -> bool {
        matches!(
            self,
            GenerationError::NoEffectsAvailable { .. }
                | GenerationError::InsufficientEffectPool { .. }
        )
    }
}
