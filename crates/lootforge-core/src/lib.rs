//! Core contracts and helpers for Lootforge.
//!
//! This crate defines the catalog record types, the world-model trait the
//! generation pipeline talks to, and an in-memory layered catalog.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod ids;
pub mod records;
pub mod validation;
pub mod world;

pub use catalog::{Catalog, CatalogLayer, CatalogSnapshot, RecordLayer, catalog_json_schema};
pub use error::{Error, Result};
pub use graph::{ListGraphReport, ListGraphSummary, build_list_graph_report};
pub use ids::{IdAllocator, RecordId};
pub use records::{EffectRecord, Entry, Item, ItemKind, ListFlag, Record, SelectionList, SubEffect};
pub use validation::{CatalogIssue, validate_catalog};
pub use world::WorldModel;

/// Current contract version for catalog snapshot artifacts.
pub const CATALOG_VERSION: &str = "0.1";
