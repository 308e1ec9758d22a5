use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::RecordLayer;
use crate::ids::RecordId;

/// Equippable item category handled by the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Armor,
    Weapon,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Armor => "armor",
            ItemKind::Weapon => "weapon",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An equippable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    pub id: RecordId,
    pub kind: ItemKind,
    /// Editor-style internal id (e.g. `ArmorIronCuirass`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    /// Display name; generated names are derived when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Keywords, including disallow markers such as `MagicDisallowEnchanting`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub keywords: BTreeSet<String>,
    /// Attached effect record ("object effect").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_effect: Option<RecordId>,
    /// Enchantment magnitude/charge.
    #[serde(default)]
    pub enchantment_amount: u16,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub weight: f32,
}

impl Item {
    pub fn is_enchanted(&self) -> bool {
        self.object_effect.is_some_and(|id| !id.is_null())
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }
}

/// One magical sub-effect inside an effect record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubEffect {
    pub base_effect: RecordId,
    #[serde(default)]
    pub magnitude: f32,
    #[serde(default)]
    pub area: u32,
    #[serde(default)]
    pub duration: u32,
}

/// A named bundle of sub-effects attachable to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EffectRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub effects: Vec<SubEffect>,
    /// Form list restricting which worn items may carry the effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worn_restrictions: Option<RecordId>,
}

/// Behavioral flag of a selection list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ListFlag {
    CalculateFromAllLevels,
    CalculateForEachItem,
    /// Every entry is granted instead of a weighted/leveled pick.
    UseAll,
    SpecialLoot,
}

/// One eligible choice within a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Entry {
    /// Target item or nested list; [`RecordId::NULL`] for an empty entry.
    pub reference: RecordId,
    /// Minimum player level for the entry to be eligible.
    #[serde(default)]
    pub level: u16,
    #[serde(default = "default_count")]
    pub count: u16,
}

fn default_count() -> u16 {
    1
}

/// A weighted/random pick table, possibly nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectionList {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<ListFlag>,
    /// Percent chance that the list yields nothing.
    #[serde(default)]
    pub chance_none: u8,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Record types stored in a catalog layer.
pub trait Record: Clone {
    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    fn table(layer: &RecordLayer) -> &BTreeMap<RecordId, Self>;

    fn table_mut(layer: &mut RecordLayer) -> &mut BTreeMap<RecordId, Self>;

    /// Deep copy of this record re-keyed under `id`.
    fn copy_as(&self, id: RecordId) -> Self {
        let mut copy = self.clone();
        copy.set_id(id);
        copy
    }
}

impl Record for Item {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn table(layer: &RecordLayer) -> &BTreeMap<RecordId, Self> {
        &layer.items
    }

    fn table_mut(layer: &mut RecordLayer) -> &mut BTreeMap<RecordId, Self> {
        &mut layer.items
    }
}

impl Record for EffectRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn table(layer: &RecordLayer) -> &BTreeMap<RecordId, Self> {
        &layer.effects
    }

    fn table_mut(layer: &mut RecordLayer) -> &mut BTreeMap<RecordId, Self> {
        &mut layer.effects
    }
}

impl Record for SelectionList {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn table(layer: &RecordLayer) -> &BTreeMap<RecordId, Self> {
        &layer.lists
    }

    fn table_mut(layer: &mut RecordLayer) -> &mut BTreeMap<RecordId, Self> {
        &mut layer.lists
    }
}
