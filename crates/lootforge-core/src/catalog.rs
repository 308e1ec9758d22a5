use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{IdAllocator, RecordId};
use crate::records::{EffectRecord, Item, Record, SelectionList};
use crate::world::WorldModel;

/// Serialized form of one catalog layer (a plugin, a master file or a patch).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CatalogLayer {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
    #[serde(default)]
    pub lists: Vec<SelectionList>,
}

/// Serialized catalog: layers ordered from lowest to highest priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSnapshot {
    pub layers: Vec<CatalogLayer>,
}

/// JSON Schema of the snapshot exchange format.
pub fn catalog_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(CatalogSnapshot)
}

/// Indexed layer of records keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordLayer {
    pub name: String,
    pub items: BTreeMap<RecordId, Item>,
    pub effects: BTreeMap<RecordId, EffectRecord>,
    pub lists: BTreeMap<RecordId, SelectionList>,
}

impl RecordLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn contains_id(&self, id: RecordId) -> bool {
        self.items.contains_key(&id) || self.effects.contains_key(&id) || self.lists.contains_key(&id)
    }

    pub fn max_id(&self) -> RecordId {
        self.items
            .keys()
            .chain(self.effects.keys())
            .chain(self.lists.keys())
            .copied()
            .max()
            .unwrap_or(RecordId::NULL)
    }

    pub fn len(&self) -> usize {
        self.items.len() + self.effects.len() + self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_snapshot(&self) -> CatalogLayer {
        CatalogLayer {
            name: self.name.clone(),
            items: self.items.values().cloned().collect(),
            effects: self.effects.values().cloned().collect(),
            lists: self.lists.values().cloned().collect(),
        }
    }
}

impl TryFrom<CatalogLayer> for RecordLayer {
    type Error = Error;

    fn try_from(layer: CatalogLayer) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut indexed = RecordLayer::new(layer.name);

        for item in layer.items {
            check_new_id(&indexed.name, &mut seen, item.id)?;
            indexed.items.insert(item.id, item);
        }
        for effect in layer.effects {
            check_new_id(&indexed.name, &mut seen, effect.id)?;
            indexed.effects.insert(effect.id, effect);
        }
        for list in layer.lists {
            check_new_id(&indexed.name, &mut seen, list.id)?;
            indexed.lists.insert(list.id, list);
        }

        Ok(indexed)
    }
}

fn check_new_id(layer: &str, seen: &mut BTreeSet<RecordId>, id: RecordId) -> Result<()> {
    if id.is_null() {
        return Err(Error::InvalidCatalog(format!(
            "layer '{layer}' contains a record with the null id"
        )));
    }
    if !seen.insert(id) {
        return Err(Error::InvalidCatalog(format!(
            "layer '{layer}' defines record {id} more than once"
        )));
    }
    Ok(())
}

/// In-memory layered catalog with one writable patch layer.
///
/// Reads see the winning override of each record: the patch version when
/// present, otherwise the version from the highest-priority layer.
#[derive(Debug, Clone)]
pub struct Catalog {
    layers: Vec<RecordLayer>,
    patch: RecordLayer,
    ids: IdAllocator,
    source_max: RecordId,
}

impl Catalog {
    pub fn new(layers: Vec<RecordLayer>, patch_name: impl Into<String>) -> Self {
        let source_max = layers
            .iter()
            .map(RecordLayer::max_id)
            .max()
            .unwrap_or(RecordId::NULL);
        Self {
            layers,
            patch: RecordLayer::new(patch_name),
            ids: IdAllocator::starting_after(source_max),
            source_max,
        }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot, patch_name: impl Into<String>) -> Result<Self> {
        let layers = snapshot
            .layers
            .into_iter()
            .map(RecordLayer::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(layers, patch_name))
    }

    pub fn layers(&self) -> &[RecordLayer] {
        &self.layers
    }

    pub fn patch(&self) -> &RecordLayer {
        &self.patch
    }

    /// Largest id present in the read-only layers.
    pub fn source_max_id(&self) -> RecordId {
        self.source_max
    }

    /// True for records created by this run rather than read from a layer.
    pub fn is_generated(&self, id: RecordId) -> bool {
        id > self.source_max
    }

    pub fn patch_snapshot(&self) -> CatalogLayer {
        self.patch.to_snapshot()
    }

    /// All layers followed by the patch layer.
    pub fn merged_snapshot(&self) -> CatalogSnapshot {
        let mut layers: Vec<CatalogLayer> = self.layers.iter().map(RecordLayer::to_snapshot).collect();
        layers.push(self.patch.to_snapshot());
        CatalogSnapshot { layers }
    }

    fn contains_id(&self, id: RecordId) -> bool {
        self.patch.contains_id(id) || self.layers.iter().any(|layer| layer.contains_id(id))
    }
}

impl WorldModel for Catalog {
    fn resolve<T: Record>(&self, id: RecordId) -> Option<&T> {
        if id.is_null() {
            return None;
        }
        T::table(&self.patch)
            .get(&id)
            .or_else(|| self.layers.iter().rev().find_map(|layer| T::table(layer).get(&id)))
    }

    fn winning_overrides<T: Record>(&self) -> Vec<&T> {
        let mut winners: BTreeMap<RecordId, &T> = BTreeMap::new();
        for layer in self.layers.iter().chain(std::iter::once(&self.patch)) {
            for (id, record) in T::table(layer) {
                winners.insert(*id, record);
            }
        }
        winners.into_values().collect()
    }

    fn allocate_id(&mut self) -> Result<RecordId> {
        self.ids.next_id()
    }

    fn add_new<T: Record>(&mut self, record: T) -> Result<RecordId> {
        let id = record.id();
        if id.is_null() || self.contains_id(id) {
            return Err(Error::DuplicateRecord(id));
        }
        T::table_mut(&mut self.patch).insert(id, record);
        Ok(id)
    }

    fn get_or_create_override<T: Record>(&mut self, id: RecordId) -> Result<&mut T> {
        if !T::table(&self.patch).contains_key(&id) {
            let winning = self
                .layers
                .iter()
                .rev()
                .find_map(|layer| T::table(layer).get(&id))
                .cloned()
                .ok_or(Error::UnknownRecord(id))?;
            T::table_mut(&mut self.patch).insert(id, winning);
        }
        T::table_mut(&mut self.patch)
            .get_mut(&id)
            .ok_or(Error::UnknownRecord(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Entry, ItemKind};

    fn item(id: u32, name: &str) -> Item {
        Item {
            id: RecordId(id),
            kind: ItemKind::Armor,
            editor_id: Some(format!("Armor{name}")),
            name: Some(name.to_string()),
            keywords: BTreeSet::new(),
            object_effect: None,
            enchantment_amount: 0,
            value: 10,
            weight: 1.0,
        }
    }

    fn list(id: u32, entries: &[u32]) -> SelectionList {
        SelectionList {
            id: RecordId(id),
            editor_id: None,
            flags: BTreeSet::new(),
            chance_none: 0,
            entries: entries
                .iter()
                .map(|reference| Entry {
                    reference: RecordId(*reference),
                    level: 1,
                    count: 1,
                })
                .collect(),
        }
    }

    fn layered() -> Catalog {
        let base = CatalogLayer {
            name: "Base".to_string(),
            items: vec![item(1, "Boots"), item(2, "Helmet")],
            lists: vec![list(10, &[1, 2])],
            ..CatalogLayer::default()
        };
        let update = CatalogLayer {
            name: "Update".to_string(),
            items: vec![item(2, "Fine Helmet")],
            ..CatalogLayer::default()
        };
        Catalog::from_snapshot(CatalogSnapshot { layers: vec![base, update] }, "Patch")
            .expect("valid snapshot")
    }

    #[test]
    fn higher_layer_wins() {
        let catalog = layered();
        let helmet = catalog.resolve::<Item>(RecordId(2)).unwrap();
        assert_eq!(helmet.name.as_deref(), Some("Fine Helmet"));
        let winners = catalog.winning_overrides::<Item>();
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[1].name.as_deref(), Some("Fine Helmet"));
    }

    #[test]
    fn allocated_ids_are_above_sources() {
        let mut catalog = layered();
        let id = catalog.allocate_id().unwrap();
        assert_eq!(id, RecordId(11));
        assert!(catalog.is_generated(id));
    }

    #[test]
    fn add_new_rejects_existing_ids() {
        let mut catalog = layered();
        let err = catalog.add_new(item(1, "Boots")).unwrap_err();
        assert!(matches!(err, Error::DuplicateRecord(RecordId(1))));
    }

    #[test]
    fn override_copies_winning_list_into_patch() {
        let mut catalog = layered();
        let list = catalog
            .get_or_create_override::<SelectionList>(RecordId(10))
            .unwrap();
        list.entries[0].reference = RecordId(2);
        assert_eq!(catalog.patch().lists.len(), 1);
        let winning = catalog.resolve::<SelectionList>(RecordId(10)).unwrap();
        assert_eq!(winning.entries[0].reference, RecordId(2));
        assert_eq!(catalog.layers()[0].lists[&RecordId(10)].entries[0].reference, RecordId(1));
    }

    #[test]
    fn snapshot_rejects_duplicate_ids() {
        let layer = CatalogLayer {
            name: "Broken".to_string(),
            items: vec![item(5, "A")],
            lists: vec![list(5, &[])],
            ..CatalogLayer::default()
        };
        let err = Catalog::from_snapshot(CatalogSnapshot { layers: vec![layer] }, "Patch")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));
    }
}
