use std::collections::BTreeSet;

use lootforge_core::{
    Catalog, CatalogLayer, CatalogSnapshot, EffectRecord, Entry, Item, ItemKind, RecordId,
    SelectionList, validate_catalog,
};

fn item(id: u32, effect: Option<u32>) -> Item {
    Item {
        id: RecordId(id),
        kind: ItemKind::Weapon,
        editor_id: Some(format!("WeaponIronSword{id}")),
        name: None,
        keywords: BTreeSet::new(),
        object_effect: effect.map(RecordId),
        enchantment_amount: 500,
        value: 25,
        weight: 9.0,
    }
}

fn list(id: u32, refs: &[u32]) -> SelectionList {
    SelectionList {
        id: RecordId(id),
        editor_id: None,
        flags: BTreeSet::new(),
        chance_none: 0,
        entries: refs
            .iter()
            .map(|reference| Entry {
                reference: RecordId(*reference),
                level: 1,
                count: 1,
            })
            .collect(),
    }
}

fn catalog(layer: CatalogLayer) -> Catalog {
    Catalog::from_snapshot(CatalogSnapshot { layers: vec![layer] }, "Patch").expect("snapshot")
}

#[test]
fn consistent_catalog_has_no_issues() {
    let catalog = catalog(CatalogLayer {
        name: "Base".to_string(),
        items: vec![item(1, Some(2))],
        effects: vec![EffectRecord {
            id: RecordId(2),
            editor_id: Some("EnchWeaponFireDamage01".to_string()),
            name: Some("Fire Damage".to_string()),
            effects: Vec::new(),
            worn_restrictions: None,
        }],
        lists: vec![list(3, &[1, 0]), list(4, &[3])],
    });

    assert!(validate_catalog(&catalog).is_empty());
}

#[test]
fn reports_dangling_entries_effects_and_cycles() {
    let catalog = catalog(CatalogLayer {
        name: "Base".to_string(),
        items: vec![item(1, Some(99))],
        effects: Vec::new(),
        lists: vec![list(3, &[1, 42]), list(4, &[5]), list(5, &[4])],
    });

    let issues = validate_catalog(&catalog);
    let codes: Vec<&str> = issues.iter().map(|issue| issue.code.as_str()).collect();
    assert!(codes.contains(&"dangling_entry"));
    assert!(codes.contains(&"missing_object_effect"));
    assert_eq!(codes.iter().filter(|code| **code == "list_cycle").count(), 2);
}
