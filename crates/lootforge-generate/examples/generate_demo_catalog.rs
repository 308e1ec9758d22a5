use std::collections::BTreeSet;
use std::env;

use lootforge_core::{
    Catalog, CatalogLayer, CatalogSnapshot, EffectRecord, Entry, Item, ItemKind, RecordId,
    SelectionList, SubEffect,
};
use lootforge_generate::GenerationEngine;
use lootforge_plan::LootPlan;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut plan = LootPlan {
        max_generated: 200,
        ..LootPlan::default()
    };
    if let Some(seed) = env::args().nth(1) {
        plan.seed = seed.parse()?;
    }

    let mut catalog = Catalog::from_snapshot(demo_snapshot(), "LootPatch")?;
    let engine = GenerationEngine::new(plan);
    let result = engine.run(&mut catalog)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn demo_snapshot() -> CatalogSnapshot {
    let plain = ["ArmorIronCuirass", "ArmorSteelHelmet", "ArmorLeatherBoots"];
    let effects = [
        ("EnchArmorFortifyHealth01", "Fortify Health"),
        ("EnchArmorFortifyStamina01", "Fortify Stamina"),
        ("EnchArmorResistFire01", "Resist Fire"),
        ("EnchArmorFortifyOneHanded01", "Fortify One-handed"),
    ];

    let mut items = Vec::new();
    let mut entries = Vec::new();
    for (offset, editor_id) in plain.iter().enumerate() {
        let id = RecordId(0x100 + offset as u32);
        items.push(armor(id, editor_id, None));
        entries.push(Entry {
            reference: id,
            level: 1,
            count: 1,
        });
    }

    let mut records = Vec::new();
    for (offset, (editor_id, name)) in effects.iter().enumerate() {
        let effect_id = RecordId(0x200 + offset as u32);
        records.push(EffectRecord {
            id: effect_id,
            editor_id: Some(editor_id.to_string()),
            name: Some(name.to_string()),
            effects: vec![SubEffect {
                base_effect: RecordId(0x300 + offset as u32),
                magnitude: 20.0,
                area: 0,
                duration: 0,
            }],
            worn_restrictions: None,
        });

        let item_id = RecordId(0x400 + offset as u32);
        items.push(armor(item_id, &format!("EnchArmorIronCuirass{offset}"), Some(effect_id)));
        entries.push(Entry {
            reference: item_id,
            level: 1,
            count: 1,
        });
    }

    CatalogSnapshot {
        layers: vec![CatalogLayer {
            name: "Demo.esm".to_string(),
            items,
            effects: records,
            lists: vec![SelectionList {
                id: RecordId(0x500),
                editor_id: Some("LItemArmorLight".to_string()),
                flags: BTreeSet::new(),
                chance_none: 0,
                entries,
            }],
        }],
    }
}

fn armor(id: RecordId, editor_id: &str, effect: Option<RecordId>) -> Item {
    Item {
        id,
        kind: ItemKind::Armor,
        editor_id: Some(editor_id.to_string()),
        name: None,
        keywords: BTreeSet::new(),
        object_effect: effect,
        enchantment_amount: if effect.is_some() { 500 } else { 0 },
        value: 50,
        weight: 10.0,
    }
}
