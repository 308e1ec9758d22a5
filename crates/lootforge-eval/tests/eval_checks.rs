use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use lootforge_core::{
    Catalog, CatalogLayer, CatalogSnapshot, EffectRecord, Entry, Item, ItemKind, RecordId,
    SelectionList, WorldModel,
};
use lootforge_eval::{EvalError, EvaluateOptions, EvaluationEngine};
use lootforge_generate::{GenerationEngine, GenerationResult};
use lootforge_plan::LootPlan;

fn armor(id: u32, effect: Option<u32>) -> Item {
    Item {
        id: RecordId(id),
        kind: ItemKind::Armor,
        editor_id: Some(format!("ArmorSteelGauntlets{id}")),
        name: Some("Steel Gauntlets".to_string()),
        keywords: BTreeSet::new(),
        object_effect: effect.map(RecordId),
        enchantment_amount: if effect.is_some() { 300 } else { 0 },
        value: 55,
        weight: 4.0,
    }
}

fn effect(id: u32, name: &str) -> EffectRecord {
    EffectRecord {
        id: RecordId(id),
        editor_id: Some(format!("Ench{id}")),
        name: Some(name.to_string()),
        effects: Vec::new(),
        worn_restrictions: None,
    }
}

fn generated() -> (Catalog, LootPlan, GenerationResult) {
    let layer = CatalogLayer {
        name: "Base".to_string(),
        items: vec![
            armor(1, None),
            armor(2, None),
            armor(10, Some(20)),
            armor(11, Some(21)),
            armor(12, Some(22)),
        ],
        effects: vec![
            effect(20, "Fortify Archery"),
            effect(21, "Fortify Lockpicking"),
            effect(22, "Fortify Smithing"),
        ],
        lists: vec![SelectionList {
            id: RecordId(100),
            editor_id: Some("LItemArmorGauntlets".to_string()),
            flags: BTreeSet::new(),
            chance_none: 0,
            entries: [1, 2, 10, 11, 12]
                .into_iter()
                .map(|id| Entry {
                    reference: RecordId(id),
                    level: 1,
                    count: 1,
                })
                .collect(),
        }],
    };
    let mut catalog =
        Catalog::from_snapshot(CatalogSnapshot { layers: vec![layer] }, "Patch").expect("catalog");
    let plan = LootPlan {
        max_generated: 60,
        ..LootPlan::default()
    };
    let result = GenerationEngine::new(plan.clone())
        .run(&mut catalog)
        .expect("generation");
    (catalog, plan, result)
}

fn lenient() -> EvaluationEngine {
    EvaluationEngine::new(EvaluateOptions {
        strict: false,
        ..EvaluateOptions::default()
    })
}

fn codes(engine: &EvaluationEngine, catalog: &Catalog, plan: &LootPlan, result: &GenerationResult) -> Vec<String> {
    engine
        .evaluate(catalog, plan, result)
        .violations
        .into_iter()
        .map(|violation| violation.code)
        .collect()
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("lootforge_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

#[test]
fn fresh_generation_passes_every_check() {
    let (catalog, plan, result) = generated();
    let evaluation = lenient().evaluate(&catalog, &plan, &result);

    assert!(evaluation.violations.is_empty(), "{:?}", evaluation.violations);
    let checks = &evaluation.metrics.checks;
    assert_eq!(checks.top_lists.checked, 2);
    assert_eq!(checks.rewiring.checked, 2);
    assert!(checks.effects.checked > 0);
    assert_eq!(checks.total_violations(), 0);
}

#[test]
fn restored_source_entry_is_reported() {
    let (mut catalog, plan, result) = generated();
    let list = catalog
        .get_or_create_override::<SelectionList>(RecordId(100))
        .expect("list");
    list.entries.push(Entry {
        reference: RecordId(1),
        level: 1,
        count: 1,
    });

    assert_eq!(codes(&lenient(), &catalog, &plan, &result), vec!["entry_not_rewired"]);
}

#[test]
fn truncated_top_list_is_reported() {
    let (mut catalog, plan, result) = generated();
    let top_id = result.reports[0].rewired[0].top_list;
    let top = catalog
        .get_or_create_override::<SelectionList>(top_id)
        .expect("top list");
    top.entries.pop();

    assert_eq!(codes(&lenient(), &catalog, &plan, &result), vec!["top_list_size"]);
}

#[test]
fn generated_item_without_effect_is_reported() {
    let (mut catalog, plan, result) = generated();
    let id = catalog.allocate_id().expect("id");
    catalog.add_new(armor(id.0, None)).expect("add item");

    assert_eq!(codes(&lenient(), &catalog, &plan, &result), vec!["generated_effect_missing"]);
}

#[test]
fn new_record_inside_source_range_is_reported() {
    let (mut catalog, plan, result) = generated();
    catalog.add_new(armor(50, Some(20))).expect("add item");

    assert_eq!(codes(&lenient(), &catalog, &plan, &result), vec!["id_not_above_source"]);
}

#[test]
fn lowered_ceiling_is_reported() {
    let (catalog, plan, result) = generated();
    let tighter = LootPlan {
        max_generated: 1,
        ..plan
    };

    let codes = codes(&lenient(), &catalog, &tighter, &result);
    assert!(codes.contains(&"ceiling_exceeded".to_string()));
}

#[test]
fn run_writes_report_files() {
    let (catalog, plan, result) = generated();
    let out_dir = temp_out_dir("clean");
    let evaluation = lenient()
        .run(&catalog, &plan, &result, &out_dir)
        .expect("evaluation");

    let report = fs::read_to_string(&evaluation.report_path).expect("read report");
    assert!(report.contains("# Lootforge Evaluation Report"));
    assert!(evaluation.metrics_path.exists());
    assert!(evaluation.violations_path.is_none());
}

#[test]
fn strict_run_fails_after_writing_report() {
    let (mut catalog, plan, result) = generated();
    catalog.add_new(armor(50, Some(20))).expect("add item");
    let out_dir = temp_out_dir("strict");

    let err = EvaluationEngine::new(EvaluateOptions::default())
        .run(&catalog, &plan, &result, &out_dir)
        .expect_err("strict evaluation");
    assert!(matches!(
        err,
        EvalError::Violations { count: 1, ref first_code } if first_code == "id_not_above_source"
    ));
    assert!(out_dir.join("eval_report.md").exists());
}
