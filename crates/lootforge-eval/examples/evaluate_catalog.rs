use std::env;
use std::path::PathBuf;

use lootforge_core::{Catalog, CatalogSnapshot};
use lootforge_eval::{EvaluateOptions, EvaluationEngine};
use lootforge_generate::GenerationEngine;
use lootforge_plan::LootPlan;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut catalog_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => catalog_path = args.next().map(PathBuf::from),
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => {
                if catalog_path.is_none() {
                    catalog_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let catalog_path = catalog_path.ok_or("missing --catalog path")?;
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("eval_out"));

    let snapshot: CatalogSnapshot = serde_json::from_str(&std::fs::read_to_string(&catalog_path)?)?;
    let mut catalog = Catalog::from_snapshot(snapshot, "LootforgePatch")?;

    let plan = LootPlan::default();
    let result = GenerationEngine::new(plan.clone()).run(&mut catalog)?;

    let engine = EvaluationEngine::new(EvaluateOptions::default());
    let evaluation = engine.run(&catalog, &plan, &result, &out_dir)?;

    println!("metrics_path={}", evaluation.metrics_path.display());
    println!("report_path={}", evaluation.report_path.display());
    Ok(())
}
