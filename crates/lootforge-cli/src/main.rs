mod inputs;
mod registry;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lootforge_core::{
    CatalogIssue, Error as CoreError, SelectionList, WorldModel, build_list_graph_report,
    catalog_json_schema, validate_catalog,
};
use lootforge_eval::{EvalError, EvaluateOptions, EvaluationEngine};
use lootforge_generate::{GenerationEngine, GenerationError};
use lootforge_plan::{PlanError, ValidationIssue, plan_json_schema};
use registry::{RunContext, init_logging, start_run, write_generation_report, write_patch};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("catalog check failed with {0} issue(s)")]
    CheckFailed(usize),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "lootforge", version, about = "Lootforge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a catalog and print per-kind counts.
    Analyze(AnalyzeArgs),
    /// Synthesize composite items and write a patch layer.
    Generate(GenerateArgs),
    /// Check referential consistency of a catalog.
    Check(CheckArgs),
    /// Print a JSON Schema.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Catalog snapshot (JSON).
    #[arg(long)]
    catalog: PathBuf,
    /// Plan document (TOML or JSON); defaults apply when omitted.
    #[arg(long)]
    plan: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Catalog snapshot (JSON).
    #[arg(long)]
    catalog: PathBuf,
    /// Plan document (TOML or JSON); defaults apply when omitted.
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Override the plan seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Optional output path for the patch layer.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write every layer plus the patch to --out instead of the patch only.
    #[arg(long, default_value_t = false)]
    merged: bool,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Fail when post-generation checks report violations.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Catalog snapshot (JSON).
    #[arg(long)]
    catalog: PathBuf,
    /// Plan document to validate alongside the catalog.
    #[arg(long)]
    plan: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    #[arg(value_enum)]
    target: SchemaTarget,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SchemaTarget {
    Plan,
    Catalog,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    init_logging(None)?;
    let validated = inputs::load_plan(args.plan.as_deref())?;
    log_plan_warnings(&validated.warnings);
    let catalog = inputs::load_catalog(&args.catalog)?;

    let summaries = GenerationEngine::new(validated.plan).analyze(&catalog);
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        catalog: catalog_path,
        plan: plan_path,
        seed,
        out,
        merged,
        run_dir,
        strict,
    } = args;

    let validated = inputs::load_plan(plan_path.as_deref())?;
    let mut plan = validated.plan;
    if let Some(seed) = seed {
        plan.seed = seed;
    }
    let mut catalog = inputs::load_catalog(&catalog_path)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        catalog_path,
        plan_path,
        plan: plan.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_logging(Some(&run_paths.logs_path))?;

    tracing::info!(event = "run_started", run_id = %run_id, seed = plan.seed);
    log_plan_warnings(&validated.warnings);
    let timer = Instant::now();

    let result = GenerationEngine::new(plan.clone())
        .with_run_id(run_id.clone())
        .run(&mut catalog)?;
    tracing::info!(event = "generation_finished", items_created = result.items_created());

    let merged_snapshot = merged.then(|| catalog.merged_snapshot());
    write_patch(
        &run_paths,
        &catalog.patch_snapshot(),
        merged_snapshot.as_ref(),
        out.as_deref(),
    )?;
    tracing::info!(event = "patch_written", path = %run_paths.patch_path.display());

    write_generation_report(&run_paths, &result)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    let evaluation = EvaluationEngine::new(EvaluateOptions {
        strict,
        ..EvaluateOptions::default()
    })
    .run(&catalog, &plan, &result, &run_paths.root)?;
    tracing::info!(
        event = "evaluation_written",
        path = %evaluation.report_path.display(),
        violations = evaluation.violations.len()
    );

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    println!("run_dir={}", run_paths.root.display());
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    init_logging(None)?;
    let plan_warnings = match args.plan.as_deref() {
        Some(path) => inputs::load_plan(Some(path))?.warnings,
        None => Vec::new(),
    };
    let catalog = inputs::load_catalog(&args.catalog)?;

    let issues: Vec<CatalogIssue> = validate_catalog(&catalog);
    let graph = build_list_graph_report(catalog.winning_overrides::<SelectionList>());
    let output = json!({
        "catalog": args.catalog.display().to_string(),
        "graph": graph.summary,
        "issues": &issues,
        "plan_warnings": plan_warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CliError::CheckFailed(issues.len()))
    }
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let json = match args.target {
        SchemaTarget::Plan => serde_json::to_string_pretty(&plan_json_schema())?,
        SchemaTarget::Catalog => serde_json::to_string_pretty(&catalog_json_schema())?,
    };
    println!("{json}");
    Ok(())
}

fn log_plan_warnings(warnings: &[ValidationIssue]) {
    for warning in warnings {
        tracing::warn!(
            event = "plan_warning",
            code = %warning.code,
            issue = %warning
        );
    }
}

