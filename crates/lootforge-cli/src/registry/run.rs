use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use lootforge_core::{CATALOG_VERSION, CatalogLayer, CatalogSnapshot};
use lootforge_generate::GenerationResult;
use lootforge_plan::LootPlan;
use serde::Serialize;

use super::{RegistryError, RegistryResult};

/// Inputs of one `lootforge generate` invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub plan_path: Option<PathBuf>,
    pub plan: LootPlan,
}

/// Contents of `config.json`; enough to replay the run.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub catalog_version: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<String>,
    pub plan: LootPlan,
    pub git: GitInfo,
}

#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Artifact locations inside one run directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub logs_path: PathBuf,
    pub patch_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root).map_err(RegistryError::io(&root))?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        catalog_version: CATALOG_VERSION.to_string(),
        catalog: ctx.catalog_path.display().to_string(),
        plan_path: ctx.plan_path.as_ref().map(|path| path.display().to_string()),
        plan: ctx.plan.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)
        .map_err(RegistryError::io(&logs_path))?;

    Ok(RunPaths {
        patch_path: root.join("patch.json"),
        report_path: root.join("generation_report.json"),
        root,
        logs_path,
    })
}

/// Write the patch layer into the run directory and, optionally, `out_path`.
/// With `merged` the out file holds every layer instead of the patch only.
pub fn write_patch(
    paths: &RunPaths,
    patch: &CatalogLayer,
    merged: Option<&CatalogSnapshot>,
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.patch_path, patch)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent).map_err(RegistryError::io(parent))?;
            }
        }
        match merged {
            Some(snapshot) => write_json(out_path, snapshot)?,
            None => write_json(out_path, patch)?,
        }
    }

    Ok(())
}

pub fn write_generation_report(paths: &RunPaths, result: &GenerationResult) -> RegistryResult<()> {
    write_json(&paths.report_path, result)
}

/// Best effort: both fields stay `None` outside a git checkout.
pub fn collect_git_info() -> GitInfo {
    let commit = git(&["rev-parse", "HEAD"])
        .map(|stdout| String::from_utf8_lossy(&stdout).trim().to_string())
        .filter(|hash| !hash.is_empty());
    let dirty = git(&["status", "--porcelain"]).map(|stdout| !stdout.is_empty());
    GitInfo { commit, dirty }
}

fn git(args: &[&str]) -> Option<Vec<u8>> {
    let output = Command::new("git").args(args).output().ok()?;
    output.status.success().then_some(output.stdout)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(RegistryError::io(path))?;
    serde_json::to_writer_pretty(file, value).map_err(|source| RegistryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_run_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("lootforge_cli_runs_{}", uuid::Uuid::new_v4()));
        dir
    }

    fn context(run_dir: PathBuf) -> RunContext {
        RunContext {
            run_id: "abc".to_string(),
            started_at: DateTime::parse_from_rfc3339("2026-03-01T12:30:00Z")
                .expect("timestamp")
                .with_timezone(&Utc),
            run_dir,
            catalog_path: PathBuf::from("catalog.json"),
            plan_path: None,
            plan: LootPlan::default(),
        }
    }

    #[test]
    fn start_run_creates_timestamped_directory() {
        let ctx = context(temp_run_dir());
        let paths = start_run(&ctx).expect("start run");

        assert!(paths.root.ends_with("2026-03-01T12-30-00Z__run_abc"));
        assert!(paths.logs_path.exists());

        let config: serde_json::Value = serde_json::from_slice(
            &std::fs::read(paths.root.join("config.json")).expect("read config"),
        )
        .expect("parse config");
        assert_eq!(config["run_id"], "abc");
        assert_eq!(config["plan"]["total_budget"], 240);
        assert!(config.get("plan_path").is_none());
    }

    #[test]
    fn write_patch_copies_to_out_path() {
        let ctx = context(temp_run_dir());
        let paths = start_run(&ctx).expect("start run");
        let out = ctx.run_dir.join("nested").join("patch.json");
        let patch = CatalogLayer {
            name: "LootforgePatch".to_string(),
            ..CatalogLayer::default()
        };

        write_patch(&paths, &patch, None, Some(&out)).expect("write patch");

        let written: CatalogLayer =
            serde_json::from_slice(&std::fs::read(&out).expect("read out")).expect("parse out");
        assert_eq!(written.name, "LootforgePatch");
        assert!(paths.patch_path.exists());
    }
}
