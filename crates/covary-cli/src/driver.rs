use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{CONFIG_FILE_NAME, ResolvedOptions};
use covary_checker::{CheckResult, OverrideChecker};
use covary_solver::{
    Assembly, CovarianceExplanation, DependencyClosure, TypeReference, explain_covariance,
    make_resolver, render_optional,
};

/// Read and parse one interchange file.
pub fn load_assembly(path: &Path) -> Result<Assembly> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assembly: {}", path.display()))?;
    let assembly = Assembly::from_json_str(&text)
        .with_context(|| format!("failed to parse assembly: {}", path.display()))?;
    debug!(
        path = %path.display(),
        name = %assembly.name,
        types = assembly.types.len(),
        "loaded assembly"
    );
    Ok(assembly)
}

/// `*.json` files under `dirs`, sorted per directory. Project files and
/// anything in `exclude` are skipped.
pub fn collect_dependency_files(dirs: &[PathBuf], exclude: &[&Path]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            bail!("dependency directory not found: {}", dir.display());
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry
                .with_context(|| format!("failed to read dependency directory {}", dir.display()))?;
            let path = entry.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let is_project = path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME);
            if entry.file_type().is_file() && is_json && !is_project && !exclude.contains(&path) {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Load every dependency named directly or found in a dependency directory.
pub fn load_closure(options: &ResolvedOptions) -> Result<DependencyClosure> {
    let exclude: Vec<&Path> = options.assembly.as_deref().into_iter().collect();
    let mut paths = options.dependencies.clone();
    paths.extend(collect_dependency_files(&options.dependency_dirs, &exclude)?);

    let mut closure = DependencyClosure::new();
    for path in &paths {
        let assembly = load_assembly(path)?;
        if closure.find(&assembly.name).is_some() {
            debug!(name = %assembly.name, path = %path.display(), "duplicate dependency ignored");
            continue;
        }
        closure.push(assembly);
    }
    Ok(closure)
}

/// Result of checking one assembly.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub assembly: String,
    pub error_count: usize,
    #[serde(flatten)]
    pub result: CheckResult,
}

pub fn run_check(options: &ResolvedOptions) -> Result<CheckOutcome> {
    let assembly = load_assembly(options.require_assembly()?)?;
    let closure = load_closure(options)?;
    info!(
        assembly = %assembly.name,
        dependencies = closure.len(),
        allow_interface_covariance = options.policy.allow_interface_covariance,
        "checking overrides"
    );

    let result = OverrideChecker::new(&assembly, &closure, options.policy).check_assembly();
    Ok(CheckOutcome {
        assembly: assembly.name.clone(),
        error_count: result.error_count(),
        result,
    })
}

/// Parse a query operand: interchange JSON for a type reference, or `void`.
pub fn parse_type_reference(text: &str) -> Result<Option<TypeReference>> {
    if text.trim() == "void" {
        return Ok(None);
    }
    let type_ref: TypeReference = serde_json::from_str(text)
        .with_context(|| format!("invalid type reference: {text}"))?;
    Ok(Some(type_ref))
}

/// Result of a single `--sub`/`--super` query.
#[derive(Debug, Serialize)]
pub struct QueryOutcome {
    pub subtype: String,
    pub supertype: String,
    #[serde(flatten)]
    pub explanation: CovarianceExplanation,
}

/// Answer one covariance query against the configured assemblies. Without an
/// assembly only the dependency closure is visible.
pub fn run_query(
    options: &ResolvedOptions,
    subtype: &str,
    supertype: &str,
) -> Result<QueryOutcome> {
    let sub = parse_type_reference(subtype)?;
    let sup = parse_type_reference(supertype)?;

    let assembly = match options.assembly.as_deref() {
        Some(path) => load_assembly(path)?,
        None => Assembly::new(""),
    };
    let closure = load_closure(options)?;
    let resolver = make_resolver(&assembly, &closure);

    Ok(QueryOutcome {
        subtype: render_optional(sub.as_ref()),
        supertype: render_optional(sup.as_ref()),
        explanation: explain_covariance(sub.as_ref(), sup.as_ref(), &resolver),
    })
}
