use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::args::CliArgs;
use covary_checker::OverridePolicy;

pub const CONFIG_FILE_NAME: &str = "covary.json";

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// Contents of a `covary.json` project file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub assembly: Option<PathBuf>,
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
    #[serde(default)]
    pub dependency_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub allow_interface_covariance: Option<bool>,
}

impl ProjectConfig {
    /// Make every path relative to `base`.
    fn rebase(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.assembly = self.assembly.map(join);
        self.dependencies = self.dependencies.into_iter().map(join).collect();
        self.dependency_dirs = self.dependency_dirs.into_iter().map(join).collect();
        self
    }
}

pub fn parse_config(source: &str) -> Result<ProjectConfig> {
    serde_json::from_str(source).context("failed to parse covary.json")
}

/// `path` itself, or `path/covary.json` when `path` is a directory.
pub fn config_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Load a project file. Relative paths inside it are resolved against the
/// directory containing the file.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    let config = parse_config(&source)
        .with_context(|| format!("failed to load project file: {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.rebase(base))
}

/// Everything a run needs, after merging the project file and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub assembly: Option<PathBuf>,
    pub dependencies: Vec<PathBuf>,
    pub dependency_dirs: Vec<PathBuf>,
    pub policy: OverridePolicy,
}

impl ResolvedOptions {
    pub fn require_assembly(&self) -> Result<&Path> {
        match self.assembly.as_deref() {
            Some(path) => Ok(path),
            None => bail!(
                "no assembly to check: pass --assembly or a {CONFIG_FILE_NAME} \
                 with an \"assembly\" entry"
            ),
        }
    }
}

/// Merge the project file (explicit `--project`, or `covary.json` in `cwd`
/// when no assembly was given) with CLI flags. Flags win; dependency lists
/// are concatenated.
pub fn resolve_options(args: &CliArgs, cwd: &Path) -> Result<ResolvedOptions> {
    let config = match &args.project {
        Some(project) => {
            let project = if project.is_absolute() {
                project.clone()
            } else {
                cwd.join(project)
            };
            let path = config_path(&project);
            if !path.is_file() {
                bail!("project file not found: {}", path.display());
            }
            load_config(&path)?
        }
        None => {
            let implicit = cwd.join(CONFIG_FILE_NAME);
            if args.assembly.is_none() && implicit.is_file() {
                load_config(&implicit)?
            } else {
                ProjectConfig::default()
            }
        }
    };

    let from_cwd = |p: &PathBuf| if p.is_absolute() { p.clone() } else { cwd.join(p) };

    let assembly = args.assembly.as_ref().map(from_cwd).or(config.assembly);
    let mut dependencies = config.dependencies;
    dependencies.extend(args.dependencies.iter().map(from_cwd));
    let mut dependency_dirs = config.dependency_dirs;
    dependency_dirs.extend(args.dependency_dirs.iter().map(from_cwd));

    let allow_interface_covariance = args
        .allow_interface_covariance
        .or(config.policy.allow_interface_covariance)
        .unwrap_or(false);

    Ok(ResolvedOptions {
        assembly,
        dependencies,
        dependency_dirs,
        policy: OverridePolicy::new().with_allow_interface_covariance(allow_interface_covariance),
    })
}
