//! Page build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use onepage_static::env::{resolve_env_path, CONFIG_PATH_VAR};
use onepage_static::{BuildConfig, EnvConfig, EnvFiles, EnvMode, StaticBuilder};
use serde::Deserialize;

/// Configuration file structure (onepage.toml).
#[derive(Debug, Deserialize, Default, PartialEq)]
struct ConfigFile {
    #[serde(default)]
    build: BuildSettings,
    #[serde(default)]
    env: EnvSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
struct BuildSettings {
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_output")]
    output: String,
    #[serde(default)]
    escape_html: bool,
    #[serde(default)]
    atomic_writes: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
struct EnvSettings {
    #[serde(default = "default_env_file")]
    default_file: String,
    #[serde(default = "default_domain_file")]
    domain_file: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            template: default_template(),
            output: default_output(),
            escape_html: false,
            atomic_writes: false,
        }
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            default_file: default_env_file(),
            domain_file: default_domain_file(),
        }
    }
}

fn default_template() -> String {
    onepage_static::builder::DEFAULT_TEMPLATE.to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_env_file() -> String {
    onepage_static::env::DEFAULT_ENV_FILE.to_string()
}
fn default_domain_file() -> String {
    onepage_static::env::DOMAIN_ENV_FILE.to_string()
}

/// Options for one build, as given on the command line.
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub mode: Option<String>,
    pub root: PathBuf,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub escape_html: bool,
    pub atomic: bool,
}

/// Load configuration from onepage.toml if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Run the build command.
pub fn run(args: BuildArgs, process_vars: Vec<(String, String)>) -> Result<()> {
    let config_path = args.root.join(&args.config);
    let file_config = load_config(&config_path)?;

    let mode = EnvMode::parse(args.mode.as_deref());
    let files = EnvFiles {
        default_file: PathBuf::from(&file_config.env.default_file),
        domain_file: PathBuf::from(&file_config.env.domain_file),
    };
    let override_path = process_vars
        .iter()
        .find(|(k, _)| k == CONFIG_PATH_VAR)
        .map(|(_, v)| v.clone());
    let env_path = resolve_env_path(&args.root, mode, &files, override_path.as_deref());

    let env = EnvConfig::load(&env_path, process_vars)?;
    tracing::debug!(
        "base_url: {:?} | asset_url: {:?} | env file: {}",
        env.get("base_url"),
        env.get("asset_url"),
        env_path.display()
    );

    let config = BuildConfig {
        root: args.root,
        template: PathBuf::from(&file_config.build.template),
        output_dir: args
            .output
            .unwrap_or_else(|| PathBuf::from(&file_config.build.output)),
        escape_html: args.escape_html || file_config.build.escape_html,
        atomic_writes: args.atomic || file_config.build.atomic_writes,
    };

    let result = StaticBuilder::new(config).build(&env)?;

    tracing::info!(
        "Done in {}ms (cache stamp {})",
        result.duration_ms,
        result.stamp
    );

    Ok(())
}
