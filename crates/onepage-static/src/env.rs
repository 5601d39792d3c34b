//! Environment configuration loading and validation.
//!
//! Site settings live in dotenv files (`.env.gh`, `.env.domain`). The chosen
//! file is merged under the process environment into an [`EnvConfig`], which
//! is then handed explicitly to the renderer. The process environment itself
//! is never modified.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Variable that overrides which env file is loaded.
pub const CONFIG_PATH_VAR: &str = "DOTENV_CONFIG_PATH";

/// Default env file, used for every mode except `domain`.
pub const DEFAULT_ENV_FILE: &str = ".env.gh";

/// Env file used in `domain` mode.
pub const DOMAIN_ENV_FILE: &str = ".env.domain";

/// Fallback for `asset_url` when neither the env file nor the process sets it.
pub const DEFAULT_ASSET_URL: &str = "/img/";

/// Which env file the build should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvMode {
    /// GitHub Pages style build
    #[default]
    Default,
    /// Custom domain build
    Domain,
}

impl EnvMode {
    /// Parse the CLI mode argument. Only `domain` (any case) has meaning.
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            Some(mode) if mode.eq_ignore_ascii_case("domain") => Self::Domain,
            _ => Self::Default,
        }
    }
}

/// File names for each mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFiles {
    pub default_file: PathBuf,
    pub domain_file: PathBuf,
}

impl Default for EnvFiles {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from(DEFAULT_ENV_FILE),
            domain_file: PathBuf::from(DOMAIN_ENV_FILE),
        }
    }
}

/// Pick the env file to load.
///
/// A non-empty `override_path` (the value of `DOTENV_CONFIG_PATH`) always wins.
/// Relative paths are resolved against `root`.
pub fn resolve_env_path(
    root: &Path,
    mode: EnvMode,
    files: &EnvFiles,
    override_path: Option<&str>,
) -> PathBuf {
    let chosen = match override_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => match mode {
            EnvMode::Domain => files.domain_file.clone(),
            EnvMode::Default => files.default_file.clone(),
        },
    };

    if chosen.is_absolute() {
        chosen
    } else {
        root.join(chosen)
    }
}

/// Snapshot of the process environment, skipping entries that are not UTF-8.
pub fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Errors from loading or validating environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Failed to read env file {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("base_url and asset_url must be set (non-empty) in your .env.gh or .env.domain file.")]
    MissingRequired,
}

/// Key/value configuration for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    vars: BTreeMap<String, String>,
}

impl EnvConfig {
    /// Load `path` and overlay `process_vars` on top of it.
    ///
    /// Keys already present in the process environment keep their value; the
    /// file only fills in the rest. A missing file is tolerated.
    pub fn load<I>(path: &Path, process_vars: I) -> Result<Self, EnvError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars = BTreeMap::new();

        if path.exists() {
            let read_error = |message: String| EnvError::ReadError {
                path: path.display().to_string(),
                message,
            };

            let content = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
            let normalized = content
                .lines()
                .map(quote_bare_value)
                .collect::<Vec<_>>()
                .join("\n");

            for item in dotenv::from_read_iter(normalized.as_bytes()) {
                let (key, value) = item.map_err(|e| read_error(e.to_string()))?;
                vars.insert(key, value);
            }
            tracing::debug!("Loaded {} entries from {}", vars.len(), path.display());
        } else {
            tracing::warn!("Env file not found: {}", path.display());
        }

        vars.extend(process_vars);

        Ok(Self { vars })
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// All entries, sorted by key.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

/// Quote an unquoted value so the dotenv parser reads it literally.
///
/// Bare values may contain spaces (`title=30 Days of HTML`); a trailing
/// ` # comment` is dropped. Blank lines, comments, quoted values and lines
/// without `=` pass through untouched.
fn quote_bare_value(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Cow::Borrowed(line);
    }
    let Some((key, value)) = line.split_once('=') else {
        return Cow::Borrowed(line);
    };

    let mut value = value.trim();
    if value.is_empty() || value.starts_with('"') || value.starts_with('\'') {
        return Cow::Borrowed(line);
    }
    if let Some(pos) = value.find(" #") {
        value = value[..pos].trim_end();
    }

    let key = key.trim_end();
    if value.contains('\'') {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$");
        Cow::Owned(format!("{key}=\"{escaped}\""))
    } else {
        Cow::Owned(format!("{key}='{value}'"))
    }
}

impl FromIterator<(String, String)> for EnvConfig {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// The two variables every build requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteVars {
    pub base_url: String,
    pub asset_url: String,
}

impl SiteVars {
    /// Extract and normalize `base_url` and `asset_url`.
    pub fn from_config(config: &EnvConfig) -> Result<Self, EnvError> {
        let mut base_url = config.get("base_url").unwrap_or_default().to_string();
        if base_url.len() > 1 && base_url.ends_with('/') {
            base_url.pop();
        }

        let asset_url = config
            .get("asset_url")
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ASSET_URL)
            .to_string();

        if base_url.trim().is_empty() || asset_url.trim().is_empty() {
            return Err(EnvError::MissingRequired);
        }

        Ok(Self {
            base_url,
            asset_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn config(pairs: &[(&str, &str)]) -> EnvConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_mode_case_insensitively() {
        assert_eq!(EnvMode::parse(Some("domain")), EnvMode::Domain);
        assert_eq!(EnvMode::parse(Some("DoMaIn")), EnvMode::Domain);
        assert_eq!(EnvMode::parse(Some("gh")), EnvMode::Default);
        assert_eq!(EnvMode::parse(Some("")), EnvMode::Default);
        assert_eq!(EnvMode::parse(None), EnvMode::Default);
    }

    #[test]
    fn resolves_env_file_by_mode() {
        let root = Path::new("/project");
        let files = EnvFiles::default();

        assert_eq!(
            resolve_env_path(root, EnvMode::Default, &files, None),
            PathBuf::from("/project/.env.gh")
        );
        assert_eq!(
            resolve_env_path(root, EnvMode::Domain, &files, None),
            PathBuf::from("/project/.env.domain")
        );
    }

    #[test]
    fn override_path_wins_over_mode() {
        let root = Path::new("/project");
        let files = EnvFiles::default();

        assert_eq!(
            resolve_env_path(root, EnvMode::Domain, &files, Some(".env.staging")),
            PathBuf::from("/project/.env.staging")
        );
        assert_eq!(
            resolve_env_path(root, EnvMode::Default, &files, Some("/etc/site.env")),
            PathBuf::from("/etc/site.env")
        );
        assert_eq!(
            resolve_env_path(root, EnvMode::Domain, &files, Some("")),
            PathBuf::from("/project/.env.domain")
        );
    }

    #[test]
    fn process_values_win_over_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(".env.gh");
        fs::write(&path, "base_url=https://file.example/\ntitle=From file\n").unwrap();

        let process = vec![("base_url".to_string(), "https://process.example".to_string())];
        let config = EnvConfig::load(&path, process).unwrap();

        assert_eq!(config.get("base_url"), Some("https://process.example"));
        assert_eq!(config.get("title"), Some("From file"));
    }

    #[test]
    fn accepts_bare_values_with_spaces() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(".env.gh");
        fs::write(
            &path,
            "# site settings\n\
             site_title=30 Days of HTML\n\
             export author=Jo Doe\n\
             base_url=\"https://x.example/\"\n\
             motto='keep it simple'\n\
             note=It's fine # trailing comment\n\
             price=$5 a month\n\
             empty=\n",
        )
        .unwrap();

        let config = EnvConfig::load(&path, Vec::new()).unwrap();

        assert_eq!(config.get("site_title"), Some("30 Days of HTML"));
        assert_eq!(config.get("author"), Some("Jo Doe"));
        assert_eq!(config.get("base_url"), Some("https://x.example/"));
        assert_eq!(config.get("motto"), Some("keep it simple"));
        assert_eq!(config.get("note"), Some("It's fine"));
        assert_eq!(config.get("price"), Some("$5 a month"));
        assert_eq!(config.get("empty"), Some(""));
    }

    #[test]
    fn quotes_only_bare_values() {
        assert_eq!(quote_bare_value("title=From file"), "title='From file'");
        assert_eq!(quote_bare_value("export a = b c "), "export a='b c'");
        assert_eq!(quote_bare_value("q=\"x y\""), "q=\"x y\"");
        assert_eq!(quote_bare_value("# c=d e"), "# c=d e");
        assert_eq!(quote_bare_value("empty="), "empty=");
        assert_eq!(quote_bare_value("no equals"), "no equals");
    }

    #[test]
    fn missing_file_yields_process_vars() {
        let temp = tempdir().unwrap();
        let process = vec![("base_url".to_string(), "/".to_string())];

        let config = EnvConfig::load(&temp.path().join(".env.none"), process).unwrap();

        assert_eq!(config.vars().len(), 1);
        assert_eq!(config.get("base_url"), Some("/"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(".env.gh");
        fs::write(&path, "this line has no equals sign\n").unwrap();

        let result = EnvConfig::load(&path, Vec::new());

        assert!(matches!(result, Err(EnvError::ReadError { .. })));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let vars = SiteVars::from_config(&config(&[("base_url", "https://example.com/")])).unwrap();
        assert_eq!(vars.base_url, "https://example.com");

        let vars = SiteVars::from_config(&config(&[("base_url", "/")])).unwrap();
        assert_eq!(vars.base_url, "/");
    }

    #[test]
    fn asset_url_defaults_to_img() {
        let vars = SiteVars::from_config(&config(&[("base_url", "/site")])).unwrap();
        assert_eq!(vars.asset_url, "/img/");

        let vars =
            SiteVars::from_config(&config(&[("base_url", "/site"), ("asset_url", "/static/")]))
                .unwrap();
        assert_eq!(vars.asset_url, "/static/");
    }

    #[test]
    fn rejects_blank_required_values() {
        for pairs in [
            vec![],
            vec![("base_url", "")],
            vec![("base_url", "   ")],
            vec![("base_url", "/"), ("asset_url", "  ")],
        ] {
            let result = SiteVars::from_config(&config(&pairs));
            assert!(matches!(result, Err(EnvError::MissingRequired)));
        }
    }

    #[test]
    fn missing_required_message_names_both_keys() {
        let message = EnvError::MissingRequired.to_string();
        assert!(message.contains("base_url"));
        assert!(message.contains("asset_url"));
    }
}
