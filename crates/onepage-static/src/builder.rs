//! Page builder.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::env::{EnvConfig, EnvError, SiteVars};
use crate::output::{OutputWriter, WrittenFiles, INDEX_FILE};
use crate::postprocess::{CacheBust, PostProcessor};
use crate::templates::{Context, TemplateEngine};

/// Template location relative to the project root.
pub const DEFAULT_TEMPLATE: &str = "src/templates/address-challenge.30-days-of-html.template.html";

/// Configuration for building the page.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root; relative paths below resolve against it
    pub root: PathBuf,

    /// Page template
    pub template: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// HTML-escape interpolated values
    pub escape_html: bool,

    /// Write outputs through temp file + rename
    pub atomic_writes: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output_dir: PathBuf::from("dist"),
            escape_html: false,
            atomic_writes: false,
        }
    }
}

impl BuildConfig {
    fn template_path(&self) -> PathBuf {
        self.root.join(&self.template)
    }

    fn writer(&self) -> OutputWriter {
        OutputWriter {
            output_dir: self.root.join(&self.output_dir),
            root_copy: self.root.join(INDEX_FILE),
            atomic: self.atomic_writes,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Files written
    pub files: WrittenFiles,

    /// Cache-busting stamp applied to assets
    pub stamp: CacheBust,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Failed to read template {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {path}: {source}")]
    TemplateError {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write output: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Single-page static builder.
pub struct StaticBuilder {
    config: BuildConfig,
    post: PostProcessor,
}

impl StaticBuilder {
    /// Create a new builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            post: PostProcessor::new(),
        }
    }

    /// Build with a fresh cache-busting stamp.
    pub fn build(&self, env: &EnvConfig) -> Result<BuildResult, BuildError> {
        self.build_with_stamp(env, CacheBust::now())
    }

    /// Build using `stamp` for every cache-busted reference.
    ///
    /// Required variables are validated before anything is read or written.
    pub fn build_with_stamp(
        &self,
        env: &EnvConfig,
        stamp: CacheBust,
    ) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let site = SiteVars::from_config(env)?;

        let template_path = self.config.template_path();
        tracing::debug!("Processing template: {}", template_path.display());

        let source = fs::read_to_string(&template_path).map_err(|e| BuildError::ReadError {
            path: template_path.display().to_string(),
            source: e,
        })?;

        let template_error = |e: minijinja::Error| BuildError::TemplateError {
            path: template_path.display().to_string(),
            source: e,
        };
        let engine = TemplateEngine::new(source, self.config.escape_html).map_err(template_error)?;
        let html = engine
            .render(&Context::new(env, &site))
            .map_err(template_error)?;

        let html = self.post.process(&html, stamp);

        let files = self.config.writer().write(&html)?;

        Ok(BuildResult {
            files,
            stamp,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
