//! Single-page static build pipeline.
//!
//! Loads site settings from a dotenv file, renders one HTML template, adds
//! cache-busting query strings to stylesheets and scripts, and writes the
//! page to the output directory and the project root.

pub mod builder;
pub mod env;
pub mod output;
pub mod postprocess;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use env::{EnvConfig, EnvError, EnvFiles, EnvMode, SiteVars};
pub use postprocess::CacheBust;
