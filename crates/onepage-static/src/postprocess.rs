//! Text rewrites applied to the rendered page.
//!
//! Both passes are plain regex matches over the HTML. Attributes must be
//! double-quoted and written exactly as `href="…css"` / `src="…js"` to be
//! picked up; anything else passes through unchanged.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

/// Per-build cache-busting stamp, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBust(pub u64);

impl CacheBust {
    /// Stamp for the current moment.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self(millis)
    }
}

impl fmt::Display for CacheBust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compiled rewrite patterns.
pub struct PostProcessor {
    stylesheet: Regex,
    script: Regex,
    notice: Regex,
}

impl PostProcessor {
    pub fn new() -> Self {
        Self {
            stylesheet: Regex::new(r#"(href="[^"?]+\.css)""#).expect("valid stylesheet pattern"),
            script: Regex::new(r#"(src="[^"?]+\.js)""#).expect("valid script pattern"),
            notice: Regex::new(
                r"(?s)<!--\s*IMPORTANT: This is a TEMPLATE file!.*?DO NOT edit index\.html directly - it gets overwritten!\s*-->",
            )
            .expect("valid notice pattern"),
        }
    }

    /// Run every rewrite in order.
    pub fn process(&self, html: &str, stamp: CacheBust) -> String {
        let busted = self.cache_bust(html, stamp);
        self.strip_template_notice(&busted)
    }

    /// Append `?v=<stamp>` to local stylesheet and script references that
    /// have no query string.
    pub fn cache_bust(&self, html: &str, stamp: CacheBust) -> String {
        let replacement = format!("${{1}}?v={}\"", stamp);
        let html = self.stylesheet.replace_all(html, replacement.as_str());
        self.script
            .replace_all(&html, replacement.as_str())
            .into_owned()
    }

    /// Remove the first "this is a template" warning comment.
    pub fn strip_template_notice(&self, html: &str) -> String {
        self.notice.replace(html, "").into_owned()
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}
