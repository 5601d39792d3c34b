//! Template engine for rendering the page.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, Value};

use crate::env::{EnvConfig, SiteVars};

const TEMPLATE_NAME: &str = "index.html";

/// Variables handed to the template.
///
/// Every configuration entry is passed through, with `base_url` and
/// `asset_url` replaced by their validated values.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, String>);

impl Context {
    /// Build the render context from configuration and site variables.
    pub fn new(config: &EnvConfig, site: &SiteVars) -> Self {
        let mut vars = config.vars().clone();
        vars.insert("base_url".to_string(), site.base_url.clone());
        vars.insert("asset_url".to_string(), site.asset_url.clone());
        Self(vars)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Compile `source` as the page template.
    ///
    /// With `escape_html` off, interpolated values are inserted verbatim so
    /// configuration can carry HTML fragments.
    pub fn new(source: String, escape_html: bool) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.set_auto_escape_callback(move |_| {
            if escape_html {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        env.add_function("eq", eq);
        env.add_template_owned(TEMPLATE_NAME, source)?;

        Ok(Self { env })
    }

    /// Render the page.
    pub fn render(&self, context: &Context) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        tmpl.render(context)
    }
}

/// `eq(a, b)` helper for branching inside the template.
fn eq(a: Value, b: Value) -> bool {
    a == b
}
