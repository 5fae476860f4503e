//! Fragment rendering for expanded shortcodes.
//!
//! Templates use `{placeholder}` tokens. Placeholders without a parameter
//! render as empty text.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Template id used for `[caption]` expansion.
pub const ATTACHMENT_TEMPLATE: &str = "attachment";

/// Markup produced for a captioned image.
pub const DEFAULT_ATTACHMENT_TEMPLATE: &str = "<div class=\"cms-attachment {align}\" id=\"{id}\" style=\"width: {width}px;\">{content}<p class=\"cms-attachment-caption\">{caption}</p></div>";

/// Compiled regex for `{placeholder}` tokens.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("valid regex"));

/// Parameters handed to a template.
pub type FragmentParams = BTreeMap<String, String>;

/// Renders a named template with parameters into markup.
pub trait FragmentRenderer: Send + Sync {
    fn render(&self, template_id: &str, params: &FragmentParams) -> Result<String, CoreError>;
}

/// Registry of `{placeholder}` templates keyed by id.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    templates: HashMap<String, String>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new().with_template(ATTACHMENT_TEMPLATE, DEFAULT_ATTACHMENT_TEMPLATE)
    }
}

impl TemplateRenderer {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, id: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(id.into(), template.into());
        self
    }
}

impl FragmentRenderer for TemplateRenderer {
    fn render(&self, template_id: &str, params: &FragmentParams) -> Result<String, CoreError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| CoreError::Render(format!("unknown template '{template_id}'")))?;

        let mut unresolved = Vec::new();
        let text = PLACEHOLDER_RE
            .replace_all(template, |caps: &regex::Captures| match params.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    unresolved.push(caps[1].to_string());
                    String::new()
                }
            })
            .into_owned();

        if !unresolved.is_empty() {
            tracing::debug!(template_id, ?unresolved, "Template placeholders left empty");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn params(pairs: &[(&str, &str)]) -> FragmentParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_placeholders() {
        let renderer = TemplateRenderer::new().with_template("t", "<b>{name}</b> {name}");
        let out = renderer.render("t", &params(&[("name", "x")])).unwrap();
        assert_eq!(out, "<b>x</b> x");
    }

    #[test]
    fn missing_params_render_empty() {
        let renderer = TemplateRenderer::new().with_template("t", "[{a}|{b}]");
        assert_eq!(renderer.render("t", &params(&[("a", "1")])).unwrap(), "[1|]");
    }

    #[test]
    fn unknown_template_is_error() {
        let renderer = TemplateRenderer::new();
        assert_matches!(
            renderer.render("nope", &FragmentParams::new()),
            Err(CoreError::Render(_))
        );
    }

    #[test]
    fn default_registers_attachment() {
        let renderer = TemplateRenderer::default();
        let out = renderer
            .render(
                ATTACHMENT_TEMPLATE,
                &params(&[
                    ("id", "attachment_5"),
                    ("align", "alignleft"),
                    ("width", "300"),
                    ("caption", "A cat"),
                    ("content", "<img src=\"cat.jpg\" />"),
                ]),
            )
            .unwrap();
        assert_eq!(
            out,
            "<div class=\"cms-attachment alignleft\" id=\"attachment_5\" style=\"width: 300px;\"><img src=\"cat.jpg\" /><p class=\"cms-attachment-caption\">A cat</p></div>"
        );
    }
}
