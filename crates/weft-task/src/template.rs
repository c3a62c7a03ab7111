//! `{{port}}` placeholder substitution for prompts.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::types::value_text;

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid"));

/// Replace `{{name}}` with the input of that name.
///
/// Matching is case-sensitive and happens in a single pass, so substituted
/// text is never rescanned. Placeholders with no matching input stay literal.
pub fn render_prompt(template: &str, inputs: &Map<String, Value>) -> String {
  PLACEHOLDER
    .replace_all(template, |caps: &Captures| match inputs.get(&caps[1]) {
      Some(value) => value_text(value),
      None => caps[0].to_string(),
    })
    .into_owned()
}
