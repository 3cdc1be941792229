//! Prompt templates and the loader that reads them from disk
//!
//! Templates use brace placeholders: `{markdown_text}` is replaced by the
//! value mapped to `markdown_text`, while `{{` and `}}` produce literal braces
//! (prompts usually carry a JSON example, which must be escaped).

use crate::error::{ExtractorError, TemplateError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An immutable prompt template with named placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn push_literal<'a>(out: &mut Vec<Segment<'a>>, s: &'a str) {
    if !s.is_empty() {
        out.push(Segment::Literal(s));
    }
}

/// Split template text into literal runs and placeholder names
fn segments(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                push_literal(&mut out, &text[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = text[i + 1..]
                    .find('}')
                    .ok_or(TemplateError::Malformed { brace: '{', offset: i })?;
                let name = &text[i + 1..i + 1 + close];
                if !is_placeholder_name(name) {
                    return Err(TemplateError::Malformed { brace: '{', offset: i });
                }
                push_literal(&mut out, &text[literal_start..i]);
                out.push(Segment::Placeholder(name));
                i += close + 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                push_literal(&mut out, &text[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'}' => return Err(TemplateError::Malformed { brace: '}', offset: i }),
            _ => i += 1,
        }
    }
    push_literal(&mut out, &text[literal_start..]);

    Ok(out)
}

impl Template {
    /// Wrap template text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Raw template text, braces unescaped
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Result<Vec<&str>, TemplateError> {
        let mut names: Vec<&str> = Vec::new();
        for segment in segments(&self.text)? {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder from `values`
    ///
    /// Fails if a referenced placeholder has no value or the template has an
    /// unescaped stray brace. Entries the template does not reference are
    /// ignored.
    pub fn resolve(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut prompt = String::with_capacity(self.text.len());

        for segment in segments(&self.text)? {
            match segment {
                Segment::Literal(s) => prompt.push_str(s),
                Segment::Placeholder(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingPlaceholder(name.to_string()))?;
                    prompt.push_str(value);
                }
            }
        }

        Ok(prompt)
    }
}

/// Reads prompt templates from disk
#[derive(Debug, Clone, Default)]
pub struct PromptLoader {
    root: Option<PathBuf>,
}

impl PromptLoader {
    /// Loader that resolves template ids as plain paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that resolves relative template ids against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Location a template id refers to
    pub fn locate(&self, template_id: impl AsRef<Path>) -> PathBuf {
        let id = template_id.as_ref();
        match &self.root {
            Some(root) if id.is_relative() => root.join(id),
            _ => id.to_path_buf(),
        }
    }

    /// Read a template and trim surrounding whitespace
    pub fn load(&self, template_id: impl AsRef<Path>) -> Result<Template, ExtractorError> {
        let path = self.locate(template_id);

        let text = fs::read_to_string(&path).map_err(|e| ExtractorError::TemplateLoad {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractorError::TemplateLoad {
                path,
                reason: "template is empty".to_string(),
            });
        }

        debug!("Loaded template {} ({} chars)", path.display(), text.len());
        Ok(Template::new(text))
    }
}
