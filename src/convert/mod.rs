//! Reduction of TEI transcriptions to supplied-only `<ab>` documents.
//!
//! The converter walks a TEI tree and reduces it to a string, one rule per
//! tag, then re-parses that string as a fresh `<ab>` document. The only
//! markup that survives is `<supplied>` (restored text), `<alt>` (competing
//! readings inside a restoration) and `<gap />` (lost text of unknown extent).

use std::collections::HashMap;

use indextree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::tree::{Document, Item, ParseOptions, escape_text};

mod brackets;
mod error;
mod handlers;

pub use brackets::normalize_supplied_brackets;
pub use error::{ConvertError, ErrorKind};
pub use handlers::MAX_GAP_QUANTITY;

pub type Handler = fn(&mut Converter, &Document, NodeId) -> Result<String, ConvertError>;

/// Local names with a dedicated rule, in alphabetical order.
pub fn handled_tags() -> impl Iterator<Item = &'static str> {
    handlers::TAG_HANDLERS.iter().map(|(tag, _)| *tag)
}

static SEPARATOR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-- )+").unwrap());

/// How readings of `<app>` and `<choice>` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionContext {
    /// Outside any supplied span: only the preferred reading matters.
    Context,
    /// Inside a supplied span: every reading is a candidate restoration.
    Evaluation,
}

impl ConversionContext {
    pub fn of(doc: &Document, id: NodeId) -> Self {
        if doc.is_inside(id, "supplied") {
            ConversionContext::Evaluation
        } else {
            ConversionContext::Context
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Fail on the first recoverable error instead of logging it.
    pub strict: bool,
}

pub struct Converter {
    handlers: HashMap<&'static str, Handler>,
    config: ConverterConfig,
    errors: Vec<ConvertError>,
    depth: usize,
}

impl Default for Converter {
    fn default() -> Self {
        Converter::new()
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .field("errors", &self.errors)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Converter {
    pub fn new() -> Self {
        Converter::with_config(ConverterConfig::default())
    }

    pub fn strict() -> Self {
        Converter::with_config(ConverterConfig { strict: true })
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Converter {
            handlers: handlers::TAG_HANDLERS.iter().copied().collect(),
            config,
            errors: Vec::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Errors recorded so far, oldest first. They accumulate across calls to
    /// [`Converter::convert`] until taken or cleared.
    pub fn errors(&self) -> &[ConvertError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ConvertError> {
        std::mem::take(&mut self.errors)
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn handles(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Current nesting depth of the reduction. Diagnostic only.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Converts the subtree at `id` into a fresh `<ab>` document.
    pub fn convert(&mut self, doc: &Document, id: NodeId) -> crate::Result<Document> {
        self.depth = 0;
        let text = self.convert_node(doc, id)?;
        Ok(post_process(&text)?)
    }

    /// Reduces the subtree at `id` to its intermediate string form, before
    /// line cleanup and re-parsing. Text is XML-escaped; markup is limited to
    /// what the tag rules emit.
    pub fn convert_node(&mut self, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
        self.depth += 1;
        let result = self.handle_element(doc, id);
        self.depth -= 1;
        result
    }

    fn handle_element(&mut self, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
        let tag = doc.local_name(id);
        tracing::trace!("converting <{}> at depth {}", tag, self.depth);

        match self.handlers.get(tag).copied() {
            Some(handler) => handler(self, doc, id),
            None => {
                self.error(ConvertError::UnhandledTag {
                    tag: tag.to_string(),
                    context: doc.path(id),
                })?;
                self.default_text(doc, id)
            }
        }
    }

    /// Concatenates the conversion of every text run and child in document
    /// order, treating the element itself as transparent.
    pub(crate) fn default_text(&mut self, doc: &Document, id: NodeId) -> Result<String, ConvertError> {
        let mut out = String::new();
        for item in doc.items(id) {
            match item {
                Item::Text(text) => escape_text(text, &mut out),
                Item::Element(child) => out.push_str(&self.convert_node(doc, child)?),
            }
        }
        Ok(out)
    }

    pub(crate) fn error(&mut self, error: ConvertError) -> Result<(), ConvertError> {
        if self.config.strict {
            return Err(error);
        }
        tracing::debug!("{} at {}", error, error.context());
        self.errors.push(error);
        Ok(())
    }
}

/// Drops blank and separator lines, trims lost-character dots from both ends
/// and re-parses the result under an `<ab>` root.
fn post_process(text: &str) -> Result<Document, crate::tree::Error> {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty() && !SEPARATOR_LINE.is_match(line))
        .collect();
    let joined = lines.join("\n");
    let body = joined.trim_matches('.');

    tracing::debug!("post-processed {} lines into {} bytes", lines.len(), body.len());

    Document::parse_with(&format!("<ab>{body}</ab>"), ParseOptions::lenient())
}
