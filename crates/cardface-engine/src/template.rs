//! Field-substitution templates.
//!
//! # Syntax
//!
//! - `{{Field}}` - the field's value
//! - `{{f2:f1:Field}}` - the value passed through `f1`, then `f2`
//! - `{{FrontSide}}` - on the answer, the rendered question
//!
//! Anything else between `{{` and `}}` is a field reference. Conditional
//! sections (`{{#Field}}`, `{{^Field}}`, `{{/Field}}`) are rejected.

use std::collections::HashMap;

use cardface_render::{FieldReplacement, RenderedNode, Side, TemplateError, FRONT_SIDE};

use crate::filters::apply_builtin;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Parsed template piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedNode<'t> {
    Text(&'t str),
    Replacement {
        key: &'t str,
        /// In application order: the filter nearest the field comes first.
        filters: Vec<&'t str>,
    },
}

/// A template split into text and field references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedTemplate<'t> {
    nodes: Vec<ParsedNode<'t>>,
}

impl<'t> ParsedTemplate<'t> {
    pub(crate) fn parse(template: &'t str) -> Result<Self, TemplateError> {
        let mut nodes = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                nodes.push(ParsedNode::Text(&rest[..start]));
            }
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(TemplateError::NoClosingBrackets {
                    context: rest[start..].to_string(),
                });
            };
            nodes.push(parse_tag(after_open[..end].trim())?);
            rest = &after_open[end + CLOSE.len()..];
        }
        if !rest.is_empty() {
            nodes.push(ParsedNode::Text(rest));
        }

        Ok(Self { nodes })
    }

    /// Names of the fields this template reads, `FrontSide` excluded.
    pub(crate) fn field_names(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            ParsedNode::Replacement { key, .. } if *key != FRONT_SIDE => Some(*key),
            _ => None,
        })
    }

    /// Substitutes fields and applies the built-in filters.
    ///
    /// A replacement whose filters are all built-in becomes text. Otherwise
    /// it stays a [`FieldReplacement`] carrying the first unknown filter and
    /// everything after it. `{{FrontSide}}` is always left as a replacement.
    pub(crate) fn render(&self, fields: &HashMap<String, String>) -> Result<Side, TemplateError> {
        let mut out: Vec<RenderedNode> = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            match node {
                ParsedNode::Text(text) => push_text(&mut out, text),
                ParsedNode::Replacement { key, filters } if *key == FRONT_SIDE => {
                    out.push(RenderedNode::Replacement(FieldReplacement {
                        field_name: FRONT_SIDE.to_string(),
                        current_text: String::new(),
                        filters: filters.iter().map(|f| f.to_string()).collect(),
                    }));
                }
                ParsedNode::Replacement { key, filters } => {
                    let value = fields.get(*key).ok_or_else(|| TemplateError::FieldNotFound {
                        field: key.to_string(),
                    })?;
                    render_replacement(&mut out, key, value, filters);
                }
            }
        }

        Ok(Side::new(out))
    }
}

fn parse_tag(inner: &str) -> Result<ParsedNode<'_>, TemplateError> {
    if inner.starts_with(['#', '^', '/']) {
        return Err(TemplateError::SectionsUnsupported {
            tag: format!("{}{}{}", OPEN, inner, CLOSE),
        });
    }

    let mut parts: Vec<&str> = inner.split(':').map(str::trim).collect();
    let key = parts.pop().unwrap_or_default();
    let filters = parts.into_iter().rev().filter(|f| !f.is_empty()).collect();

    Ok(ParsedNode::Replacement { key, filters })
}

fn render_replacement(out: &mut Vec<RenderedNode>, key: &str, value: &str, filters: &[&str]) {
    let mut text = value.to_string();

    for (idx, filter) in filters.iter().enumerate() {
        match apply_builtin(filter, &text) {
            Some(filtered) => text = filtered,
            None => {
                tracing::trace!(field = key, filter = *filter, "deferring unknown filter");
                out.push(RenderedNode::Replacement(FieldReplacement {
                    field_name: key.to_string(),
                    current_text: text,
                    filters: filters[idx..].iter().map(|f| f.to_string()).collect(),
                }));
                return;
            }
        }
    }

    push_text(out, &text);
}

/// Appends text, merging with a preceding text node.
fn push_text(out: &mut Vec<RenderedNode>, text: &str) {
    if let Some(RenderedNode::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(RenderedNode::Text(text.to_string()));
    }
}
