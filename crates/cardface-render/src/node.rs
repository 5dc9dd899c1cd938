//! The node model of a partially rendered card.
//!
//! The rendering engine substitutes fields and applies the filters it knows,
//! then hands back each side as an ordered list of [`RenderedNode`]s: literal
//! text, or a [`FieldReplacement`] still carrying filters the engine did not
//! recognize. The filter chain applier finishes the job.
//!
//! ```text
//! Template:  {{myfilter:hint:text:Back}} answer
//! Engine:    [Replacement{Back, "<hint html>", ["myfilter"]}, Text(" answer")]
//! ```
//!
//! Nodes deserialize from the engine's wire shape:
//!
//! ```json
//! [{"text": "Q: "}, {"replacement": {"field_name": "Front", "current_text": "2+2", "filters": []}}]
//! ```

use serde::{Deserialize, Serialize};

/// Field name that stands for the rendered question on the answer side.
pub const FRONT_SIDE: &str = "FrontSide";

/// A field substitution with filters still to apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldReplacement {
    pub field_name: String,
    /// The field's value after the engine's own filters ran.
    pub current_text: String,
    /// Filters the engine did not recognize, in application order.
    #[serde(default)]
    pub filters: Vec<String>,
}

impl FieldReplacement {
    pub fn new(field_name: impl Into<String>, current_text: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            current_text: current_text.into(),
            filters: Vec::new(),
        }
    }

    /// Appends a filter to the end of the chain.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// True for the answer side's `{{FrontSide}}` placeholder.
    pub fn is_front_side(&self) -> bool {
        self.field_name == FRONT_SIDE
    }
}

/// One piece of a partially rendered side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderedNode {
    /// Fully resolved text.
    Text(String),
    /// A field value awaiting custom filters.
    Replacement(FieldReplacement),
}

impl From<&str> for RenderedNode {
    fn from(text: &str) -> Self {
        RenderedNode::Text(text.to_string())
    }
}

impl From<String> for RenderedNode {
    fn from(text: String) -> Self {
        RenderedNode::Text(text)
    }
}

impl From<FieldReplacement> for RenderedNode {
    fn from(replacement: FieldReplacement) -> Self {
        RenderedNode::Replacement(replacement)
    }
}

/// The ordered nodes for one face of a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Side {
    nodes: Vec<RenderedNode>,
}

impl Side {
    pub fn new(nodes: Vec<RenderedNode>) -> Self {
        Self { nodes }
    }

    /// A side consisting of a single literal.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            nodes: vec![RenderedNode::Text(text.into())],
        }
    }

    /// Appends a node.
    pub fn push(&mut self, node: impl Into<RenderedNode>) {
        self.nodes.push(node.into());
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the text when the side is exactly one literal node.
    pub fn as_fully_rendered(&self) -> Option<&str> {
        match self.nodes.as_slice() {
            [RenderedNode::Text(text)] => Some(text.as_str()),
            _ => None,
        }
    }

    /// Iterates over the replacement nodes.
    pub fn replacements(&self) -> impl Iterator<Item = &FieldReplacement> {
        self.nodes.iter().filter_map(|node| match node {
            RenderedNode::Replacement(r) => Some(r),
            RenderedNode::Text(_) => None,
        })
    }
}

impl FromIterator<RenderedNode> for Side {
    fn from_iter<I: IntoIterator<Item = RenderedNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Both sides of a card as returned by the partial render gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartiallyRenderedCard {
    #[serde(rename = "question_nodes")]
    pub qnodes: Side,
    #[serde(rename = "answer_nodes")]
    pub anodes: Side,
}

impl PartiallyRenderedCard {
    pub fn new(qnodes: Side, anodes: Side) -> Self {
        Self { qnodes, anodes }
    }

    /// Decodes the engine's JSON output.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_rendered_detection() {
        assert_eq!(Side::text("done").as_fully_rendered(), Some("done"));
        assert_eq!(Side::default().as_fully_rendered(), None);

        let side = Side::new(vec!["a".into(), "b".into()]);
        assert_eq!(side.as_fully_rendered(), None);

        let side = Side::new(vec![FieldReplacement::new("Front", "x").into()]);
        assert_eq!(side.as_fully_rendered(), None);
    }

    #[test]
    fn test_replacements_iter() {
        let mut side = Side::text("Q: ");
        side.push(FieldReplacement::new("Front", "2+2").with_filter("upper"));
        side.push("?");
        let names: Vec<_> = side.replacements().map(|r| r.field_name.as_str()).collect();
        assert_eq!(names, vec!["Front"]);
        assert_eq!(side.len(), 3);
    }

    #[test]
    fn test_front_side_detection() {
        assert!(FieldReplacement::new("FrontSide", "").is_front_side());
        assert!(!FieldReplacement::new("Front", "").is_front_side());
    }

    #[test]
    fn test_from_engine_json() {
        let json = r#"{
            "question_nodes": [
                {"text": "Q: "},
                {"replacement": {
                    "field_name": "Front",
                    "current_text": "2+2",
                    "filters": ["upper", "rev"]
                }}
            ],
            "answer_nodes": [
                {"replacement": {"field_name": "FrontSide", "current_text": ""}}
            ]
        }"#;
        let card = PartiallyRenderedCard::from_json(json).unwrap();

        assert_eq!(card.qnodes.nodes()[0], RenderedNode::Text("Q: ".into()));
        let front = card.qnodes.replacements().next().unwrap();
        assert_eq!(front.filters, vec!["upper", "rev"]);
        let back = card.anodes.replacements().next().unwrap();
        assert!(back.is_front_side());
        assert!(back.filters.is_empty());
    }
}
