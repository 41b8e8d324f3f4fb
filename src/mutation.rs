//! DOM mutation records and the filters that decide whether a batch of
//! mutations should trigger re-analysis.

use serde::{Deserialize, Serialize};

/// Element id of the on-page badge
pub const BADGE_ID: &str = "job-analyzer-indicator";

/// Attribute carried by the badge and all of its descendants
pub const BADGE_ATTR: &str = "data-jobscan-badge";

/// Added elements need more text than this for a batch to count
pub const SIGNIFICANT_TEXT_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Element,
    Text,
}

/// Enough of a DOM node to judge provenance and size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDesc {
    pub kind: NodeKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Node sits inside the badge subtree
    #[serde(default)]
    pub inside_badge: bool,
    /// Text content attached to the node
    #[serde(default)]
    pub text: String,
}

impl NodeDesc {
    pub fn element(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element,
            id: None,
            classes: Vec::new(),
            inside_badge: false,
            text: text.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            ..Self::element(text)
        }
    }

    /// The badge element itself
    pub fn badge() -> Self {
        Self {
            id: Some(BADGE_ID.to_string()),
            classes: vec![BADGE_ID.to_string()],
            inside_badge: true,
            ..Self::element("")
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this node belongs to the badge we render
    pub fn is_badge(&self) -> bool {
        self.inside_badge
            || self.id.as_deref() == Some(BADGE_ID)
            || self.classes.iter().any(|c| c == BADGE_ID)
    }
}

/// One observed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub target: NodeDesc,
    #[serde(default)]
    pub added: Vec<NodeDesc>,
    #[serde(default)]
    pub removed: Vec<NodeDesc>,
}

impl MutationRecord {
    pub fn child_list(target: NodeDesc, added: Vec<NodeDesc>, removed: Vec<NodeDesc>) -> Self {
        Self {
            target,
            added,
            removed,
        }
    }

    fn touches_badge(&self) -> bool {
        self.target.is_badge()
            || self.added.iter().any(NodeDesc::is_badge)
            || self.removed.iter().any(NodeDesc::is_badge)
    }
}

/// True when any record in the batch involves the badge; such batches are
/// ignored entirely so rendering never re-triggers analysis.
pub fn is_self_inflicted(batch: &[MutationRecord]) -> bool {
    batch.iter().any(MutationRecord::touches_badge)
}

/// True when at least one added element carries substantial text
pub fn is_significant(batch: &[MutationRecord]) -> bool {
    batch.iter().flat_map(|m| m.added.iter()).any(|node| {
        node.kind == NodeKind::Element && node.text.trim().chars().count() > SIGNIFICANT_TEXT_CHARS
    })
}
