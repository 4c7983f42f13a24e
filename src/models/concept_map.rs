//! Concept-map graph types.
//!
//! Generated graphs carry caller-local temporary node ids. Persistence is
//! two-phase: nodes are stored in one batch to obtain a temp-id to real-id
//! mapping, then edges are resolved against that mapping. An edge whose
//! endpoint is missing from the mapping is dropped, never stored dangling.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node role within a concept map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Main,
    Sub,
    Detail,
}

/// Relation carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Direct,
    Hierarchical,
    Causal,
}

/// A generated node, identified by a caller-local temporary id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Temporary id, unique within the generated graph only.
    pub temp_id: String,

    pub label: String,

    pub kind: NodeKind,

    pub x: f32,
    pub y: f32,

    pub description: String,

    /// Example phrases attached to the concept.
    pub examples: Vec<String>,

    /// True only when the AI path produced this node.
    pub ai_generated: bool,
}

/// A generated directed edge between two temporary node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub from: String,
    pub to: String,

    pub label: String,

    pub relation: RelationKind,

    /// Relation strength in [0, 1].
    pub strength: f32,
}

/// A generated concept graph, pre-persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptGraph {
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<ConceptEdge>,
}

impl ConceptGraph {
    /// Resolves edges against a temp-id to real-id mapping.
    ///
    /// Edges referencing an id absent from the mapping are dropped.
    pub fn resolve_edges(&self, mapping: &HashMap<String, Uuid>) -> Vec<PersistedEdge> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let from = mapping.get(&edge.from)?;
                let to = mapping.get(&edge.to)?;
                Some(PersistedEdge {
                    id: Uuid::new_v4(),
                    from_node_id: *from,
                    to_node_id: *to,
                    label: edge.label.clone(),
                    relation: edge.relation,
                    strength: edge.strength,
                })
            })
            .collect()
    }

    /// True when every edge endpoint references a node in the graph.
    pub fn is_closed(&self) -> bool {
        let ids: std::collections::HashSet<&str> =
            self.nodes.iter().map(|n| n.temp_id.as_str()).collect();
        self.edges
            .iter()
            .all(|e| ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()))
    }
}

/// A node with its storage-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedNode {
    pub id: Uuid,
    pub label: String,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub description: String,
    pub examples: Vec<String>,
    pub ai_generated: bool,
}

/// An edge with storage-assigned endpoint ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedEdge {
    pub id: Uuid,
    pub from_node_id: Uuid,
    pub to_node_id: Uuid,
    pub label: String,
    pub relation: RelationKind,
    pub strength: f32,
}

/// A persisted concept map owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptMapRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    pub created_at: DateTime<Utc>,
}
