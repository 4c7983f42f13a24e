//! Concept-map generation and two-phase persistence.
//!
//! Nodes are persisted in one batch to obtain the temp-id to real-id
//! mapping, then edges are resolved against that mapping and persisted
//! in a second batch. An edge whose endpoint never resolved is dropped.
//! This avoids the partial-graph states a flush-per-node loop can leave
//! behind when persistence fails mid-way.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{ConceptGraph, ConceptMapRecord, PersistedNode};
use crate::store::DocumentStore;

use super::error::{ServiceError, ServiceResult};
use super::generation::ContentGenerator;

/// Generates and persists concept maps.
pub struct ConceptMapService {
    store: Arc<dyn DocumentStore>,
    generator: ContentGenerator,
}

impl ConceptMapService {
    pub fn new(store: Arc<dyn DocumentStore>, generator: ContentGenerator) -> Self {
        Self { store, generator }
    }

    /// Generates a graph from `text` and persists it for the user.
    pub async fn generate_and_persist(
        &self,
        user_id: Uuid,
        subject_id: Uuid,
        title: String,
        text: &str,
    ) -> ServiceResult<ConceptMapRecord> {
        let graph = self.generator.generate_concept_graph(text).await?;
        self.persist_graph(user_id, subject_id, title, &graph).await
    }

    /// Persists an already generated graph with the two-phase commit.
    pub async fn persist_graph(
        &self,
        user_id: Uuid,
        subject_id: Uuid,
        title: String,
        graph: &ConceptGraph,
    ) -> ServiceResult<ConceptMapRecord> {
        let record = ConceptMapRecord {
            id: Uuid::new_v4(),
            user_id,
            subject_id,
            title,
            nodes: vec![],
            edges: vec![],
            created_at: Utc::now(),
        };
        let map_id = self.store.insert_concept_map(record).await?;

        // Phase 1: all nodes in one batch; the mapping is the contract
        // for edge resolution.
        let mut mapping: HashMap<String, Uuid> = HashMap::new();
        let nodes: Vec<PersistedNode> = graph
            .nodes
            .iter()
            .map(|node| {
                let id = Uuid::new_v4();
                mapping.insert(node.temp_id.clone(), id);
                PersistedNode {
                    id,
                    label: node.label.clone(),
                    kind: node.kind,
                    x: node.x,
                    y: node.y,
                    description: node.description.clone(),
                    examples: node.examples.clone(),
                    ai_generated: node.ai_generated,
                }
            })
            .collect();
        self.store.insert_concept_nodes(map_id, nodes).await?;

        // Phase 2: edges resolved against the mapping; unresolved
        // endpoints are dropped inside resolve_edges.
        let edges = graph.resolve_edges(&mapping);
        let dropped = graph.edges.len() - edges.len();
        self.store.insert_concept_edges(map_id, edges).await?;

        info!(
            "Persisted concept map {} ({} nodes, {} edges, {} dropped)",
            map_id,
            graph.nodes.len(),
            graph.edges.len() - dropped,
            dropped
        );

        self.store
            .get_concept_map(map_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("concept map {map_id}")))
    }
}
