//! Quiz/exam question and concept-map generation.
//!
//! AI mode sends one prompt describing the exact JSON shape and parses
//! the reply strictly: any missing key, wrong type or malformed structure
//! discards the reply entirely and the deterministic fallback runs
//! instead. A partially valid AI structure is never returned. Output is
//! marked `ai_generated` only when the AI path actually produced it.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::llm::{ChatProvider, LlmError};
use crate::models::{
    ConceptEdge, ConceptGraph, ConceptNode, CorrectAnswer, Difficulty, GeneratedQuestion,
    NodeKind, QuestionKind, RelationKind,
};

use super::analysis::{tokenize, truncate_chars};
use super::error::{ServiceError, ServiceResult};

/// Character budget for content embedded in generation prompts.
const CONTENT_CHAR_LIMIT: usize = 3000;

/// Minimum sentence length for fallback questions.
const MIN_SENTENCE_LEN: usize = 20;

/// Minimum word length for fallback concept nodes.
const CONCEPT_WORD_MIN_LEN: usize = 4;

/// Maximum nodes in a fallback concept graph.
const CONCEPT_NODE_LIMIT: usize = 10;

/// Grid columns for fallback node layout.
const CONCEPT_GRID_COLUMNS: usize = 3;

const QUESTIONS_SYSTEM_PROMPT: &str =
    "You are an expert educator creating quiz questions. Always return valid JSON format.";

const CONCEPT_MAP_SYSTEM_PROMPT: &str =
    "You are an expert educator creating concept maps. Always return valid JSON format.";

/// Generates structured study content from extracted text.
pub struct ContentGenerator {
    chat: Option<Arc<dyn ChatProvider>>,
}

impl ContentGenerator {
    /// Creates a generator. `None` selects fallback mode for every call.
    pub fn new(chat: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { chat }
    }

    /// Generates up to `count` questions from `text`.
    ///
    /// Returns `ServiceError::Validation` for empty input; AI-backend
    /// failures fall back to the deterministic generator and never
    /// surface.
    pub async fn generate_questions(
        &self,
        text: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> ServiceResult<Vec<GeneratedQuestion>> {
        if text.trim().is_empty() {
            return Err(ServiceError::Validation(
                "no content available for question generation".to_string(),
            ));
        }

        if let Some(chat) = &self.chat {
            match self.ai_questions(chat.as_ref(), text, difficulty, count).await {
                Ok(questions) => return Ok(questions),
                Err(e) => warn!("AI question generation failed, using fallback: {}", e),
            }
        }

        Ok(fallback_questions(text, difficulty, count))
    }

    /// Generates a concept graph from `text`.
    pub async fn generate_concept_graph(&self, text: &str) -> ServiceResult<ConceptGraph> {
        if text.trim().is_empty() {
            return Err(ServiceError::Validation(
                "no content available for concept map generation".to_string(),
            ));
        }

        if let Some(chat) = &self.chat {
            match self.ai_concept_graph(chat.as_ref(), text).await {
                Ok(graph) => return Ok(graph),
                Err(e) => warn!("AI concept map generation failed, using fallback: {}", e),
            }
        }

        Ok(fallback_concept_graph(text))
    }

    async fn ai_questions(
        &self,
        chat: &dyn ChatProvider,
        text: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<GeneratedQuestion>, LlmError> {
        let prompt = format!(
            r#"Generate {count} quiz questions from the following content.
Difficulty level: {difficulty}
Return the questions in JSON format with this structure:
[
    {{
        "type": "single",
        "question": "Question text",
        "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
        "correct_answer": 0,
        "explanation": "Explanation of the correct answer",
        "difficulty": "{difficulty}",
        "points": 1
    }}
]

Content:
{content}"#,
            count = count,
            difficulty = difficulty.as_str(),
            content = truncate_chars(text, CONTENT_CHAR_LIMIT),
        );

        let response = chat.chat_with_system(QUESTIONS_SYSTEM_PROMPT, &prompt).await?;
        let body = strip_code_fence(response.content.trim());

        let wire: Vec<WireQuestion> = serde_json::from_str(body)
            .map_err(|e| LlmError::Malformed(format!("question JSON: {}", e)))?;

        let questions: Vec<GeneratedQuestion> = wire
            .into_iter()
            .map(|q| q.into_question(difficulty))
            .collect::<Result<_, _>>()?;

        if questions.iter().any(|q| !q.is_well_formed()) {
            return Err(LlmError::Malformed(
                "question fails structural validation".to_string(),
            ));
        }

        Ok(questions)
    }

    async fn ai_concept_graph(
        &self,
        chat: &dyn ChatProvider,
        text: &str,
    ) -> Result<ConceptGraph, LlmError> {
        let prompt = format!(
            r#"Create a concept map from the following content.
Return in JSON format with this structure:
{{
    "nodes": [
        {{"id": "1", "label": "Main Concept", "type": "main", "x": 0, "y": 0, "description": "Description"}},
        {{"id": "2", "label": "Sub Concept", "type": "sub", "x": 100, "y": 100, "description": "Description"}}
    ],
    "connections": [
        {{"from": "1", "to": "2", "label": "relationship", "type": "hierarchical", "strength": 1.0}}
    ]
}}

Content:
{content}"#,
            content = truncate_chars(text, CONTENT_CHAR_LIMIT),
        );

        let response = chat
            .chat_with_system(CONCEPT_MAP_SYSTEM_PROMPT, &prompt)
            .await?;
        let body = strip_code_fence(response.content.trim());

        let wire: WireConceptMap = serde_json::from_str(body)
            .map_err(|e| LlmError::Malformed(format!("concept map JSON: {}", e)))?;

        wire.into_graph()
    }
}

/// Strips a Markdown code fence wrapper, if present.
fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

// ============================================================================
// AI wire shapes (strict: a mismatch discards the whole reply)
// ============================================================================

#[derive(Debug, Deserialize)]
struct WireQuestion {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: serde_json::Value,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    points: Option<u32>,
}

impl WireQuestion {
    fn into_question(self, requested: Difficulty) -> Result<GeneratedQuestion, LlmError> {
        // The model occasionally omits the type key; single choice is the
        // shape the prompt describes.
        let kind = match self.kind.as_deref() {
            None | Some("single") => QuestionKind::Single,
            Some("multiple") => QuestionKind::Multiple,
            Some("open") => QuestionKind::Open,
            Some(other) => {
                return Err(LlmError::Malformed(format!("unknown question type {other:?}")))
            }
        };

        let correct_answer = match (&kind, &self.correct_answer) {
            (QuestionKind::Single, serde_json::Value::Number(n)) => {
                let idx = n
                    .as_u64()
                    .ok_or_else(|| LlmError::Malformed("negative answer index".to_string()))?;
                CorrectAnswer::Index(idx as usize)
            }
            (QuestionKind::Multiple, serde_json::Value::Array(values)) => {
                let indices = values
                    .iter()
                    .map(|v| {
                        v.as_u64()
                            .map(|i| i as usize)
                            .ok_or_else(|| LlmError::Malformed("non-numeric answer index".to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                CorrectAnswer::Indices(indices)
            }
            (QuestionKind::Open, serde_json::Value::String(s)) => CorrectAnswer::Text(s.clone()),
            (_, other) => {
                return Err(LlmError::Malformed(format!(
                    "answer encoding {other} does not match question type"
                )))
            }
        };

        let points = self.points.unwrap_or(1);
        if points == 0 {
            return Err(LlmError::Malformed("question worth zero points".to_string()));
        }

        let difficulty = self
            .difficulty
            .as_deref()
            .and_then(Difficulty::from_str_opt)
            .unwrap_or(requested);

        Ok(GeneratedQuestion {
            kind,
            prompt: self.question,
            options: self.options,
            correct_answer,
            explanation: self.explanation,
            difficulty,
            points,
            ai_generated: true,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireConceptMap {
    nodes: Vec<WireNode>,
    #[serde(default)]
    connections: Vec<WireConnection>,
}

#[derive(Debug, Deserialize)]
struct WireNode {
    id: serde_json::Value,
    label: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    examples: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireConnection {
    from: serde_json::Value,
    to: serde_json::Value,
    #[serde(default)]
    label: Option<String>,
    #[serde(rename = "type", default)]
    relation: Option<String>,
    #[serde(default)]
    strength: Option<f32>,
}

/// Accepts string or numeric ids; anything else is malformed.
fn wire_id(value: &serde_json::Value) -> Result<String, LlmError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(LlmError::Malformed(format!("invalid node id {other}"))),
    }
}

impl WireConceptMap {
    fn into_graph(self) -> Result<ConceptGraph, LlmError> {
        if self.nodes.is_empty() {
            return Err(LlmError::Malformed("concept map has no nodes".to_string()));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.into_iter().enumerate() {
            let kind = match node.kind.as_deref() {
                Some("sub") => NodeKind::Sub,
                Some("detail") => NodeKind::Detail,
                _ => NodeKind::Main,
            };
            nodes.push(ConceptNode {
                temp_id: wire_id(&node.id)?,
                label: node.label,
                kind,
                x: node.x.unwrap_or((i * 100) as f32),
                y: node.y.unwrap_or((i * 100) as f32),
                description: node.description.unwrap_or_default(),
                examples: node.examples,
                ai_generated: true,
            });
        }

        let known_ids: HashSet<&str> = nodes.iter().map(|n| n.temp_id.as_str()).collect();

        let mut edges = Vec::with_capacity(self.connections.len());
        let mut dropped = 0usize;
        for connection in self.connections {
            let from = wire_id(&connection.from)?;
            let to = wire_id(&connection.to)?;

            // Keep the graph closed: an edge to a node the model never
            // emitted is dropped, not preserved dangling.
            if !known_ids.contains(from.as_str()) || !known_ids.contains(to.as_str()) {
                dropped += 1;
                continue;
            }

            let relation = match connection.relation.as_deref() {
                Some("hierarchical") => RelationKind::Hierarchical,
                Some("causal") => RelationKind::Causal,
                _ => RelationKind::Direct,
            };

            edges.push(ConceptEdge {
                from,
                to,
                label: connection.label.unwrap_or_default(),
                relation,
                strength: connection.strength.unwrap_or(1.0).clamp(0.0, 1.0),
            });
        }

        if dropped > 0 {
            warn!("dropped {} concept edges with unknown endpoints", dropped);
        }

        Ok(ConceptGraph { nodes, edges })
    }
}

// ============================================================================
// Deterministic fallbacks
// ============================================================================

/// One placeholder single-choice question per qualifying sentence among
/// the first `count` sentences. Never pads with duplicates.
pub fn fallback_questions(
    text: &str,
    difficulty: Difficulty,
    count: usize,
) -> Vec<GeneratedQuestion> {
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut questions = Vec::new();
    for sentence in sentences.iter().take(count) {
        if sentence.chars().count() > MIN_SENTENCE_LEN {
            questions.push(GeneratedQuestion {
                kind: QuestionKind::Single,
                prompt: format!(
                    "What is mentioned in: '{}...'?",
                    truncate_chars(sentence, 50)
                ),
                options: vec![
                    "Option A".to_string(),
                    "Option B".to_string(),
                    "Option C".to_string(),
                    "Option D".to_string(),
                ],
                correct_answer: CorrectAnswer::Index(0),
                explanation: Some("This is a placeholder explanation.".to_string()),
                difficulty,
                points: 1,
                ai_generated: false,
            });
        }
    }

    questions
}

/// Up to ten unique long words become nodes on a 3-column grid, chained
/// with `direct` edges.
pub fn fallback_concept_graph(text: &str) -> ConceptGraph {
    let mut seen = HashSet::new();
    let mut words = Vec::new();
    for token in tokenize(text) {
        if token.chars().count() > CONCEPT_WORD_MIN_LEN && seen.insert(token.clone()) {
            words.push(token);
            if words.len() == CONCEPT_NODE_LIMIT {
                break;
            }
        }
    }

    let nodes: Vec<ConceptNode> = words
        .iter()
        .enumerate()
        .map(|(i, word)| ConceptNode {
            temp_id: i.to_string(),
            label: capitalize(word),
            kind: if i < 3 { NodeKind::Main } else { NodeKind::Sub },
            x: ((i % CONCEPT_GRID_COLUMNS) * 100) as f32,
            y: ((i / CONCEPT_GRID_COLUMNS) * 100) as f32,
            description: format!("Concept related to {}", word),
            examples: vec![],
            ai_generated: false,
        })
        .collect();

    let edges: Vec<ConceptEdge> = (0..nodes.len().saturating_sub(1))
        .map(|i| ConceptEdge {
            from: i.to_string(),
            to: (i + 1).to_string(),
            label: "related to".to_string(),
            relation: RelationKind::Direct,
            strength: 1.0,
        })
        .collect();

    ConceptGraph { nodes, edges }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
