use std::sync::Arc;

use uuid::Uuid;

use studybox::llm::MockChat;
use studybox::models::{total_points, CorrectAnswer, QuestionKind};
use studybox::services::{ConceptMapService, ContentGenerator, ServiceError};
use studybox::store::MemoryStore;
use studybox::Difficulty;

const CONTENT: &str = "La fotosintesi trasforma la luce solare in energia chimica. \
     Le piante assorbono anidride carbonica dall'atmosfera terrestre. \
     La clorofilla cattura la luce dentro le foglie verdi. \
     Corto. \
     Gli zuccheri prodotti alimentano la crescita della pianta.";

#[tokio::test]
async fn test_fallback_questions_respect_count_and_threshold() {
    let generator = ContentGenerator::new(None);

    let questions = generator
        .generate_questions(CONTENT, Difficulty::Medium, 3)
        .await
        .unwrap();

    // Never more than requested
    assert!(questions.len() <= 3);
    for question in &questions {
        assert_eq!(question.kind, QuestionKind::Single);
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct_answer, CorrectAnswer::Index(0));
        assert!(!question.ai_generated);
        assert_eq!(question.points, 1);
    }
}

#[tokio::test]
async fn test_fewer_qualifying_sentences_than_requested() {
    let generator = ContentGenerator::new(None);
    // Two long sentences, the rest too short to qualify
    let text = "La fotosintesi trasforma la luce solare in energia. Si. No. \
         Le piante verdi assorbono anidride carbonica dall'aria.";

    let questions = generator
        .generate_questions(text, Difficulty::Medium, 5)
        .await
        .unwrap();

    assert_eq!(questions.len(), 2);
}

#[tokio::test]
async fn test_fallback_generation_is_deterministic() {
    let generator = ContentGenerator::new(None);

    let first = generator
        .generate_questions(CONTENT, Difficulty::Medium, 5)
        .await
        .unwrap();
    let second = generator
        .generate_questions(CONTENT, Difficulty::Medium, 5)
        .await
        .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.prompt, b.prompt);
    }

    let graph_a = generator.generate_concept_graph(CONTENT).await.unwrap();
    let graph_b = generator.generate_concept_graph(CONTENT).await.unwrap();
    let labels_a: Vec<&str> = graph_a.nodes.iter().map(|n| n.label.as_str()).collect();
    let labels_b: Vec<&str> = graph_b.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels_a, labels_b);
}

#[tokio::test]
async fn test_empty_content_is_rejected_not_absorbed() {
    let generator = ContentGenerator::new(None);

    assert!(matches!(
        generator.generate_questions("", Difficulty::Medium, 5).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        generator.generate_concept_graph("   ").await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_total_points_recomputed_from_question_set() {
    let reply = r#"[
        {"question": "Prima domanda sulla fotosintesi?", "options": ["a","b","c","d"], "correct_answer": 0, "points": 3},
        {"question": "Seconda domanda sulla clorofilla?", "options": ["a","b","c","d"], "correct_answer": 2, "points": 2}
    ]"#;
    let generator = ContentGenerator::new(Some(Arc::new(MockChat::with_reply(reply))));

    let questions = generator
        .generate_questions(CONTENT, Difficulty::Hard, 2)
        .await
        .unwrap();

    assert_eq!(total_points(&questions), 5);
    assert!(questions.iter().all(|q| q.ai_generated));

    // Dropping a question changes the recomputed total
    assert_eq!(total_points(&questions[..1]), 3);
}

#[tokio::test]
async fn test_ai_unavailability_never_fails_generation() {
    let generator = ContentGenerator::new(Some(Arc::new(MockChat::failing())));

    let questions = generator
        .generate_questions(CONTENT, Difficulty::Medium, 4)
        .await
        .unwrap();
    assert!(!questions.is_empty());
    assert!(questions.iter().all(|q| !q.ai_generated));

    let graph = generator.generate_concept_graph(CONTENT).await.unwrap();
    assert!(!graph.nodes.is_empty());
    assert!(graph.nodes.iter().all(|n| !n.ai_generated));
}

#[tokio::test]
async fn test_fallback_graph_edges_always_closed() {
    let generator = ContentGenerator::new(None);

    for text in [
        CONTENT,
        "fotosintesi",
        "uno due tre quattro cinque seisette ottonove",
        "Il cane e il gatto corrono nel prato verde ogni mattina presto.",
    ] {
        let graph = generator.generate_concept_graph(text).await.unwrap();
        assert!(graph.is_closed(), "open graph for {text:?}");
    }
}

#[tokio::test]
async fn test_generated_map_persisted_with_resolved_ids() {
    let store = Arc::new(MemoryStore::new());
    let reply = r#"{
        "nodes": [
            {"id": "1", "label": "Fotosintesi", "type": "main", "x": 0, "y": 0, "description": "Processo chimico"},
            {"id": "2", "label": "Clorofilla", "type": "sub", "x": 100, "y": 0, "description": "Pigmento verde"},
            {"id": "3", "label": "Glucosio", "type": "detail", "x": 200, "y": 0, "description": "Zucchero"}
        ],
        "connections": [
            {"from": "1", "to": "2", "label": "usa", "type": "hierarchical", "strength": 0.9},
            {"from": "2", "to": "3", "label": "produce", "type": "causal", "strength": 0.7},
            {"from": "1", "to": "42", "label": "fantasma", "type": "direct"}
        ]
    }"#;
    let service = ConceptMapService::new(
        store,
        ContentGenerator::new(Some(Arc::new(MockChat::with_reply(reply)))),
    );

    let user = Uuid::new_v4();
    let record = service
        .generate_and_persist(user, Uuid::new_v4(), "Fotosintesi".to_string(), CONTENT)
        .await
        .unwrap();

    assert_eq!(record.nodes.len(), 3);
    // The edge to the never-emitted node "42" was dropped
    assert_eq!(record.edges.len(), 2);

    let node_ids: std::collections::HashSet<Uuid> = record.nodes.iter().map(|n| n.id).collect();
    for edge in &record.edges {
        assert!(node_ids.contains(&edge.from_node_id));
        assert!(node_ids.contains(&edge.to_node_id));
    }
    assert!(record.nodes.iter().all(|n| n.ai_generated));
}
