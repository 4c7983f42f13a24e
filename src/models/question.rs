//! Generated quiz/exam question records.

use serde::{Deserialize, Serialize};

/// Question kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// One correct option index.
    Single,
    /// Several correct option indices.
    Multiple,
    /// Free-text answer, no options.
    Open,
}

/// Requested difficulty for generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }
}

/// Correct-answer encoding, tagged by question kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    /// Index into `options` (single choice).
    Index(usize),
    /// Indices into `options` (multiple choice).
    Indices(Vec<usize>),
    /// Expected free text (open questions).
    Text(String),
}

/// A generated question, for quizzes or exams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub kind: QuestionKind,

    /// The question text shown to the student.
    pub prompt: String,

    /// Answer options; empty for open questions.
    pub options: Vec<String>,

    pub correct_answer: CorrectAnswer,

    pub explanation: Option<String>,

    pub difficulty: Difficulty,

    /// Point value, at least 1.
    pub points: u32,

    /// True only when the AI path actually produced this question.
    pub ai_generated: bool,
}

impl GeneratedQuestion {
    /// Checks structural consistency between kind, options and answer.
    pub fn is_well_formed(&self) -> bool {
        if self.points == 0 || self.prompt.trim().is_empty() {
            return false;
        }
        match (&self.kind, &self.correct_answer) {
            (QuestionKind::Single, CorrectAnswer::Index(i)) => *i < self.options.len(),
            (QuestionKind::Multiple, CorrectAnswer::Indices(idx)) => {
                !idx.is_empty() && idx.iter().all(|i| *i < self.options.len())
            }
            (QuestionKind::Open, CorrectAnswer::Text(_)) => self.options.is_empty(),
            _ => false,
        }
    }
}

/// Sum of per-question points.
///
/// Callers must recompute this whenever the question set changes; it is
/// not kept in sync automatically.
pub fn total_points(questions: &[GeneratedQuestion]) -> u32 {
    questions.iter().map(|q| q.points).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(points: u32) -> GeneratedQuestion {
        GeneratedQuestion {
            kind: QuestionKind::Single,
            prompt: "What is water made of?".to_string(),
            options: vec!["H2O".into(), "CO2".into(), "NaCl".into(), "O2".into()],
            correct_answer: CorrectAnswer::Index(0),
            explanation: None,
            difficulty: Difficulty::Medium,
            points,
            ai_generated: false,
        }
    }

    #[test]
    fn test_total_points() {
        let questions = vec![single(1), single(2), single(3)];
        assert_eq!(total_points(&questions), 6);
        assert_eq!(total_points(&[]), 0);
    }

    #[test]
    fn test_well_formed_single() {
        assert!(single(1).is_well_formed());

        let mut out_of_range = single(1);
        out_of_range.correct_answer = CorrectAnswer::Index(9);
        assert!(!out_of_range.is_well_formed());

        let mut no_points = single(0);
        no_points.points = 0;
        assert!(!no_points.is_well_formed());
    }

    #[test]
    fn test_well_formed_open() {
        let open = GeneratedQuestion {
            kind: QuestionKind::Open,
            prompt: "Explain photosynthesis.".to_string(),
            options: vec![],
            correct_answer: CorrectAnswer::Text("light to sugar".to_string()),
            explanation: None,
            difficulty: Difficulty::Hard,
            points: 5,
            ai_generated: true,
        };
        assert!(open.is_well_formed());
    }

    #[test]
    fn test_kind_answer_mismatch() {
        let mut q = single(1);
        q.kind = QuestionKind::Multiple;
        assert!(!q.is_well_formed());
    }
}
