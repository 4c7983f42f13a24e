//! Summary, keyword and language analysis of extracted text.
//!
//! Two execution modes, chosen once at construction: AI mode sends the
//! text to a chat-completion backend; fallback mode is fully local and
//! deterministic. An AI failure in one sub-task falls back for that
//! sub-task only and never aborts the others. Language detection is
//! always the local heuristic.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::llm::ChatProvider;

/// Character cap applied to text sent to the AI backend.
const AI_TEXT_CHAR_LIMIT: usize = 4000;

/// Minimum token length for fallback keywords.
const KEYWORD_MIN_LEN: usize = 3;

/// Number of fallback keywords returned.
const KEYWORD_LIMIT: usize = 10;

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates concise summaries of educational content in Italian.";

const KEYWORDS_SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts key terms and \
     concepts from educational content. Return only the keywords separated by commas.";

/// Candidate languages with their function words, in enumeration order.
/// Ties resolve to the first candidate.
const LANGUAGE_CANDIDATES: &[(&str, &[&str])] = &[
    (
        "it",
        &[
            "il", "la", "di", "che", "e", "un", "una", "per", "con", "del", "della",
        ],
    ),
    (
        "en",
        &[
            "the", "and", "of", "to", "a", "in", "is", "it", "you", "that", "he",
        ],
    ),
];

/// Analysis result for one non-empty text.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentMetadata {
    pub summary: String,
    pub keywords: Vec<String>,
    /// 2-letter language tag.
    pub language: String,
}

/// Derives summary, keywords and language from extracted text.
pub struct ContentAnalyzer {
    chat: Option<Arc<dyn ChatProvider>>,
}

impl ContentAnalyzer {
    /// Creates an analyzer. `None` selects fallback mode for every call.
    pub fn new(chat: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { chat }
    }

    /// Analyzes a non-empty text. Never fails: AI-backend errors are
    /// absorbed into the deterministic fallbacks.
    pub async fn analyze(&self, text: &str) -> ContentMetadata {
        let summary = self.summarize(text).await;
        let keywords = self.keywords(text).await;
        let language = detect_language(text).to_string();

        ContentMetadata {
            summary,
            keywords,
            language,
        }
    }

    async fn summarize(&self, text: &str) -> String {
        if let Some(chat) = &self.chat {
            let prompt = format!(
                "Create a summary of the following text:\n\n{}",
                truncate_chars(text, AI_TEXT_CHAR_LIMIT)
            );
            match chat.chat_with_system(SUMMARY_SYSTEM_PROMPT, &prompt).await {
                Ok(response) => {
                    let summary = response.content.trim().to_string();
                    if !summary.is_empty() {
                        return summary;
                    }
                    warn!("AI summary was empty, using fallback");
                }
                Err(e) => warn!("AI summary failed, using fallback: {}", e),
            }
        }

        fallback_summary(text)
    }

    async fn keywords(&self, text: &str) -> Vec<String> {
        if let Some(chat) = &self.chat {
            let prompt = format!(
                "Extract the most important keywords from this text:\n\n{}",
                truncate_chars(text, AI_TEXT_CHAR_LIMIT)
            );
            match chat.chat_with_system(KEYWORDS_SYSTEM_PROMPT, &prompt).await {
                Ok(response) => {
                    let keywords: Vec<String> = response
                        .content
                        .split(',')
                        .map(|kw| kw.trim().to_string())
                        .filter(|kw| !kw.is_empty())
                        .collect();
                    if !keywords.is_empty() {
                        return keywords;
                    }
                    warn!("AI keywords were empty, using fallback");
                }
                Err(e) => warn!("AI keywords failed, using fallback: {}", e),
            }
        }

        fallback_keywords(text)
    }
}

/// First three `.`-separated sentences, closed with a period.
pub fn fallback_summary(text: &str) -> String {
    let sentences: Vec<&str> = text.split('.').take(3).collect();
    let mut summary = sentences.join(".");
    summary.push('.');
    summary
}

/// Top tokens longer than [`KEYWORD_MIN_LEN`] by frequency; frequency
/// ties keep first-seen order.
pub fn fallback_keywords(text: &str) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for token in tokenize(text) {
        if token.chars().count() > KEYWORD_MIN_LEN {
            if !counts.contains_key(&token) {
                order.push(token.clone());
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            (word, count)
        })
        .collect();

    // Stable sort: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(word, _)| word)
        .collect()
}

/// Picks the candidate language with the most function-word token hits.
/// Ties resolve to the first candidate in enumeration order.
pub fn detect_language(text: &str) -> &'static str {
    let tokens: Vec<String> = tokenize(text).collect();

    let mut best = LANGUAGE_CANDIDATES[0].0;
    let mut best_count = 0usize;

    for (tag, function_words) in LANGUAGE_CANDIDATES {
        let count = tokens
            .iter()
            .filter(|t| function_words.contains(&t.as_str()))
            .count();
        if count > best_count {
            best = *tag;
            best_count = count;
        }
    }

    best
}

/// Lowercased alphanumeric tokens, in document order.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Truncates at a char boundary, not a byte offset.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
