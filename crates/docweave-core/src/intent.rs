//! Query intent analysis.
//!
//! Classifies a natural-language query toward code-type or doc-type
//! material using two fixed keyword lists (spanning English and
//! Russian), phrase bonuses, and a whole-word scan for code-like
//! tokens. The decision has a deliberate dead zone: score differences
//! of one or less resolve to [`QueryIntent::Balanced`] so ambiguous
//! queries never flap between labels.

use regex::Regex;

use crate::models::QueryIntent;

/// Keywords signalling an implementation/internals question.
const CODE_KEYWORDS: &[&str] = &[
    "implementation",
    "реализация",
    "как работает",
    "внутри",
    "алгоритм",
    "код",
    "функция",
    "метод",
    "класс",
    "source",
    "исходный",
    "внутренний",
    "механизм",
    "debug",
    "отладка",
    "ошибка",
    "баг",
    "how does",
    "internally",
];

/// Keywords signalling a usage/example question.
const DOC_KEYWORDS: &[&str] = &[
    "example",
    "пример",
    "как использовать",
    "tutorial",
    "guide",
    "руководство",
    "документация",
    "инструкция",
    "getting started",
    "начало работы",
    "quickstart",
    "demo",
    "демо",
    "показать",
    "usage",
    "использование",
    "how to",
];

/// Strong phrasings worth a fixed bonus on top of keyword hits.
const CODE_PHRASES: &[&str] = &["how does", "как работает"];
const DOC_PHRASES: &[&str] = &["example", "пример", "how to"];

/// Immutable analyzer configuration, constructed once and passed in.
///
/// Holds the keyword tables and the compiled code-token pattern;
/// deliberately not process-global state.
#[derive(Debug, Clone)]
pub struct IntentConfig {
    code_keywords: Vec<&'static str>,
    doc_keywords: Vec<&'static str>,
    code_phrases: Vec<&'static str>,
    doc_phrases: Vec<&'static str>,
    code_token: Regex,
}

impl Default for IntentConfig {
    fn default() -> Self {
        IntentConfig {
            code_keywords: CODE_KEYWORDS.to_vec(),
            doc_keywords: DOC_KEYWORDS.to_vec(),
            code_phrases: CODE_PHRASES.to_vec(),
            doc_phrases: DOC_PHRASES.to_vec(),
            code_token: Regex::new(r"\b(class|function|method|def |import )\b")
                .expect("code token pattern is valid"),
        }
    }
}

/// Classify a query. Pure: identical text always yields the same label.
pub fn analyze(query: &str, config: &IntentConfig) -> QueryIntent {
    let lowered = query.to_lowercase();

    let mut code_score: i32 = config
        .code_keywords
        .iter()
        .filter(|k| lowered.contains(*k))
        .count() as i32;
    let mut doc_score: i32 = config
        .doc_keywords
        .iter()
        .filter(|k| lowered.contains(*k))
        .count() as i32;

    if config.code_phrases.iter().any(|p| lowered.contains(p)) {
        code_score += 2;
    }
    if config.doc_phrases.iter().any(|p| lowered.contains(p)) {
        doc_score += 2;
    }
    if config.code_token.is_match(&lowered) {
        code_score += 1;
    }

    if code_score > doc_score + 1 {
        QueryIntent::CodeFirst
    } else if doc_score > code_score + 1 {
        QueryIntent::DocFirst
    } else {
        QueryIntent::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(query: &str) -> QueryIntent {
        analyze(query, &IntentConfig::default())
    }

    #[test]
    fn test_usage_phrase_wins_doc_first() {
        assert_eq!(label("How to use a vector store?"), QueryIntent::DocFirst);
        assert_eq!(label("Покажи пример использования"), QueryIntent::DocFirst);
    }

    #[test]
    fn test_internals_phrase_wins_code_first() {
        assert_eq!(
            label("How does the retriever work internally?"),
            QueryIntent::CodeFirst
        );
        assert_eq!(label("Как работает алгоритм поиска?"), QueryIntent::CodeFirst);
    }

    #[test]
    fn test_plain_topic_is_balanced() {
        assert_eq!(label("vector store"), QueryIntent::Balanced);
        assert_eq!(label(""), QueryIntent::Balanced);
    }

    #[test]
    fn test_near_tie_resolves_balanced() {
        // One code keyword against nothing: difference of 1 stays in the
        // dead zone.
        assert_eq!(label("debug output"), QueryIntent::Balanced);
        assert_eq!(label("usage notes"), QueryIntent::Balanced);
    }

    #[test]
    fn test_code_token_bonus_alone_stays_in_dead_zone() {
        // The whole-word token scan adds 1, which by itself is not
        // enough to clear the margin.
        assert_eq!(label("the class here"), QueryIntent::Balanced);
        assert_eq!(
            label("debug the class implementation"),
            QueryIntent::CodeFirst
        );
    }

    #[test]
    fn test_pure_function() {
        let q = "how does chunking work?";
        assert_eq!(label(q), label(q));
    }
}
