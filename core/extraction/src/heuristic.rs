use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Keyword prefixes that mark a line as an action line (checked against the
/// lowercased line).
const ACTION_PREFIXES: [&str; 3] = ["todo:", "action:", "next:"];

/// Imperative verbs that qualify a sentence as actionable when the text has
/// no explicit action lines at all.
const IMPERATIVE_VERBS: [&str; 12] = [
    "add",
    "create",
    "implement",
    "fix",
    "update",
    "write",
    "check",
    "verify",
    "refactor",
    "document",
    "design",
    "investigate",
];

/// Rule-based action item extractor. Pure and deterministic: the same input
/// always produces the same items, in input order, with no duplicates.
pub struct HeuristicExtractor {
    bullet_pattern: Regex,
    word_pattern: Regex,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            // Leading bullet: -, *, • or a numbered "1." style marker
            bullet_pattern: Regex::new(r"(?i)^\s*([-*•]|\d+\.)\s+").unwrap(),
            word_pattern: Regex::new(r"[A-Za-z']+").unwrap(),
        }
    }

    /// Extract action items from free-form note text.
    ///
    /// Lines that look like explicit action lines (bullets, todo-style
    /// prefixes, checkboxes) win; only when the text has none of those does
    /// the extractor fall back to scanning for imperative sentences.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut items = Vec::new();
        let mut saw_action_line = false;

        for line in text.lines() {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            if self.is_action_line(stripped) {
                saw_action_line = true;
                let cleaned = self.clean_item(stripped);
                // A bare "- [ ]" cleans down to nothing; never emit it
                if !cleaned.is_empty() {
                    items.push(cleaned);
                }
            }
        }

        if !saw_action_line {
            items = self.imperative_sentences(text);
        }

        let items = self.dedup_case_insensitive(items);
        debug!("heuristic extractor found {} action items", items.len());
        items
    }

    fn is_action_line(&self, line: &str) -> bool {
        if self.bullet_pattern.is_match(line) {
            return true;
        }

        let lower = line.to_lowercase();
        if ACTION_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return true;
        }

        lower.contains("[ ]") || lower.contains("[todo]")
    }

    /// Strip the bullet marker and a single leading open-checkbox or
    /// `[todo]` tag. Done markers like `[x]` are left in place so completed
    /// lines keep their state visible.
    fn clean_item(&self, line: &str) -> String {
        let mut text = self.bullet_pattern.replace(line, "").trim().to_string();

        if let Some(rest) = text.strip_prefix("[ ]") {
            text = rest.trim().to_string();
        }
        if let Some(rest) = text.strip_prefix("[todo]") {
            text = rest.trim().to_string();
        }

        text
    }

    /// Fallback path: split into sentences and keep the ones that open with
    /// an imperative verb.
    fn imperative_sentences(&self, text: &str) -> Vec<String> {
        self.split_sentences(text)
            .into_iter()
            .filter(|s| self.starts_with_imperative(s))
            .collect()
    }

    fn starts_with_imperative(&self, sentence: &str) -> bool {
        match self.word_pattern.find(sentence) {
            Some(m) => {
                let word = m.as_str().to_lowercase();
                IMPERATIVE_VERBS.contains(&word.as_str())
            }
            None => false,
        }
    }

    /// Split on `.`, `!` or `?` followed by whitespace, keeping the
    /// terminal punctuation attached to its sentence.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut prev_terminal = false;

        for (i, c) in text.char_indices() {
            if prev_terminal && c.is_whitespace() {
                let sentence = text[start..i].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = i;
            }
            prev_terminal = matches!(c, '.' | '!' | '?');
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        sentences
    }

    /// Order-preserving dedup on the lowercased item text; the first
    /// occurrence keeps its original casing.
    fn dedup_case_insensitive(&self, items: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();

        for item in items {
            if seen.insert(item.to_lowercase()) {
                unique.push(item);
            }
        }

        unique
    }
}
