use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ID Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionItemId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActionItemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Note Schema
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub created_at: String, // RFC3339
}

// ============================================================================
// Action Item Schema
// ============================================================================

/// A single extracted, actionable text fragment. `note_id` is a non-owning
/// back-reference to the note it was extracted from; `None` means an
/// unlinked ad-hoc item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ActionItemId,
    pub note_id: Option<NoteId>,
    pub text: String,
    pub done: bool,
    pub created_at: String, // RFC3339
}

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCreate {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    #[serde(default)]
    pub save_note: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractLlmRequest {
    pub text: String,
    #[serde(default)]
    pub save_note: bool,
    /// Model override; falls back to the configured default when absent.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub id: ActionItemId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub note_id: Option<NoteId>,
    pub items: Vec<ExtractedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkDoneRequest {
    #[serde(default = "default_done")]
    pub done: bool,
}

fn default_done() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkDoneResponse {
    pub id: ActionItemId,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_serialization() {
        let note = Note {
            id: NoteId(1),
            content: "TODO: write tests".to_string(),
            created_at: "2025-11-02T18:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&note).unwrap();
        let restored: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, note.id);
        assert_eq!(restored.content, note.content);
    }

    #[test]
    fn test_action_item_serialization() {
        let item = ActionItem {
            id: ActionItemId(7),
            note_id: Some(NoteId(1)),
            text: "Set up database".to_string(),
            done: false,
            created_at: "2025-11-02T18:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&item).unwrap();
        let restored: ActionItem = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.note_id, Some(NoteId(1)));
        assert!(!restored.done);
    }

    #[test]
    fn test_extract_request_defaults() {
        let req: ExtractRequest = serde_json::from_str(r#"{"text": "- do it"}"#).unwrap();
        assert!(!req.save_note);

        let req: ExtractLlmRequest = serde_json::from_str(r#"{"text": "- do it"}"#).unwrap();
        assert!(!req.save_note);
        assert!(req.model.is_none());
    }

    #[test]
    fn test_mark_done_default_true() {
        let req: MarkDoneRequest = serde_json::from_str("{}").unwrap();
        assert!(req.done);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(NoteId(42).to_string(), "42");
        assert_eq!(ActionItemId(3).to_string(), "3");
    }
}
