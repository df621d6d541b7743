//! Input document types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted document, immutable once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable content identifier, caller-supplied or derived
    pub document_id: String,

    /// Display title
    pub title: String,

    /// Full plain text of the document
    pub text: String,

    /// When the document was accepted
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Create a document with a derived identifier (`doc_<uuid8>`).
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let short = Uuid::new_v4().simple().to_string();
        Self {
            document_id: format!("doc_{}", &short[..8]),
            title: title.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a document with a caller-supplied identifier.
    pub fn with_id(
        document_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            title: title.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Word count of the raw text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_carry_doc_prefix() {
        let doc = Document::new("Title", "body text");
        assert!(doc.document_id.starts_with("doc_"));
        assert_eq!(doc.document_id.len(), "doc_".len() + 8);
    }

    #[test]
    fn caller_supplied_id_is_kept() {
        let doc = Document::with_id("ch01", "Chapter One", "body");
        assert_eq!(doc.document_id, "ch01");
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        let doc = Document::new("Title", "one  two\nthree\tfour ");
        assert_eq!(doc.word_count(), 4);
    }
}
