//! Persistence seam for completed analyses.
//!
//! The relational schema and full-text index are external collaborators;
//! the pipeline only needs this trait. Only whole, validated
//! [`DocumentAnalysis`] values cross this boundary — a failed run never
//! reaches the store.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::types::analysis::{AnalysisSummary, DocumentAnalysis};
use crate::types::proposition::Proposition;

/// A proposition matched by a text search, with its score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub proposition: Proposition,
    pub score: f32,
}

/// Durable storage of validated analyses, keyed by document identifier.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a complete analysis, replacing any previous version for the
    /// same document identifier.
    async fn save(&self, analysis: &DocumentAnalysis) -> Result<()>;

    /// Load the full analysis for a document, if one was persisted.
    async fn load(&self, document_id: &str) -> Result<Option<DocumentAnalysis>>;

    /// List all persisted analyses with summary counts, newest first.
    async fn list(&self) -> Result<Vec<AnalysisSummary>>;

    /// Remove an analysis and all dependent entities. Returns whether
    /// anything was removed.
    async fn delete(&self, document_id: &str) -> Result<bool>;

    /// Search proposition text within one document. Full-text search is
    /// scoped to proposition text only.
    async fn search(
        &self,
        document_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>>;
}
