//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::store::{AnalysisStore, SearchHit};
use crate::types::analysis::{AnalysisSummary, DocumentAnalysis};

/// In-memory analysis store.
///
/// Useful for testing and development. Not suitable for production as data
/// is lost on restart; the relational backend slots in behind the same
/// trait.
#[derive(Default)]
pub struct MemoryStore {
    analyses: RwLock<HashMap<String, DocumentAnalysis>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted analyses.
    pub fn count(&self) -> usize {
        self.analyses.read().unwrap().len()
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.analyses.write().unwrap().clear();
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn save(&self, analysis: &DocumentAnalysis) -> Result<()> {
        self.analyses
            .write()
            .unwrap()
            .insert(analysis.document_id.clone(), analysis.clone());
        Ok(())
    }

    async fn load(&self, document_id: &str) -> Result<Option<DocumentAnalysis>> {
        Ok(self.analyses.read().unwrap().get(document_id).cloned())
    }

    async fn list(&self) -> Result<Vec<AnalysisSummary>> {
        let mut summaries: Vec<AnalysisSummary> = self
            .analyses
            .read()
            .unwrap()
            .values()
            .map(|a| a.summary())
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn delete(&self, document_id: &str) -> Result<bool> {
        Ok(self.analyses.write().unwrap().remove(document_id).is_some())
    }

    async fn search(
        &self,
        document_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let analyses = self.analyses.read().unwrap();
        let Some(analysis) = analyses.get(document_id) else {
            return Ok(Vec::new());
        };

        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut hits: Vec<SearchHit> = analysis
            .propositions
            .propositions
            .iter()
            .filter_map(|prop| {
                // Simple term frequency scoring over proposition text only
                let text_lower = prop.text.to_lowercase();
                let mut score = 0.0f32;
                for term in &terms {
                    let count = text_lower.matches(term).count();
                    if count > 0 {
                        score += (1.0 + (count as f32).ln())
                            / (1.0 + (prop.text.len() as f32).ln());
                    }
                }
                if score > 0.0 {
                    Some(SearchHit {
                        proposition: prop.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        Ok(hits)
    }
}
