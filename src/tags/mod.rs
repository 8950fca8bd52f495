//! Keyword extraction strategies and the corpus-wide tag budget.

pub mod allocator;
pub mod embedding;
pub mod frequency;
pub mod graphrank;
pub mod normalize;

pub use allocator::{allocate_tags, GlobalTagState, TagBudgetAllocator};
pub use embedding::EmbeddingExtractor;
pub use frequency::FrequencyExtractor;
pub use graphrank::GraphRankExtractor;

use crate::domain::{CandidateIndex, Document, StrategyKind, TagCandidate, DEFAULT_EMBEDDING_MODEL};
use crate::error::{MetaError, MetaResult};

/// Produces a ranked candidate list for every document of a corpus.
///
/// Implementations return one entry per input document (possibly empty), each sorted by
/// descending score with ties broken by ascending term, and at most `candidate_limit` long.
pub trait TagExtractor {
    fn name(&self) -> &'static str;
    fn extract(&self, corpus: &[Document]) -> MetaResult<CandidateIndex>;
}

/// Strategy selection inputs.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub candidate_limit: usize,
    pub embedding_model: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { candidate_limit: 30, embedding_model: DEFAULT_EMBEDDING_MODEL.to_string() }
    }
}

/// Disabled tagging: every document gets an empty list.
pub struct NoopExtractor;

impl TagExtractor for NoopExtractor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn extract(&self, corpus: &[Document]) -> MetaResult<CandidateIndex> {
        Ok(corpus.iter().map(|doc| (doc.path.clone(), Vec::new())).collect())
    }
}

pub fn build_extractor(
    kind: StrategyKind,
    options: &ExtractOptions,
) -> MetaResult<Box<dyn TagExtractor + Send + Sync>> {
    let limit = options.candidate_limit.max(1);
    let extractor: Box<dyn TagExtractor + Send + Sync> = match kind {
        StrategyKind::Frequency => Box::new(FrequencyExtractor::new(limit)),
        StrategyKind::Graphrank => Box::new(GraphRankExtractor::new(limit)),
        StrategyKind::Embedding => {
            if options.embedding_model != DEFAULT_EMBEDDING_MODEL {
                return Err(MetaError::ExtractionBackendUnavailable {
                    strategy: "embedding",
                    reason: format!(
                        "model '{}' is not available (built-in model: {})",
                        options.embedding_model, DEFAULT_EMBEDDING_MODEL
                    ),
                });
            }
            Box::new(EmbeddingExtractor::new(limit))
        }
        StrategyKind::None => Box::new(NoopExtractor),
    };
    tracing::debug!("tag extractor: {} (candidate limit {})", extractor.name(), limit);
    Ok(extractor)
}

/// Sort scored terms into a candidate list: score descending, then term ascending.
pub fn rank_candidates(
    document: &str,
    scored: impl IntoIterator<Item = (String, f64)>,
    limit: usize,
) -> Vec<TagCandidate> {
    let mut scored: Vec<(String, f64)> =
        scored.into_iter().filter(|(_, score)| score.is_finite()).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(limit);
    scored
        .into_iter()
        .enumerate()
        .map(|(rank, (term, score))| TagCandidate {
            document: document.to_string(),
            term,
            score,
            rank,
        })
        .collect()
}
