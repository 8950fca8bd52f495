//! Corpus-wide TF-IDF.

use super::normalize::document_terms;
use super::{rank_candidates, TagExtractor};
use crate::domain::{CandidateIndex, Document};
use crate::error::MetaResult;
use rayon::prelude::*;
use std::collections::HashMap;

pub struct FrequencyExtractor {
    limit: usize,
}

impl FrequencyExtractor {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
fn smooth_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

fn term_counts(terms: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    counts
}

impl TagExtractor for FrequencyExtractor {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn extract(&self, corpus: &[Document]) -> MetaResult<CandidateIndex> {
        let tokenized: Vec<Vec<String>> =
            corpus.par_iter().map(|doc| document_terms(&doc.text)).collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for terms in &tokenized {
            for term in term_counts(terms).into_keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        tracing::debug!("tf-idf vocabulary: {} terms over {} documents", df.len(), corpus.len());

        let n_docs = corpus.len();
        let index = corpus
            .par_iter()
            .zip(tokenized.par_iter())
            .map(|(doc, terms)| {
                let total = terms.len().max(1) as f64;
                let scored = term_counts(terms).into_iter().map(|(term, count)| {
                    let idf = smooth_idf(n_docs, df.get(term).copied().unwrap_or(0));
                    (term.to_string(), count as f64 / total * idf)
                });
                (doc.path.clone(), rank_candidates(&doc.path, scored, self.limit))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms_of(index: &CandidateIndex, path: &str) -> Vec<String> {
        index[path].iter().map(|c| c.term.clone()).collect()
    }

    #[test]
    fn test_smooth_idf_matches_formula() {
        assert!((smooth_idf(3, 3) - 1.0).abs() < 1e-12);
        assert!((smooth_idf(3, 1) - (2.0_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_distinctive_terms_outrank_shared_terms() {
        let corpus = vec![
            Document::new("a.md", "rust cache rust"),
            Document::new("b.md", "proxy cache"),
            Document::new("c.md", "cache network"),
        ];
        let index = FrequencyExtractor::new(10).extract(&corpus).unwrap();
        assert_eq!(terms_of(&index, "a.md"), vec!["rust", "cache"]);
        assert_eq!(terms_of(&index, "b.md"), vec!["proxy", "cache"]);
        assert_eq!(terms_of(&index, "c.md"), vec!["network", "cache"]);
    }

    #[test]
    fn test_empty_document_gets_empty_list() {
        let corpus = vec![Document::new("a.md", "rust"), Document::new("b.md", "```\ncode\n```")];
        let index = FrequencyExtractor::new(10).extract(&corpus).unwrap();
        assert!(index["b.md"].is_empty());
        assert_eq!(terms_of(&index, "a.md"), vec!["rust"]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let corpus: Vec<Document> = (0..20)
            .map(|i| Document::new(format!("{i:02}.md"), format!("alpha beta gamma delta t{i}")))
            .collect();
        let extractor = FrequencyExtractor::new(3);
        let first = extractor.extract(&corpus).unwrap();
        for _ in 0..5 {
            assert_eq!(extractor.extract(&corpus).unwrap(), first);
        }
    }
}
