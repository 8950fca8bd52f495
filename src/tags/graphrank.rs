//! Per-document TextRank over a token co-occurrence graph.

use super::normalize::document_terms;
use super::{rank_candidates, TagExtractor};
use crate::domain::{CandidateIndex, Document};
use crate::error::MetaResult;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

const WINDOW: usize = 2;
const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

pub struct GraphRankExtractor {
    limit: usize,
}

impl GraphRankExtractor {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

/// Undirected weighted graph; node ids follow first appearance in the document.
struct CooccurrenceGraph {
    terms: Vec<String>,
    edges: Vec<Vec<(usize, f64)>>,
}

impl CooccurrenceGraph {
    fn build(tokens: &[String]) -> Self {
        let mut ids: HashMap<&str, usize> = HashMap::new();
        let mut terms = Vec::new();
        let seq: Vec<usize> = tokens
            .iter()
            .map(|t| {
                *ids.entry(t.as_str()).or_insert_with(|| {
                    terms.push(t.clone());
                    terms.len() - 1
                })
            })
            .collect();

        let mut weights: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); terms.len()];
        for (i, &a) in seq.iter().enumerate() {
            for &b in seq.iter().skip(i + 1).take(WINDOW - 1) {
                if a != b {
                    *weights[a].entry(b).or_insert(0.0) += 1.0;
                    *weights[b].entry(a).or_insert(0.0) += 1.0;
                }
            }
        }
        let edges = weights.into_iter().map(|w| w.into_iter().collect()).collect();
        Self { terms, edges }
    }

    /// Weighted PageRank; returns (scores, iterations run).
    fn rank(&self) -> (Vec<f64>, usize) {
        let n = self.terms.len();
        let out_weight: Vec<f64> =
            self.edges.iter().map(|e| e.iter().map(|(_, w)| w).sum()).collect();
        let mut scores = vec![1.0; n];

        for iteration in 1..=MAX_ITERATIONS {
            let next: Vec<f64> = (0..n)
                .map(|i| {
                    let inflow: f64 = self.edges[i]
                        .iter()
                        .map(|&(j, w)| w / out_weight[j] * scores[j])
                        .sum();
                    (1.0 - DAMPING) + DAMPING * inflow
                })
                .collect();
            let delta = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
            scores = next;
            if delta < TOLERANCE {
                return (scores, iteration);
            }
        }
        (scores, MAX_ITERATIONS)
    }
}

impl TagExtractor for GraphRankExtractor {
    fn name(&self) -> &'static str {
        "graphrank"
    }

    fn extract(&self, corpus: &[Document]) -> MetaResult<CandidateIndex> {
        let index = corpus
            .par_iter()
            .map(|doc| {
                let graph = CooccurrenceGraph::build(&document_terms(&doc.text));
                let (scores, iterations) = graph.rank();
                tracing::trace!("{}: textrank converged after {} iterations", doc.path, iterations);
                let scored = graph.terms.into_iter().zip(scores);
                (doc.path.clone(), rank_candidates(&doc.path, scored, self.limit))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        Ok(index)
    }
}
