//! Per-document embedding similarity with the built-in hashed n-gram model.

use super::normalize::document_terms;
use super::{rank_candidates, TagExtractor};
use crate::domain::{CandidateIndex, Document};
use crate::error::MetaResult;
use rayon::prelude::*;
use std::collections::BTreeSet;

const DIMS: usize = 512;

type Embedding = [f64; DIMS];

pub struct EmbeddingExtractor {
    limit: usize,
}

impl EmbeddingExtractor {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl TagExtractor for EmbeddingExtractor {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn extract(&self, corpus: &[Document]) -> MetaResult<CandidateIndex> {
        let index = corpus
            .par_iter()
            .map(|doc| {
                let terms = document_terms(&doc.text);
                let candidates = if terms.is_empty() {
                    Vec::new()
                } else {
                    let doc_vec = embed_terms(&terms);
                    let unique: BTreeSet<String> = terms.into_iter().collect();
                    let scored = unique.into_iter().map(|term| {
                        let term_vec = embed_terms(std::slice::from_ref(&term));
                        (term, cosine_similarity(&term_vec, &doc_vec))
                    });
                    rank_candidates(&doc.path, scored, self.limit)
                };
                (doc.path.clone(), candidates)
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        Ok(index)
    }
}

/// Normalized hashed bag of tokens and their character trigrams.
fn embed_terms(terms: &[String]) -> Embedding {
    let mut vec = [0.0_f64; DIMS];
    for term in terms {
        vec[bucket(term.as_bytes())] += 1.0;
        let chars: Vec<char> = format!("<{term}>").chars().collect();
        for gram in chars.windows(3) {
            let gram: String = gram.iter().collect();
            vec[bucket(gram.as_bytes())] += 0.5;
        }
    }
    normalize(&mut vec);
    vec
}

fn bucket(bytes: &[u8]) -> usize {
    (fnv1a_64(bytes) % DIMS as u64) as usize
}

fn normalize(vec: &mut Embedding) {
    let norm = vec.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

fn cosine_similarity(a: &Embedding, b: &Embedding) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f64>()
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
