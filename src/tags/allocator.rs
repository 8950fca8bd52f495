//! Turns per-document candidate lists into tags under a corpus-wide distinct-tag budget.

use super::normalize::is_eligible_term;
use crate::domain::{CandidateIndex, TagAssignments};
use std::collections::{BTreeSet, HashSet};

/// Tags chosen so far and the distinct-tag budget they count against.
///
/// Owned by the caller and threaded through [`TagBudgetAllocator::allocate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalTagState {
    used: BTreeSet<String>,
    max_unique: usize,
    assignments: TagAssignments,
}

impl GlobalTagState {
    pub fn new(max_unique: usize) -> Self {
        Self { used: BTreeSet::new(), max_unique, assignments: TagAssignments::new() }
    }

    /// Lower-cased distinct tags handed out so far.
    pub fn used(&self) -> &BTreeSet<String> {
        &self.used
    }

    pub fn max_unique(&self) -> usize {
        self.max_unique
    }

    pub fn assignments(&self) -> &TagAssignments {
        &self.assignments
    }

    pub fn into_assignments(self) -> TagAssignments {
        self.assignments
    }

    /// Admit `key` (already lower-cased) if it is known or the budget has room.
    fn admit(&mut self, key: &str) -> bool {
        if self.used.contains(key) {
            return true;
        }
        if self.used.len() >= self.max_unique {
            return false;
        }
        self.used.insert(key.to_string());
        true
    }
}

/// Picks up to `per_document` tags per document, in lexical path order.
#[derive(Debug, Clone, Copy)]
pub struct TagBudgetAllocator {
    per_document: usize,
}

impl TagBudgetAllocator {
    pub fn new(per_document: usize) -> Self {
        Self { per_document }
    }

    pub fn allocate(&self, candidates: &CandidateIndex, state: &mut GlobalTagState) {
        for (document, list) in candidates {
            let mut picked: Vec<String> = Vec::new();
            let mut seen: HashSet<String> = HashSet::new();

            for candidate in list {
                if picked.len() >= self.per_document {
                    break;
                }
                let term = candidate.term.trim();
                if !is_eligible_term(term) {
                    continue;
                }
                let key = term.to_lowercase();
                if seen.contains(&key) || !state.admit(&key) {
                    continue;
                }
                seen.insert(key);
                picked.push(term.to_string());
            }

            tracing::trace!("{}: tags {:?}", document, picked);
            state.assignments.insert(document.clone(), picked);
        }
    }
}

/// One-shot allocation with a fresh state.
pub fn allocate_tags(
    candidates: &CandidateIndex,
    per_document: usize,
    max_unique: usize,
) -> GlobalTagState {
    let mut state = GlobalTagState::new(max_unique);
    TagBudgetAllocator::new(per_document).allocate(candidates, &mut state);
    tracing::info!("tags: {} distinct of budget {}", state.used().len(), max_unique);
    state
}
