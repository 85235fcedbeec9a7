//! RPN evaluation over sorted posting lists, plus tf-idf ranking of the
//! boolean result set.

use crate::index::{DocId, InvertedIndex};
use crate::persist::{self, IndexPaths};
use crate::query::{self, Operator, QueryToken, RpnToken};
use crate::stemmer;
use anyhow::Result;
use std::cmp::Ordering;
use std::path::Path;

const MAX_RESULTS: usize = 100;
const TITLE_BONUS: f64 = 0.35;
const URL_BONUS: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub url: String,
    pub title: String,
}

/// Read-only query engine over a loaded index. Holds no interior
/// mutability, so a shared reference may be used from multiple threads.
pub struct SearchEngine {
    index: InvertedIndex,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex) -> Self {
        Self { index }
    }

    pub fn load<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let index = persist::load_index(&IndexPaths::new(index_dir))?;
        Ok(Self::new(index))
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn vocabulary_size(&self) -> usize {
        self.index.vocabulary_size()
    }

    pub fn num_doc_slots(&self) -> usize {
        self.index.num_doc_slots()
    }

    /// Stored metadata for a document; `None` for holes and out-of-range
    /// ids.
    pub fn document(&self, doc_id: DocId) -> Option<(&str, &str)> {
        let url = self.index.doc_urls.get(doc_id as usize)?;
        if url.is_empty() {
            return None;
        }
        Some((url.as_str(), &self.index.doc_titles[doc_id as usize]))
    }

    /// Evaluate a boolean query and rank the matches. Returns the top
    /// results (at most 100) and the total match count before truncation.
    /// Malformed queries degrade to empty or partial results, never errors.
    pub fn search(&self, raw_query: &str) -> (Vec<SearchResult>, usize) {
        let tokens = query::lex(raw_query);
        if tokens.is_empty() {
            return (Vec::new(), 0);
        }

        let rpn = query::to_rpn(&tokens);
        let doc_ids = self.eval_rpn(&rpn);
        let total = doc_ids.len();
        let query_terms = unique_stems(&tokens);

        let mut scored: Vec<(DocId, f64)> = doc_ids
            .into_iter()
            .map(|doc_id| (doc_id, self.compute_doc_score(doc_id, &query_terms)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let results = scored
            .into_iter()
            .take(MAX_RESULTS)
            .filter_map(|(doc_id, _)| {
                let url = self.index.doc_urls.get(doc_id as usize)?;
                Some(SearchResult {
                    doc_id,
                    url: url.clone(),
                    title: self.index.doc_titles[doc_id as usize].clone(),
                })
            })
            .collect();
        (results, total)
    }

    /// Walk the RPN with a stack of ascending doc-id lists. Operand
    /// underflow skips the operator rather than failing; a binary `not`
    /// missing its left operand falls back to the document universe.
    fn eval_rpn(&self, rpn: &[RpnToken]) -> Vec<DocId> {
        let mut stack: Vec<Vec<DocId>> = Vec::new();
        for token in rpn {
            match token {
                RpnToken::Term(term) => {
                    stack.push(self.posting_doc_ids(&stemmer::stem(term)));
                }
                RpnToken::Op(Operator::Not) => {
                    let right = match stack.pop() {
                        Some(right) => right,
                        None => continue,
                    };
                    let left = stack.pop().unwrap_or_else(|| self.all_document_ids());
                    stack.push(difference(&left, &right));
                }
                RpnToken::Op(op) => {
                    if stack.len() < 2 {
                        continue;
                    }
                    let right = stack.pop().unwrap_or_default();
                    let left = stack.pop().unwrap_or_default();
                    let merged = match op {
                        Operator::And => intersect(&left, &right),
                        Operator::Or => union(&left, &right),
                        Operator::Not => unreachable!("handled above"),
                    };
                    stack.push(merged);
                }
            }
        }
        stack.pop().unwrap_or_default()
    }

    fn posting_doc_ids(&self, stemmed_term: &str) -> Vec<DocId> {
        match self.index.postings_for(stemmed_term) {
            Some(list) => list.iter().map(|posting| posting.doc_id).collect(),
            None => Vec::new(),
        }
    }

    /// Every non-hole doc id, ascending. This is the universe a leading
    /// `not` subtracts from.
    fn all_document_ids(&self) -> Vec<DocId> {
        self.index
            .doc_urls
            .iter()
            .enumerate()
            .filter(|(_, url)| !url.is_empty())
            .map(|(doc_id, _)| doc_id as DocId)
            .collect()
    }

    fn compute_doc_score(&self, doc_id: DocId, query_terms: &[String]) -> f64 {
        let slot = doc_id as usize;
        if slot >= self.index.doc_urls.len() {
            return -1.0;
        }
        let total_docs = self.index.num_doc_slots() as f64;
        let title_lower = self.index.doc_titles[slot].to_ascii_lowercase();
        let url_lower = self.index.doc_urls[slot].to_ascii_lowercase();

        let mut score = 0.0;
        for term in query_terms {
            let list = match self.index.postings_for(term) {
                Some(list) => list,
                None => continue,
            };
            let tf = match list.binary_search_by_key(&doc_id, |posting| posting.doc_id) {
                Ok(i) => list[i].tf,
                Err(_) => continue,
            };
            let df = list.len() as f64;
            let tf_weight = 1.0 + (tf as f64).ln();
            let idf = ((total_docs + 1.0) / (df + 1.0)).ln() + 1.0;
            score += tf_weight * idf;

            if title_lower.contains(term.as_str()) {
                score += TITLE_BONUS;
            }
            if url_lower.contains(term.as_str()) {
                score += URL_BONUS;
            }
        }

        let length = self.index.doc_lengths.get(slot).copied().unwrap_or(0);
        if length > 0 {
            score / (length as f64).sqrt()
        } else {
            score
        }
    }
}

/// Unique stemmed query terms in first-appearance order; operators and
/// parens are already excluded by the token type.
fn unique_stems(tokens: &[QueryToken]) -> Vec<String> {
    let mut stems = Vec::new();
    for token in tokens {
        if let QueryToken::Term(term) = token {
            let stem = stemmer::stem(term);
            if stem.is_empty() || stems.contains(&stem) {
                continue;
            }
            stems.push(stem);
        }
    }
    stems
}

/// Sorted-merge intersection of two ascending lists.
pub fn intersect(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            Ordering::Equal => {
                result.push(left[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    result
}

/// Sorted-merge union of two ascending lists, duplicates collapsed.
pub fn union(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() || j < right.len() {
        if j >= right.len() || (i < left.len() && left[i] < right[j]) {
            result.push(left[i]);
            i += 1;
        } else if i >= left.len() || right[j] < left[i] {
            result.push(right[j]);
            j += 1;
        } else {
            result.push(left[i]);
            i += 1;
            j += 1;
        }
    }
    result
}

/// Sorted-merge difference `left - right` of two ascending lists.
pub fn difference(left: &[DocId], right: &[DocId]) -> Vec<DocId> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() {
        if j >= right.len() {
            result.push(left[i]);
            i += 1;
        } else {
            match left[i].cmp(&right[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    result.push(left[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_keeps_common_elements_in_order() {
        assert_eq!(intersect(&[1, 3, 5, 7], &[2, 3, 7, 9]), vec![3, 7]);
        assert_eq!(intersect(&[], &[1, 2]), Vec::<DocId>::new());
    }

    #[test]
    fn union_collapses_duplicates() {
        assert_eq!(union(&[1, 3, 5], &[2, 3, 6]), vec![1, 2, 3, 5, 6]);
        assert_eq!(union(&[], &[4]), vec![4]);
    }

    #[test]
    fn difference_subtracts_right_from_left() {
        assert_eq!(difference(&[1, 2, 3, 4], &[2, 4]), vec![1, 3]);
        assert_eq!(difference(&[1, 2], &[]), vec![1, 2]);
        assert_eq!(difference(&[], &[1]), Vec::<DocId>::new());
    }

    #[test]
    fn set_op_outputs_stay_strictly_ascending() {
        let a = [0, 2, 4, 6, 8];
        let b = [1, 2, 3, 8, 9];
        for out in [intersect(&a, &b), union(&a, &b), difference(&a, &b)] {
            assert!(out.windows(2).all(|w| w[0] < w[1]), "not ascending: {out:?}");
        }
    }

    #[test]
    fn unique_stems_dedupes_in_query_order() {
        let tokens = query::lex("running AND runs OR vault");
        assert_eq!(unique_stems(&tokens), vec!["run", "vault"]);
    }
}
