//! TF-IDF vector space over one ranking pool.
//!
//! Vocabulary is unigrams plus adjacent bigrams from [`crate::text::terms`]; tf is the raw
//! count, idf is smoothed (`ln((1 + n) / (1 + df)) + 1`) and computed over the pool only.
//! Vectors are L2-normalised. `BTreeMap` keeps iteration order, and so float summation
//! order, deterministic.

use std::collections::BTreeMap;

use crate::requirements::RequirementProfile;
use crate::text::terms;

pub type SparseVector = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default)]
pub struct VectorSpace {
    idf: BTreeMap<String, f64>,
    vectors: Vec<SparseVector>,
}

impl VectorSpace {
    /// Builds document vectors for every text in the pool, in order.
    pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let counts: Vec<BTreeMap<String, f64>> = texts
            .into_iter()
            .map(|text| {
                let mut tf = BTreeMap::new();
                for term in terms(text) {
                    *tf.entry(term).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let n = counts.len() as f64;
        let idf: BTreeMap<String, f64> = df
            .into_iter()
            .map(|(term, df)| (term.to_string(), ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0))
            .collect();

        let vectors = counts
            .into_iter()
            .map(|tf| {
                let mut v: SparseVector = tf
                    .into_iter()
                    .map(|(term, count)| {
                        let weight = count * idf[&term];
                        (term, weight)
                    })
                    .collect();
                l2_normalize(&mut v);
                v
            })
            .collect();

        Self { idf, vectors }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.vectors.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[cfg(test)]
    fn vector(&self, index: usize) -> &SparseVector {
        &self.vectors[index]
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Profile keywords present in the vocabulary, weighted by keyword weight × idf.
    pub fn query_vector(&self, profile: &RequirementProfile) -> SparseVector {
        let mut query: SparseVector = profile
            .weighted_keywords
            .iter()
            .filter_map(|(term, weight)| self.idf(term).map(|idf| (term.clone(), weight * idf)))
            .collect();
        l2_normalize(&mut query);
        query
    }

    /// Cosine similarity of pool entry `index` with `query`, in [0, 1].
    pub fn similarity(&self, index: usize, query: &SparseVector) -> f64 {
        cosine(&self.vectors[index], query)
    }
}

/// Zero when either vector is empty or all-zero.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, x)| large.get(term).map(|y| x * y))
        .sum();
    let norm = norm(a) * norm(b);
    if norm == 0.0 {
        return 0.0;
    }
    (dot / norm).clamp(0.0, 1.0)
}

fn norm(v: &SparseVector) -> f64 {
    v.values().map(|x| x * x).sum::<f64>().sqrt()
}

fn l2_normalize(v: &mut SparseVector) {
    let n = norm(v);
    if n > 0.0 {
        for x in v.values_mut() {
            *x /= n;
        }
    }
}
