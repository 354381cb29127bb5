//! Similarity metrics: cosine, Jaccard, and field-level metadata scoring.

use std::collections::{HashMap, HashSet};

use hearth_core::types::Document;

/// Cosine similarity between two term-frequency vectors.
///
/// Returns 0 when either vector is empty. Symmetric in its arguments.
pub fn cosine_similarity(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    for (term, weight) in a {
        if let Some(other) = b.get(term) {
            dot += weight * other;
        }
    }

    let norm_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Jaccard index over two sets. Returns 0 when both sets are empty.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Field-level metadata similarity between two documents.
///
/// Counts matches over a fixed field set (type, category, source, author,
/// file type, language, tags), divided by the number of fields present in
/// both documents. Array fields contribute their Jaccard overlap; document
/// dates contribute full credit within 2 days and half credit within 7.
pub fn metadata_similarity(a: &Document, b: &Document) -> f64 {
    let mut matched = 0.0;
    let mut present = 0usize;

    // Document type is always present.
    present += 1;
    if a.doc_type == b.doc_type {
        matched += 1.0;
    }

    scalar_field(&a.category, &b.category, &mut matched, &mut present);
    scalar_field(&a.source, &b.source, &mut matched, &mut present);
    scalar_field(&a.author, &b.author, &mut matched, &mut present);
    scalar_field(&a.file_type, &b.file_type, &mut matched, &mut present);
    scalar_field(&a.language, &b.language, &mut matched, &mut present);

    if !a.tags.is_empty() && !b.tags.is_empty() {
        present += 1;
        let set_a: HashSet<String> = a.tags.iter().map(|t| t.to_lowercase()).collect();
        let set_b: HashSet<String> = b.tags.iter().map(|t| t.to_lowercase()).collect();
        matched += jaccard_similarity(&set_a, &set_b);
    }

    if let (Some(date_a), Some(date_b)) = (a.doc_date, b.doc_date) {
        present += 1;
        let days_apart = (date_a - date_b).num_days().abs();
        if days_apart <= 2 {
            matched += 1.0;
        } else if days_apart <= 7 {
            matched += 0.5;
        }
    }

    if present == 0 {
        return 0.0;
    }
    matched / present as f64
}

fn scalar_field(a: &Option<String>, b: &Option<String>, matched: &mut f64, present: &mut usize) {
    if let (Some(va), Some(vb)) = (a, b) {
        *present += 1;
        if va.eq_ignore_ascii_case(vb) {
            *matched += 1.0;
        }
    }
}
