//! Mathematical utility functions

/// Calculate cosine similarity between two dense vectors
/// Returns 0.0 if dimensions don't match or either vector has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        tracing::warn!(
            "cosine_similarity dimension mismatch: a={}, b={}",
            a.len(),
            b.len()
        );
        return 0.0;
    }
    if a.is_empty() {
        return 0.0;
    }
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a * norm_b)
}

pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dot product of two sparse vectors given as sorted (index, value) columns.
pub fn sparse_dot(a_idx: &[usize], a_val: &[f64], b_idx: &[usize], b_val: &[f64]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0;
    while i < a_idx.len() && j < b_idx.len() {
        match a_idx[i].cmp(&b_idx[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a_val[i] * b_val[j];
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

/// Min-max scale each column into [0, 1]; a constant column becomes all zeros.
pub fn min_max_scale_columns(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let width = first.len();
    let mut min = vec![f64::INFINITY; width];
    let mut max = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for (c, &v) in row.iter().enumerate() {
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
        }
    }
    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, &v)| {
                    let range = max[c] - min[c];
                    if range == 0.0 { 0.0 } else { (v - min[c]) / range }
                })
                .collect()
        })
        .collect()
}
