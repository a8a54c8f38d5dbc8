//! Maximal Marginal Relevance (MMR) for diversity-aware search
//!
//! MMR greedily picks candidates that are relevant to the query but dissimilar to what
//! has already been picked:
//! MMR = λ × similarity(query, doc) - (1-λ) × max(similarity(doc, selected_docs))
//!
//! λ = 1.0: Pure relevance (standard search)
//! λ = 0.5: Balanced relevance + diversity
//! λ = 0.0: Pure diversity

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Select up to `k` candidates by MMR and return their indices in selection order.
///
/// Ties resolve to the earliest candidate, so callers that pass candidates sorted by
/// relevance get a deterministic order.
pub fn mmr_select(query: &[f32], candidates: &[&[f32]], k: usize, lambda: f32) -> Vec<usize> {
    if candidates.is_empty() || k == 0 {
        return Vec::new();
    }

    let lambda = lambda.clamp(0.0, 1.0);
    let k = k.min(candidates.len());
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k);
    // highest similarity of each candidate to anything selected so far
    let mut redundancy = vec![f32::NEG_INFINITY; candidates.len()];
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &idx) in remaining.iter().enumerate() {
            let penalty = if selected.is_empty() { 0.0 } else { redundancy[idx] };
            let score = lambda * relevance[idx] - (1.0 - lambda) * penalty;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        let chosen = remaining.remove(best_pos);
        selected.push(chosen);

        for &idx in &remaining {
            let similarity = cosine_similarity(candidates[idx], candidates[chosen]);
            if similarity > redundancy[idx] {
                redundancy[idx] = similarity;
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_empty_candidates_and_zero_k() {
        let query = [1.0, 0.0];
        assert!(mmr_select(&query, &[], 5, 0.5).is_empty());
        let only: &[f32] = &[1.0, 0.0];
        assert!(mmr_select(&query, &[only], 0, 0.5).is_empty());
    }

    #[test]
    fn test_returns_at_most_candidates() {
        let query = [1.0, 0.0];
        let a: &[f32] = &[0.9, 0.1];
        assert_eq!(mmr_select(&query, &[a], 10, 0.5), vec![0]);
    }

    #[test]
    fn test_pure_relevance_preserves_order() {
        let query = [1.0, 0.0];
        let a: &[f32] = &[0.9, 0.1];
        let b: &[f32] = &[0.88, 0.12];
        let c: &[f32] = &[0.5, 0.5];
        assert_eq!(mmr_select(&query, &[a, b, c], 3, 1.0), vec![0, 1, 2]);
    }

    #[test]
    fn test_promotes_diversity() {
        let query = [1.0, 0.0, 0.0];
        let best: &[f32] = &[0.99, 0.01, 0.0];
        let near_duplicate: &[f32] = &[0.98, 0.02, 0.0];
        let different: &[f32] = &[0.0, 0.0, 1.0];

        let picked = mmr_select(&query, &[best, near_duplicate, different], 2, 0.5);
        assert_eq!(picked[0], 0);
        assert_eq!(picked[1], 2, "MMR should prefer the diverse result over the near-duplicate");
    }

    #[test]
    fn test_identical_vectors_still_fill_k() {
        let query = [1.0, 0.0];
        let v: &[f32] = &[1.0, 0.0];
        assert_eq!(mmr_select(&query, &[v, v, v], 3, 0.5), vec![0, 1, 2]);
    }
}
