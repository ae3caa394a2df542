// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// OGB ships a fixed time-based split for ogbn-mag, so the real
// dataset never goes through here. Generated graphs do: their
// target nodes are shuffled and cut into three index lists.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom with a
// caller-supplied RNG, so a seeded generator gives the same split
// every time.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::graph::SplitIndex;

/// Shuffle `0..n` and split it into (train, valid, test).
///
/// `train_fraction` and `valid_fraction` are clamped so that the
/// three lists always partition `0..n` exactly; the test split
/// takes whatever is left.
pub fn split_indices<R: Rng + ?Sized>(
    n:              usize,
    train_fraction: f64,
    valid_fraction: f64,
    rng:            &mut R,
) -> SplitIndex {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(rng);

    let train_at = ((n as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let train_at = train_at.min(n);
    let valid_len = ((n as f64) * valid_fraction.clamp(0.0, 1.0)).round() as usize;
    let valid_at = (train_at + valid_len).min(n);

    // split_off(k) keeps [..k] and returns [k..]
    let mut rest = idx.split_off(train_at);
    let test     = rest.split_off(valid_at - train_at);

    tracing::debug!(
        "Split {} nodes: {} train, {} valid, {} test",
        n,
        idx.len(),
        rest.len(),
        test.len()
    );

    SplitIndex::new(idx, rest, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_correct_split_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let split   = split_indices(100, 0.2, 0.2, &mut rng);
        assert_eq!(split.train.len(), 20);
        assert_eq!(split.valid.len(), 20);
        assert_eq!(split.test.len(),  60);
    }

    #[test]
    fn test_all_items_preserved_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let split   = split_indices(57, 0.5, 0.3, &mut rng);
        let mut all: Vec<usize> = split
            .train
            .iter()
            .chain(&split.valid)
            .chain(&split.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..57).collect::<Vec<_>>());
    }

    #[test]
    fn test_fractions_over_one_are_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let split   = split_indices(10, 0.8, 0.8, &mut rng);
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.valid.len(), 2);
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_indices(30, 0.3, 0.3, &mut StdRng::seed_from_u64(11));
        let b = split_indices(30, 0.3, 0.3, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let mut rng = StdRng::seed_from_u64(0);
        let split   = split_indices(0, 0.2, 0.2, &mut rng);
        assert!(split.train.is_empty() && split.valid.is_empty() && split.test.is_empty());
    }
}
