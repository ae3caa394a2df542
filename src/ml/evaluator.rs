// ============================================================
// Layer 5 — Accuracy Evaluator
// ============================================================
// Same metric the OGB leaderboard uses for ogbn-mag:
//
//   acc = (# split nodes with y_pred == y_true) / (# split nodes)
//
// Predictions and labels are plain host vectors, so this file has
// no Burn dependency and is cheap to test.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::domain::graph::SplitIndex;

/// Accuracy on each split, as fractions in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitAccuracy {
    pub train: f64,
    pub valid: f64,
    pub test:  f64,
}

impl SplitAccuracy {
    pub fn as_array(&self) -> [f64; 3] {
        [self.train, self.valid, self.test]
    }
}

/// Accuracy of `y_pred` against `y_true` over the nodes in `idx`.
/// An empty index set scores 0.
pub fn accuracy(y_true: &[i64], y_pred: &[i64], idx: &[usize]) -> Result<f64> {
    ensure!(
        y_true.len() == y_pred.len(),
        "y_true has {} entries but y_pred has {}",
        y_true.len(),
        y_pred.len()
    );
    if idx.is_empty() {
        return Ok(0.0);
    }

    let mut correct = 0usize;
    for &i in idx {
        ensure!(i < y_true.len(), "split index {i} out of range ({} nodes)", y_true.len());
        if y_true[i] == y_pred[i] {
            correct += 1;
        }
    }
    Ok(correct as f64 / idx.len() as f64)
}

/// Accuracy on the train, valid and test splits.
pub fn evaluate_splits(y_true: &[i64], y_pred: &[i64], split: &SplitIndex) -> Result<SplitAccuracy> {
    Ok(SplitAccuracy {
        train: accuracy(y_true, y_pred, &split.train)?,
        valid: accuracy(y_true, y_pred, &split.valid)?,
        test:  accuracy(y_true, y_pred, &split.test)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_counts_matches_in_split_only() {
        let y_true = [0, 1, 2, 3];
        let y_pred = [0, 0, 2, 0];
        assert_eq!(accuracy(&y_true, &y_pred, &[0, 2]).unwrap(), 1.0);
        assert_eq!(accuracy(&y_true, &y_pred, &[1, 3]).unwrap(), 0.0);
        assert_eq!(accuracy(&y_true, &y_pred, &[0, 1, 2, 3]).unwrap(), 0.5);
    }

    #[test]
    fn test_empty_split_scores_zero() {
        assert_eq!(accuracy(&[1], &[1], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        assert!(accuracy(&[1, 2], &[1], &[0]).is_err());
    }

    #[test]
    fn test_index_out_of_range_is_an_error() {
        assert!(accuracy(&[1, 2], &[1, 2], &[2]).is_err());
    }

    #[test]
    fn test_evaluate_splits() {
        let split = SplitIndex::new(vec![0, 1], vec![2], vec![3]);
        let acc   = evaluate_splits(&[0, 1, 1, 0], &[0, 0, 1, 1], &split).unwrap();
        assert_eq!(acc.as_array(), [0.5, 1.0, 0.0]);
    }
}
