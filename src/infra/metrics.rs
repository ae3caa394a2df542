// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per (run, epoch) so learning curves can be
// plotted after the fact.
//
// Output file: {checkpoint_dir}/metrics.csv
//
//   run,epoch,loss,train_acc,valid_acc,test_acc
//   1,1,5.851200,0.071000,0.069000,0.070000
//   1,2,5.402100,0.113000,0.104000,0.101000
//   ...
//
// The header is written only when the file is created, so
// repeated invocations append to the same log.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::ml::evaluator::SplitAccuracy;

/// One row of metrics for one epoch of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based run number
    pub run:   usize,
    /// 1-based epoch number
    pub epoch: usize,
    /// Training NLL loss of this epoch's update step
    pub loss:  f64,
    /// Accuracies after the update
    pub acc:   SplitAccuracy,
}

impl EpochMetrics {
    pub fn new(run: usize, epoch: usize, loss: f64, acc: SplitAccuracy) -> Self {
        Self { run, epoch, loss, acc }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "run,epoch,loss,train_acc,valid_acc,test_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let [train, valid, test] = m.acc.as_array();
        writeln!(f, "{},{},{:.6},{:.6},{:.6},{:.6}", m.run, m.epoch, m.loss, train, valid, test)?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir = TempDir::new().unwrap();
        let acc = SplitAccuracy { train: 0.5, valid: 0.25, test: 0.125 };

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1, 2.0, acc)).unwrap();

        // a second logger on the same directory must not repeat the header
        let again = MetricsLogger::new(dir.path()).unwrap();
        again.log(&EpochMetrics::new(1, 2, 1.5, acc)).unwrap();

        let text  = fs::read_to_string(again.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "run,epoch,loss,train_acc,valid_acc,test_acc");
        assert_eq!(lines[1], "1,1,2.000000,0.500000,0.250000,0.125000");
        assert!(lines[2].starts_with("1,2,1.500000"));
    }
}
