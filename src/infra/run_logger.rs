// ============================================================
// Layer 6 — Multi-Run Result Logger
// ============================================================
// Collects (train, valid, test) accuracy for every epoch of every
// run and turns them into the numbers a benchmark reports.
//
// Per run, model selection is by validation accuracy:
//
//   Highest Train   max train accuracy over all epochs
//   Highest Valid   max valid accuracy over all epochs
//   Final Train     train accuracy at the best-valid epoch
//   Final Test      test  accuracy at the best-valid epoch
//
// Across runs each of the four is reported as mean ± std, where
// std is the sample standard deviation (n - 1). With a single run
// the spread is undefined and reported as 0.

use anyhow::{bail, ensure, Result};

use crate::ml::evaluator::SplitAccuracy;

/// Best-epoch summary of one run, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub highest_train: f64,
    pub highest_valid: f64,
    pub final_train:   f64,
    pub final_test:    f64,
    /// 1-based epoch at which validation peaked
    pub best_epoch:    usize,
}

/// mean ± std of one statistic across runs, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanStd {
    pub mean: f64,
    pub std:  f64,
}

impl MeanStd {
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { mean: 0.0, std: 0.0 };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        Self { mean, std }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSummary {
    pub runs:          usize,
    pub highest_train: MeanStd,
    pub highest_valid: MeanStd,
    pub final_train:   MeanStd,
    pub final_test:    MeanStd,
}

#[derive(Debug)]
pub struct RunLogger {
    results: Vec<Vec<SplitAccuracy>>,
}

impl RunLogger {
    pub fn new(runs: usize) -> Self {
        Self { results: vec![Vec::new(); runs] }
    }

    pub fn runs(&self) -> usize {
        self.results.len()
    }

    /// Record one epoch of run `run` (0-based).
    pub fn add_result(&mut self, run: usize, result: SplitAccuracy) -> Result<()> {
        ensure!(run < self.results.len(), "run {run} out of range ({} runs)", self.results.len());
        self.results[run].push(result);
        Ok(())
    }

    pub fn run_summary(&self, run: usize) -> Result<RunSummary> {
        let Some(epochs) = self.results.get(run) else {
            bail!("run {run} out of range ({} runs)", self.results.len());
        };
        ensure!(!epochs.is_empty(), "run {run} has no recorded epochs");

        // first epoch with the highest validation accuracy
        let mut best = 0usize;
        for (i, r) in epochs.iter().enumerate() {
            if r.valid > epochs[best].valid {
                best = i;
            }
        }

        Ok(RunSummary {
            highest_train: 100.0 * epochs.iter().map(|r| r.train).fold(f64::MIN, f64::max),
            highest_valid: 100.0 * epochs[best].valid,
            final_train:   100.0 * epochs[best].train,
            final_test:    100.0 * epochs[best].test,
            best_epoch:    best + 1,
        })
    }

    /// Summary over every run that has at least one recorded epoch.
    pub fn aggregate(&self) -> Result<AggregateSummary> {
        let summaries: Vec<RunSummary> = (0..self.results.len())
            .filter(|&r| !self.results[r].is_empty())
            .map(|r| self.run_summary(r))
            .collect::<Result<_>>()?;
        ensure!(!summaries.is_empty(), "no results recorded");

        let column = |f: fn(&RunSummary) -> f64| -> MeanStd {
            MeanStd::of(&summaries.iter().map(f).collect::<Vec<_>>())
        };

        Ok(AggregateSummary {
            runs:          summaries.len(),
            highest_train: column(|s| s.highest_train),
            highest_valid: column(|s| s.highest_valid),
            final_train:   column(|s| s.final_train),
            final_test:    column(|s| s.final_test),
        })
    }

    /// One run's statistics, or the aggregate when `run` is None.
    /// Percentages with two decimals, one statistic per line.
    pub fn format_statistics(&self, run: Option<usize>) -> Result<String> {
        let text = match run {
            Some(run) => {
                let s = self.run_summary(run)?;
                format!(
                    "Run {:02}:\n\
                     Highest Train: {:.2}\n\
                     Highest Valid: {:.2}\n  \
                     Final Train: {:.2}\n   \
                     Final Test: {:.2}",
                    run + 1,
                    s.highest_train,
                    s.highest_valid,
                    s.final_train,
                    s.final_test
                )
            }
            None => {
                let a = self.aggregate()?;
                format!(
                    "All runs:\n\
                     Highest Train: {:.2} ± {:.2}\n\
                     Highest Valid: {:.2} ± {:.2}\n  \
                     Final Train: {:.2} ± {:.2}\n   \
                     Final Test: {:.2} ± {:.2}",
                    a.highest_train.mean,
                    a.highest_train.std,
                    a.highest_valid.mean,
                    a.highest_valid.std,
                    a.final_train.mean,
                    a.final_train.std,
                    a.final_test.mean,
                    a.final_test.std
                )
            }
        };
        Ok(text)
    }

    pub fn print_statistics(&self, run: Option<usize>) -> Result<()> {
        println!("{}", self.format_statistics(run)?);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn acc(train: f64, valid: f64, test: f64) -> SplitAccuracy {
        SplitAccuracy { train, valid, test }
    }

    #[test]
    fn test_run_summary_uses_best_valid_epoch() {
        let mut log = RunLogger::new(1);
        log.add_result(0, acc(0.50, 0.40, 0.30)).unwrap();
        log.add_result(0, acc(0.60, 0.55, 0.52)).unwrap();
        log.add_result(0, acc(0.90, 0.50, 0.45)).unwrap();

        let s = log.run_summary(0).unwrap();
        assert!((s.highest_train - 90.0).abs() < 1e-9);
        assert!((s.highest_valid - 55.0).abs() < 1e-9);
        assert!((s.final_train - 60.0).abs() < 1e-9);
        assert!((s.final_test - 52.0).abs() < 1e-9);
        assert_eq!(s.best_epoch, 2);
    }

    #[test]
    fn test_ties_keep_first_epoch() {
        let mut log = RunLogger::new(1);
        log.add_result(0, acc(0.1, 0.5, 0.2)).unwrap();
        log.add_result(0, acc(0.9, 0.5, 0.8)).unwrap();
        assert_eq!(log.run_summary(0).unwrap().best_epoch, 1);
    }

    #[test]
    fn test_aggregate_mean_and_sample_std() {
        let mut log = RunLogger::new(2);
        log.add_result(0, acc(0.5, 0.5, 0.4)).unwrap();
        log.add_result(1, acc(0.7, 0.7, 0.6)).unwrap();

        let a = log.aggregate().unwrap();
        assert_eq!(a.runs, 2);
        assert!((a.final_test.mean - 50.0).abs() < 1e-9);
        // sample std of {40, 60} = sqrt(200) ≈ 14.142
        assert!((a.final_test.std - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_single_run_has_zero_spread() {
        let m = MeanStd::of(&[42.0]);
        assert_eq!(m, MeanStd { mean: 42.0, std: 0.0 });
    }

    #[test]
    fn test_run_out_of_range_is_an_error() {
        let mut log = RunLogger::new(1);
        assert!(log.add_result(1, acc(0.0, 0.0, 0.0)).is_err());
        assert!(log.run_summary(3).is_err());
    }

    #[test]
    fn test_empty_logger_cannot_aggregate() {
        assert!(RunLogger::new(3).aggregate().is_err());
        assert!(RunLogger::new(1).run_summary(0).is_err());
    }

    #[test]
    fn test_run_statistics_text() {
        let mut log = RunLogger::new(2);
        log.add_result(0, acc(0.5, 0.4, 0.3)).unwrap();
        log.add_result(0, acc(0.61, 0.55, 0.525)).unwrap();
        log.add_result(1, acc(0.7, 0.65, 0.6)).unwrap();

        let text = log.format_statistics(Some(0)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Run 01:",
                "Highest Train: 61.00",
                "Highest Valid: 55.00",
                "  Final Train: 61.00",
                "   Final Test: 52.50",
            ]
        );
    }

    #[test]
    fn test_aggregate_statistics_text() {
        let mut log = RunLogger::new(2);
        log.add_result(0, acc(0.5, 0.5, 0.4)).unwrap();
        log.add_result(1, acc(0.7, 0.7, 0.6)).unwrap();

        let text = log.format_statistics(None).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "All runs:",
                "Highest Train: 60.00 ± 14.14",
                "Highest Valid: 60.00 ± 14.14",
                "  Final Train: 60.00 ± 14.14",
                "   Final Test: 50.00 ± 14.14",
            ]
        );
    }
}
