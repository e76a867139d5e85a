// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per epoch with the averages of the values
// printed on every iteration:
//
//   epoch,loss_d,loss_g,d_x,d_g_z1,d_g_z2
//   0,1.102344,3.018220,0.612004,0.280113,0.071925
//
//   loss_d  discriminator loss  BCE(D(x),1) + BCE(D(G(z)),0)
//   loss_g  generator loss      BCE(D(G(z)),1)
//   d_x     mean D(x) on real images
//   d_g_z1  mean D(G(z)) before the discriminator update
//   d_g_z2  mean D(G(z)) after it
//
// Output file: <outf>/metrics.csv

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

const CSV_HEADER: &str = "epoch,loss_d,loss_g,d_x,d_g_z1,d_g_z2";

/// Values measured on a single training iteration
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationStats {
    pub loss_d: f64,
    pub loss_g: f64,
    pub d_x:    f64,
    pub d_g_z1: f64,
    pub d_g_z2: f64,
}

/// Running averages over one epoch
#[derive(Debug, Clone, Default)]
pub struct EpochMetrics {
    pub epoch:      usize,
    pub iterations: usize,
    sum:            IterationStats,
}

impl EpochMetrics {
    pub fn new(epoch: usize) -> Self {
        Self { epoch, ..Default::default() }
    }

    pub fn record(&mut self, s: &IterationStats) {
        self.sum.loss_d += s.loss_d;
        self.sum.loss_g += s.loss_g;
        self.sum.d_x    += s.d_x;
        self.sum.d_g_z1 += s.d_g_z1;
        self.sum.d_g_z2 += s.d_g_z2;
        self.iterations += 1;
    }

    /// Per-iteration averages; NaN everywhere for an empty epoch
    pub fn mean(&self) -> IterationStats {
        if self.iterations == 0 {
            return IterationStats {
                loss_d: f64::NAN,
                loss_g: f64::NAN,
                d_x:    f64::NAN,
                d_g_z1: f64::NAN,
                d_g_z2: f64::NAN,
            };
        }
        let n = self.iterations as f64;
        IterationStats {
            loss_d: self.sum.loss_d / n,
            loss_g: self.sum.loss_g / n,
            d_x:    self.sum.d_x / n,
            d_g_z1: self.sum.d_g_z1 / n,
            d_g_z2: self.sum.d_g_z2 / n,
        }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and the CSV header if missing.
    /// An existing file is appended to, so resumed runs extend it.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let avg = m.mean();
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, avg.loss_d, avg.loss_g, avg.d_x, avg.d_g_z1, avg.d_g_z2,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: loss_d={:.4}, loss_g={:.4}",
            m.epoch,
            avg.loss_d,
            avg.loss_g,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(loss_d: f64, loss_g: f64) -> IterationStats {
        IterationStats { loss_d, loss_g, d_x: 0.5, d_g_z1: 0.4, d_g_z2: 0.3 }
    }

    #[test]
    fn test_epoch_averages() {
        let mut m = EpochMetrics::new(3);
        m.record(&stats(1.0, 4.0));
        m.record(&stats(3.0, 2.0));
        let avg = m.mean();
        assert_eq!(m.iterations, 2);
        assert!((avg.loss_d - 2.0).abs() < 1e-12);
        assert!((avg.loss_g - 3.0).abs() < 1e-12);
        assert!((avg.d_g_z2 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_epoch_is_nan() {
        assert!(EpochMetrics::new(0).mean().loss_d.is_nan());
    }

    #[test]
    fn test_csv_rows_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        let mut m = EpochMetrics::new(0);
        m.record(&stats(1.25, 0.5));
        logger.log(&m).unwrap();

        // A second logger on the same directory keeps the existing rows
        let again = MetricsLogger::new(dir.path()).unwrap();
        again.log(&EpochMetrics { epoch: 1, ..m.clone() }).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("0,1.250000,0.500000,"));
        assert!(lines[2].starts_with("1,"));
    }
}
