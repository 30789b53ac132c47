//! Progress reporting for resampling runs.
//!
//! Samplers carry a [`Verbosity`] and route their output through
//! [`ResampleLogger`], which stays silent by default.

use std::collections::BTreeMap;

/// How much progress output a sampler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Class counts before and after resampling.
    Info,
    /// Additionally, per-class draw sizes.
    Debug,
}

/// Verbosity-gated logger used by the samplers.
#[derive(Debug, Clone, Copy)]
pub struct ResampleLogger {
    verbosity: Verbosity,
}

impl ResampleLogger {
    /// Create a logger at the given verbosity.
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Report per-class counts at a named stage (`Info` and up).
    pub fn class_counts(&self, stage: &str, counts: &BTreeMap<i64, usize>) {
        if self.verbosity >= Verbosity::Info {
            let summary: Vec<String> = counts.iter().map(|(c, n)| format!("{}: {}", c, n)).collect();
            println!("[resample] class counts ({}): {{{}}}", stage, summary.join(", "));
        }
    }

    /// Report a per-class draw (`Debug` only).
    pub fn class_draw(&self, class: i64, drawn: usize, available: usize) {
        if self.verbosity >= Verbosity::Debug {
            println!(
                "[resample] class {}: drew {} rows from {} available",
                class, drawn, available
            );
        }
    }
}
