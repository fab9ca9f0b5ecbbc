use crate::stats::TrialMetrics;
use std::fmt;

/// `Summary` reduces one metric's per-trial samples to a mean and a population standard
/// deviation. Eviction at L2 is randomized, so the spread across trials is a first-class output
/// rather than noise. NaN samples (a hit ratio from a trial where a level was never accessed)
/// are excluded from the reduction instead of poisoning it.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Summary {
    pub mean: f64,
    pub deviation: f64,
}

impl Summary {
    /// Reduce a slice of per-trial samples.
    pub fn from_samples(samples: &[f64]) -> Self {
        let finite = samples
            .iter()
            .copied()
            .filter(|sample| !sample.is_nan())
            .collect::<Vec<f64>>();
        if finite.is_empty() {
            return Self {
                mean: f64::NAN,
                deviation: f64::NAN,
            };
        }

        let count = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / count;
        let variance = finite
            .iter()
            .map(|sample| (sample - mean) * (sample - mean))
            .sum::<f64>()
            / count;
        Self {
            mean,
            deviation: variance.sqrt(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6e} (sd {:.6e})", self.mean, self.deviation)
    }
}

fn summarize(trials: &[TrialMetrics], metric: fn(&TrialMetrics) -> f64) -> Summary {
    Summary::from_samples(&trials.iter().map(metric).collect::<Vec<f64>>())
}

/// `TraceReport` aggregates the metrics of every trial run against one trace into the final
/// mean/deviation figures reported to the user.
pub struct TraceReport {
    pub trace: String,
    pub trials: usize,
    pub l1_hit_ratio: Summary,
    pub l2_hit_ratio: Summary,
    pub l1_dynamic_energy: Summary,
    pub l1_idle_energy: Summary,
    pub l1_total_energy: Summary,
    pub l2_dynamic_energy: Summary,
    pub l2_idle_energy: Summary,
    pub l2_total_energy: Summary,
    pub dram_dynamic_energy: Summary,
    pub dram_idle_energy: Summary,
    pub dram_accesses: Summary,
    pub elapsed_seconds: Summary,
    pub skipped_records: u64,
}

impl TraceReport {
    /// Reduce the per-trial metrics collected for one trace.
    ///
    /// # Arguments
    ///
    /// * `trace` - display name of the trace file.
    /// * `trials` - metrics of every completed trial, in run order.
    pub fn from_trials(trace: &str, trials: &[TrialMetrics]) -> Self {
        Self {
            trace: String::from(trace),
            trials: trials.len(),
            l1_hit_ratio: summarize(trials, |trial| trial.l1.hit_ratio()),
            l2_hit_ratio: summarize(trials, |trial| trial.l2.hit_ratio()),
            l1_dynamic_energy: summarize(trials, |trial| trial.l1_dynamic_energy),
            l1_idle_energy: summarize(trials, |trial| trial.l1_idle_energy),
            l1_total_energy: summarize(trials, |trial| {
                trial.l1_dynamic_energy + trial.l1_idle_energy
            }),
            l2_dynamic_energy: summarize(trials, |trial| trial.l2_dynamic_energy),
            l2_idle_energy: summarize(trials, |trial| trial.l2_idle_energy),
            l2_total_energy: summarize(trials, |trial| {
                trial.l2_dynamic_energy + trial.l2_idle_energy
            }),
            dram_dynamic_energy: summarize(trials, |trial| trial.dram_dynamic_energy),
            dram_idle_energy: summarize(trials, |trial| trial.dram_idle_energy),
            dram_accesses: summarize(trials, |trial| trial.dram_accesses as f64),
            elapsed_seconds: summarize(trials, |trial| trial.elapsed_seconds),
            skipped_records: trials.first().map_or(0, |trial| trial.skipped_records),
        }
    }
}

impl fmt::Display for TraceReport {
    /// Display format specification for the `TraceReport` struct implemented to simplify the
    /// process of outputting per-trace statistics to the terminal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "
{}
---------------------------------
trials:                  {:08}
skipped records:         {:08}

l1 hit ratio:            {}
l2 hit ratio:            {}
l1 energy (dynamic):     {}
l1 energy (idle):        {}
l1 energy (total):       {}
l2 energy (dynamic):     {}
l2 energy (idle):        {}
l2 energy (total):       {}
dram energy (dynamic):   {}
dram energy (idle):      {}
dram accesses:           {}
active time (seconds):   {}
               ",
            self.trace,
            self.trials,
            self.skipped_records,
            self.l1_hit_ratio,
            self.l2_hit_ratio,
            self.l1_dynamic_energy,
            self.l1_idle_energy,
            self.l1_total_energy,
            self.l2_dynamic_energy,
            self.l2_idle_energy,
            self.l2_total_energy,
            self.dram_dynamic_energy,
            self.dram_idle_energy,
            self.dram_accesses,
            self.elapsed_seconds,
        )
    }
}
