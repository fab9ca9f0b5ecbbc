#![allow(dead_code, unused_imports)]
pub mod address;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dram;
pub mod report;
pub mod stats;
pub mod trace;

use address::Geometry;
use cache::{MemoryHierarchy, RandomVictimSelector, VictimSelector, WritePolicy};
use config::Config;
use indicatif::ProgressBar;
use report::TraceReport;
use stats::TrialMetrics;
use std::fmt;
use trace::TraceReader;

/// Type Alias: A rebranding of the `Result` enum from the standard library which focuses on
/// errors that may prevent a simulation run from completing.
type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Geometry(address::Error),
    IOError(std::io::Error),
}

impl From<address::Error> for Error {
    fn from(value: address::Error) -> Self {
        Error::Geometry(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IOError(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Geometry(error) => write!(f, "geometry error: {}", error),
            Error::IOError(error) => write!(f, "io error: {}", error),
        }
    }
}

/// A structure which contains the fixed parameters shared by every trial of a simulation run:
/// the validated per-level geometries, the write policies, and the trial count. The per-trial
/// mutable state (caches, clock, randomness) is constructed fresh for each replay.
pub struct Simulation {
    l1_geometry: Geometry,
    l2_geometry: Geometry,
    l2_associativity: usize,
    l1_policy: WritePolicy,
    l2_policy: WritePolicy,
    trials: u64,
}

impl Simulation {
    /// Derive the run parameters from a parsed configuration.
    ///
    /// # Errors
    ///
    /// Fails when either cache geometry is rejected; see `address::Geometry::build`.
    pub fn build(config: &Config) -> Result<Self> {
        Ok(Self {
            l1_geometry: Geometry::build(config.l1_size, config.l1_line_size, 1)?,
            l2_geometry: Geometry::build(
                config.l2_size,
                config.l2_line_size,
                config.l2_associativity,
            )?,
            l2_associativity: config.l2_associativity as usize,
            l1_policy: config.l1_write_policy,
            l2_policy: config.l2_write_policy,
            trials: config.trials,
        })
    }

    /// Replay one trace against a freshly initialized hierarchy and return the trial's metrics.
    ///
    /// # Arguments
    ///
    /// * `path` - trace file to replay.
    /// * `selector` - eviction source for this trial; production trials pass an independently
    ///   seeded random selector.
    ///
    /// # Errors
    ///
    /// Fails when the trace file cannot be opened.
    pub fn run_trial(&self, path: &str, selector: Box<dyn VictimSelector>) -> Result<TrialMetrics> {
        let mut hierarchy = MemoryHierarchy::build(
            self.l1_geometry,
            self.l2_geometry,
            self.l2_associativity,
            self.l1_policy,
            self.l2_policy,
            selector,
        );

        let mut reader = TraceReader::open(path)?;
        for record in reader.by_ref() {
            hierarchy.process(&record);
        }
        Ok(hierarchy.metrics(reader.skipped_records))
    }

    /// Run every trial for one trace and reduce the results. Eviction at L2 is randomized, so
    /// each trial draws from its own entropy-seeded source; the spread across trials is part of
    /// the report.
    pub fn run_trace(&self, path: &str) -> Result<TraceReport> {
        let mut trials = Vec::with_capacity(self.trials as usize);
        let progress = ProgressBar::new(self.trials);
        for _ in 0..self.trials {
            let selector = Box::new(RandomVictimSelector::from_entropy());
            trials.push(self.run_trial(path, selector)?);
            progress.inc(1);
        }
        progress.finish_and_clear();
        Ok(TraceReport::from_trials(path, &trials))
    }
}

/// Run the full simulation described by the configuration: every trace file, every trial. A
/// trace that fails to open is reported and skipped so one missing file cannot sink a batch.
///
/// # Errors
///
/// Fails when the configured cache geometries are invalid.
pub fn run_simulation(config: &Config) -> Result<()> {
    let simulation = Simulation::build(config)?;
    for path in &config.trace_files {
        match simulation.run_trace(path) {
            Ok(report) => println!("{}", report),
            Err(error) => eprintln!("error processing '{}': {}", path, error),
        }
    }
    Ok(())
}
