//! Campbell-diagram aggregation over many cases.
//!
//! Each case is an independent operating point. Cases are analyzed on a
//! bounded rayon pool; a failing case is reported alongside the others
//! rather than aborting the run.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use crate::case::{Analyzer, CaseResult};
use crate::error::{Error, Result};
use crate::modal::Mode;

/// Modes of one case at its operating point.
#[derive(Debug, Clone, Serialize)]
pub struct CampbellPoint {
    pub case: String,
    /// Mean rotor speed (rad/s).
    pub rotor_speed: f64,
    pub rotor_speed_rpm: f64,
    /// Mean wind speed (m/s).
    pub wind_speed: f64,
    pub dof_labels: Vec<String>,
    pub modes: Vec<Mode>,
}

impl From<&CaseResult> for CampbellPoint {
    fn from(result: &CaseResult) -> Self {
        let rotor_speed = result.rotor_speed();
        Self {
            case: result.name.clone(),
            rotor_speed,
            rotor_speed_rpm: rotor_speed * 60.0 / (2.0 * PI),
            wind_speed: result.wind_speed(),
            dof_labels: result.dof_labels.clone(),
            modes: result.modes.clone(),
        }
    }
}

/// Campbell points ordered by wind speed, then rotor speed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CampbellDiagram {
    pub points: Vec<CampbellPoint>,
}

impl CampbellDiagram {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a CaseResult>,
    {
        let mut points: Vec<CampbellPoint> = results.into_iter().map(CampbellPoint::from).collect();
        points.sort_by(|a, b| {
            a.wind_speed
                .total_cmp(&b.wind_speed)
                .then_with(|| a.rotor_speed.total_cmp(&b.rotor_speed))
        });
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of one case in a batch run.
#[derive(Debug)]
pub struct CaseOutcome {
    pub name: String,
    pub result: Result<CaseResult>,
}

/// Settings for batch runs.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Worker threads. `None` uses rayon's default.
    pub jobs: Option<usize>,
    /// Minimum number of cases to run in parallel.
    pub min_cases_for_parallel: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: None,
            min_cases_for_parallel: 2,
        }
    }
}

impl BatchConfig {
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }
}

/// Analyze every case, returning one outcome per case in name order.
///
/// Fails only if the worker pool cannot be built.
pub fn analyze_cases(
    analyzer: &Analyzer,
    cases: &BTreeMap<String, Vec<PathBuf>>,
    config: &BatchConfig,
) -> Result<Vec<CaseOutcome>> {
    let run = |(name, files): (&String, &Vec<PathBuf>)| {
        let result = analyzer.analyze_files(name, files);
        if let Err(e) = &result {
            log::warn!("case {name} failed: {e}");
        }
        CaseOutcome {
            name: name.clone(),
            result,
        }
    };

    let jobs = config.jobs.unwrap_or(0);
    if cases.len() < config.min_cases_for_parallel || jobs == 1 {
        return Ok(cases.iter().map(run).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    log::info!(
        "analyzing {} cases on {} threads",
        cases.len(),
        pool.current_num_threads()
    );
    Ok(pool.install(|| cases.par_iter().map(run).collect()))
}

/// Split outcomes into a diagram of the successful cases and the failures.
pub fn collect_diagram(outcomes: Vec<CaseOutcome>) -> (CampbellDiagram, Vec<(String, Error)>) {
    let mut results = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => results.push(result),
            Err(e) => failures.push((outcome.name, e)),
        }
    }
    (CampbellDiagram::from_results(&results), failures)
}
