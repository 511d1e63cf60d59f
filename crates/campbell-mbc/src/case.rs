//! Analysis of one operating-point case.

use std::path::PathBuf;

use campbell_lin::{LinearizationSample, read_case};

use crate::config::{AnalysisConfig, BladeMatchers, EigenOptions, MbcOptions};
use crate::error::{Error, Result};
use crate::modal::{Mode, eigen_analysis};
use crate::transform::{RotatingFrame, TransformedState, mbc_transform, validate_samples};

/// Outcome of analyzing one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    /// Sample files, empty for in-memory samples.
    pub files: Vec<PathBuf>,
    pub state: TransformedState,
    /// Descriptions of the reduced eigenvector rows.
    pub dof_labels: Vec<String>,
    pub modes: Vec<Mode>,
}

impl CaseResult {
    /// Mean rotor speed (rad/s).
    pub fn rotor_speed(&self) -> f64 {
        self.state.mean_rotor_speed
    }

    /// Mean wind speed (m/s).
    pub fn wind_speed(&self) -> f64 {
        self.state.mean_wind_speed
    }
}

/// Runs the transform and modal analysis with one configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    matchers: BladeMatchers,
    mbc: MbcOptions,
    eigen: EigenOptions,
}

impl Analyzer {
    /// Create an analyzer, compiling the configured blade patterns.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            matchers: config.blade_matchers()?,
            mbc: config.mbc,
            eigen: config.eigen,
        })
    }

    pub fn matchers(&self) -> &BladeMatchers {
        &self.matchers
    }

    /// Analyze samples already in memory.
    pub fn analyze_samples(
        &self,
        name: &str,
        samples: &[LinearizationSample],
    ) -> Result<CaseResult> {
        validate_samples(samples)?;
        let first = samples.first().ok_or(Error::EmptySampleSet)?;

        let frame = RotatingFrame::classify(first, &self.matchers)?;
        let state = mbc_transform(samples, &frame, &self.mbc)?;

        let rows = state.layout.reduced_rows();
        let modes = eigen_analysis(&state.avg_a, &rows, &self.eigen)?;
        let dof_labels = rows
            .iter()
            .map(|&r| first.states[r].description.clone())
            .collect();

        log::info!(
            "case {name}: {} modes from {} samples at {:.3} rad/s",
            modes.len(),
            samples.len(),
            state.mean_rotor_speed
        );

        Ok(CaseResult {
            name: name.to_string(),
            files: Vec::new(),
            state,
            dof_labels,
            modes,
        })
    }

    /// Read and analyze the sample files of a case.
    pub fn analyze_files(&self, name: &str, files: &[PathBuf]) -> Result<CaseResult> {
        let samples = read_case(files)?;
        let mut result = self.analyze_samples(name, &samples)?;
        result.files = files.to_vec();
        Ok(result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            matchers: BladeMatchers::default(),
            mbc: MbcOptions::default(),
            eigen: EigenOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{op, sample};
    use nalgebra::DMatrix;

    fn tower_sample(azimuth: f64) -> LinearizationSample {
        let states = vec![
            op(1, false, 2, "ED 1st tower fore-aft bending-mode DOF, m"),
            op(2, false, 2, "First time derivative of ED 1st tower fore-aft bending-mode DOF, m/s"),
            op(3, false, 1, "AD rotor induction state, -"),
        ];
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[
                0.0, 1.0, 0.0, //
                -16.0, -0.4, 0.0, //
                0.0, 0.0, -5.0,
            ],
        );
        sample(azimuth, 1.0, states, a)
    }

    #[test]
    fn test_analyze_fixed_frame_case() {
        let samples = vec![tower_sample(0.0), tower_sample(2.0)];
        let result = Analyzer::default().analyze_samples("tower", &samples).unwrap();

        assert_eq!(result.name, "tower");
        assert_eq!(result.modes.len(), 1);
        assert!((result.modes[0].natural_frequency - 4.0).abs() < 1e-9);
        assert!((result.modes[0].damping_ratio - 0.05).abs() < 1e-9);
        assert_eq!(
            result.dof_labels,
            vec![
                "ED 1st tower fore-aft bending-mode DOF, m".to_string(),
                "AD rotor induction state, -".to_string(),
            ]
        );
        assert_eq!(result.modes[0].shape.len(), 2);
        assert!((result.wind_speed() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_case_is_structural() {
        let err = Analyzer::default().analyze_samples("none", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_missing_file_is_format_error() {
        let err = Analyzer::default()
            .analyze_files("gone", &[PathBuf::from("/nonexistent/gone.1.lin")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = AnalysisConfig::default().with_blade_patterns(vec!["(".to_string()]);
        let err = Analyzer::new(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
