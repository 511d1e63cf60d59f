//! Multi-blade coordinate transform and modal analysis.
//!
//! Takes the linearization samples of one rotor operating point, maps the
//! blade signals of every sample from the rotating frame onto collective,
//! cosine and sine coordinates, averages the resulting time-invariant state
//! matrices and extracts natural frequencies, damping ratios and mode shapes.
//!
//! The pipeline per case is:
//!
//! 1. [`validate_samples`] checks that all samples share counts and descriptors.
//! 2. [`RotatingFrame::classify`] groups blade signals into triplets.
//! 3. [`mbc_transform`] converts every sample and averages.
//! 4. [`eigen_analysis`] turns the averaged matrix into [`Mode`]s.
//!
//! [`Analyzer`] runs all four for one case and [`analyze_cases`] runs many
//! cases in parallel for a Campbell diagram.

pub mod campbell;
pub mod case;
pub mod config;
pub mod error;
pub mod modal;
pub mod permutation;
pub mod transform;
pub mod triplets;

#[cfg(test)]
mod testing;

pub use campbell::{
    BatchConfig, CampbellDiagram, CampbellPoint, CaseOutcome, analyze_cases, collect_diagram,
};
pub use case::{Analyzer, CaseResult};
pub use config::{AnalysisConfig, BladeMatchers, DEFAULT_BLADE_PATTERNS, EigenOptions, MbcOptions};
pub use error::{Error, ErrorKind, Result};
pub use modal::{Mode, eigen_analysis};
pub use permutation::Permutation;
pub use transform::{
    BladeCoordinates, MbcOperators, RotatingFrame, StateLayout, TransformedSample,
    TransformedState, average, mbc_transform, transform_sample, validate_samples,
};
pub use triplets::{BladeTriplets, NUM_BLADES, find_blade_triplets};
