//! # Campbell
//!
//! Stability analysis of three-bladed rotors from azimuth-indexed
//! linearizations.
//!
//! An aeroelastic simulator linearizes the turbine at several rotor azimuths
//! and writes one `.lin` file per azimuth. This crate reads those files,
//! applies the multi-blade coordinate (MBC) transform to remove the azimuth
//! dependence, averages the result and extracts the natural frequencies,
//! damping ratios and mode shapes of the rotor. Running many operating
//! points gives a Campbell diagram.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use campbell::prelude::*;
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(&AnalysisConfig::default())?;
//! let files = campbell::case_files(Path::new("runs"), "rated")?;
//! let result = analyzer.analyze_files("rated", &files)?;
//!
//! for mode in &result.modes {
//!     println!("{:.3} Hz, {:.2}% damping", mode.natural_frequency_hz, 100.0 * mode.damping_ratio);
//! }
//! # Ok::<(), campbell::Error>(())
//! ```
//!
//! ## Campbell Diagram
//!
//! ```rust,no_run
//! use campbell::prelude::*;
//! use std::path::Path;
//!
//! let analyzer = Analyzer::default();
//! let cases = campbell::discover_cases(Path::new("runs"))?;
//! let outcomes = analyze_cases(&analyzer, &cases, &BatchConfig::default())?;
//! let (diagram, failures) = collect_diagram(outcomes);
//! println!("{}", diagram.to_json()?);
//! # Ok::<(), campbell::Error>(())
//! ```

// Re-export member crates
pub use campbell_lin as lin;
pub use campbell_mbc as mbc;

// ============================================================================
// Convenient re-exports from campbell_lin
// ============================================================================

pub use campbell_lin::{
    Category,
    // Errors
    Error as ReadError,
    LinearizationSample,
    OperatingPoint,
    // Discovery
    case_files,
    discover_cases,
    // Reading
    parse_lin,
    parse_lin_named,
    read_case,
    read_lin_file,
};

// ============================================================================
// Convenient re-exports from campbell_mbc
// ============================================================================

pub use campbell_mbc::{
    // Configuration
    AnalysisConfig,
    // Pipeline
    Analyzer,
    BatchConfig,
    BladeMatchers,
    BladeTriplets,
    CampbellDiagram,
    CampbellPoint,
    CaseOutcome,
    CaseResult,
    EigenOptions,
    // Errors
    Error,
    ErrorKind,
    MbcOptions,
    Mode,
    Result,
    RotatingFrame,
    TransformedState,
    analyze_cases,
    collect_diagram,
    eigen_analysis,
    find_blade_triplets,
    mbc_transform,
};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of num_complex's Complex type.
pub use num_complex::Complex;

/// Prelude module containing commonly used types.
///
/// ```rust
/// use campbell::prelude::*;
/// ```
pub mod prelude {
    // Reading
    pub use crate::{LinearizationSample, read_lin_file};

    // Pipeline
    pub use crate::{AnalysisConfig, Analyzer, CaseResult, Mode};

    // Campbell diagram
    pub use crate::{BatchConfig, CampbellDiagram, analyze_cases, collect_diagram};

    // Common external types
    pub use crate::{Complex, DMatrix};
}
