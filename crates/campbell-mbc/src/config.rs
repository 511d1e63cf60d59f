//! Analysis configuration.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Blade-numbering patterns recognized in descriptor text, tried in order.
pub const DEFAULT_BLADE_PATTERNS: [&str; 5] = [
    r"(?i)blade\s+\d",
    r"(?i)blade root \d",
    r"(?i)PitchBearing\d",
    r"(?i)BD_\d",
    r"(?i)BD\d",
];

/// Ordered list of blade-label matchers.
///
/// The first pattern that matches a description decides where the blade
/// number sits; the rest of the text identifies the physical quantity.
#[derive(Debug, Clone)]
pub struct BladeMatchers {
    patterns: Vec<Regex>,
}

impl BladeMatchers {
    /// Compile matchers from regex sources.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| Error::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Reduce a description to the text shared by all blades.
    ///
    /// Removes the parenthesized part (first `(` to last `)`), then the first
    /// blade label found. Returns `None` if no pattern matches.
    pub fn strip(&self, description: &str) -> Option<String> {
        let text = match (description.find('('), description.rfind(')')) {
            (Some(open), Some(close)) if open < close => {
                format!("{}{}", &description[..open], &description[close + 1..])
            }
            _ => description.to_string(),
        };

        self.patterns.iter().find_map(|re| {
            re.find(&text)
                .map(|m| format!("{}{}", &text[..m.start()], &text[m.end()..]))
        })
    }
}

impl Default for BladeMatchers {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_BLADE_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("default blade pattern is valid"))
                .collect(),
        }
    }
}

/// Options for the MBC transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MbcOptions {
    /// Rotor angular acceleration (rad/s²) used in the R operator.
    ///
    /// Linearizations are taken at a steady operating point, so this is
    /// zero unless the caller knows the rotor was accelerating. A nonzero
    /// value applies to every sample of the case.
    #[serde(default)]
    pub rotor_acceleration: f64,
}

impl Default for MbcOptions {
    fn default() -> Self {
        Self {
            rotor_acceleration: 0.0,
        }
    }
}

/// Convergence settings for the eigendecomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenOptions {
    /// Convergence tolerance.
    pub eps: f64,
    /// Iteration cap for the Schur and SVD iterations.
    pub max_iterations: usize,
}

impl Default for EigenOptions {
    fn default() -> Self {
        Self {
            eps: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

fn default_blade_patterns() -> Vec<String> {
    DEFAULT_BLADE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Blade-label regexes, tried in order.
    #[serde(default = "default_blade_patterns")]
    pub blade_patterns: Vec<String>,
    /// Transform options.
    #[serde(default)]
    pub mbc: MbcOptions,
    /// Eigendecomposition options.
    #[serde(default)]
    pub eigen: EigenOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            blade_patterns: default_blade_patterns(),
            mbc: MbcOptions::default(),
            eigen: EigenOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the blade patterns.
    pub fn with_blade_patterns(mut self, patterns: Vec<String>) -> Self {
        self.blade_patterns = patterns;
        self
    }

    /// Set the rotor angular acceleration.
    pub fn with_rotor_acceleration(mut self, rotor_acceleration: f64) -> Self {
        self.mbc.rotor_acceleration = rotor_acceleration;
        self
    }

    /// Set eigendecomposition options.
    pub fn with_eigen_options(mut self, eigen: EigenOptions) -> Self {
        self.eigen = eigen;
        self
    }

    /// Compile the blade patterns.
    pub fn blade_matchers(&self) -> Result<BladeMatchers> {
        BladeMatchers::new(&self.blade_patterns)
    }
}
