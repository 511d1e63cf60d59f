//! Types for parsed linearization samples.

use std::fmt;
use std::path::PathBuf;

use nalgebra::DMatrix;

/// Operating-point table a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Continuous states (x).
    ContinuousStates,
    /// Continuous state derivatives (dx/dt).
    StateDerivatives,
    /// Discrete states (xd).
    DiscreteStates,
    /// Constraint states (z).
    ConstraintStates,
    /// Inputs (u).
    Inputs,
    /// Outputs (y).
    Outputs,
}

impl Category {
    /// Derivative order assumed when the table has no "Derivative Order" column.
    pub fn default_derivative_order(self) -> u8 {
        match self {
            Category::ContinuousStates | Category::StateDerivatives => 2,
            _ => 0,
        }
    }

    /// Identify a table from its "Order of ..." heading.
    ///
    /// Derivatives are checked before states since both headings share a prefix.
    pub fn from_heading(line: &str) -> Option<Self> {
        let lower = line.to_ascii_lowercase();
        if !lower.contains("order of") {
            return None;
        }
        if lower.contains("continuous state derivatives") {
            Some(Category::StateDerivatives)
        } else if lower.contains("continuous states") {
            Some(Category::ContinuousStates)
        } else if lower.contains("discrete states") {
            Some(Category::DiscreteStates)
        } else if lower.contains("constraint states") {
            Some(Category::ConstraintStates)
        } else if lower.contains("inputs") {
            Some(Category::Inputs)
        } else if lower.contains("outputs") {
            Some(Category::Outputs)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::ContinuousStates => "continuous states",
            Category::StateDerivatives => "continuous state derivatives",
            Category::DiscreteStates => "discrete states",
            Category::ConstraintStates => "constraint states",
            Category::Inputs => "inputs",
            Category::Outputs => "outputs",
        };
        f.write_str(name)
    }
}

/// One row of an operating-point table.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingPoint {
    /// Row/column index as written in the file (1-based).
    pub index: usize,
    /// Operating-point value.
    pub value: f64,
    /// Whether the signal lives in the rotating frame.
    pub rotating: bool,
    /// Derivative order (2 for second-order structural states).
    pub derivative_order: u8,
    /// Free-text description.
    pub description: String,
}

/// One linearization snapshot at a single rotor azimuth.
#[derive(Debug, Clone)]
pub struct LinearizationSample {
    /// File the sample was read from, if any.
    pub path: Option<PathBuf>,
    /// Simulation time (s).
    pub sim_time: f64,
    /// Rotor azimuth (rad).
    pub azimuth: f64,
    /// Rotor speed (rad/s).
    pub rotor_speed: f64,
    /// Hub-height wind speed (m/s).
    pub wind_speed: f64,
    /// Number of continuous states.
    pub num_x: usize,
    /// Number of continuous states with derivative order 2.
    pub num_x2: usize,
    /// Number of discrete states.
    pub num_xd: usize,
    /// Number of constraint states.
    pub num_z: usize,
    /// Number of inputs.
    pub num_u: usize,
    /// Number of outputs.
    pub num_y: usize,
    /// Whether the file declared Jacobians.
    pub has_jacobians: bool,
    pub states: Vec<OperatingPoint>,
    pub state_derivatives: Vec<OperatingPoint>,
    pub discrete_states: Vec<OperatingPoint>,
    pub constraint_states: Vec<OperatingPoint>,
    pub inputs: Vec<OperatingPoint>,
    pub outputs: Vec<OperatingPoint>,
    /// State matrix (num_x x num_x).
    pub a: Option<DMatrix<f64>>,
    /// Input matrix (num_x x num_u).
    pub b: Option<DMatrix<f64>>,
    /// Output matrix (num_y x num_x).
    pub c: Option<DMatrix<f64>>,
    /// Feedthrough matrix (num_y x num_u).
    pub d: Option<DMatrix<f64>>,
}

impl LinearizationSample {
    /// Descriptor table for a category.
    pub fn table(&self, category: Category) -> &[OperatingPoint] {
        match category {
            Category::ContinuousStates => &self.states,
            Category::StateDerivatives => &self.state_derivatives,
            Category::DiscreteStates => &self.discrete_states,
            Category::ConstraintStates => &self.constraint_states,
            Category::Inputs => &self.inputs,
            Category::Outputs => &self.outputs,
        }
    }

    /// Declared count for a category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::ContinuousStates | Category::StateDerivatives => self.num_x,
            Category::DiscreteStates => self.num_xd,
            Category::ConstraintStates => self.num_z,
            Category::Inputs => self.num_u,
            Category::Outputs => self.num_y,
        }
    }

    /// Number of second-order degrees of freedom (positions).
    pub fn ndof2(&self) -> usize {
        self.num_x2 / 2
    }

    /// Number of first-order states.
    pub fn ndof1(&self) -> usize {
        self.num_x - self.num_x2
    }

    /// Name used in diagnostics.
    pub fn source_name(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| crate::error::INLINE_SOURCE.to_string())
    }
}
