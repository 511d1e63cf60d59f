//! Builders for in-memory samples used across unit tests.

use campbell_lin::{LinearizationSample, OperatingPoint};
use nalgebra::DMatrix;

pub(crate) fn op(index: usize, rotating: bool, order: u8, description: &str) -> OperatingPoint {
    OperatingPoint {
        index,
        value: 0.0,
        rotating,
        derivative_order: order,
        description: description.to_string(),
    }
}

/// Sample with states and A only.
pub(crate) fn sample(
    azimuth: f64,
    rotor_speed: f64,
    states: Vec<OperatingPoint>,
    a: DMatrix<f64>,
) -> LinearizationSample {
    LinearizationSample {
        path: None,
        sim_time: 0.0,
        azimuth,
        rotor_speed,
        wind_speed: 8.0,
        num_x: states.len(),
        num_x2: states.iter().filter(|s| s.derivative_order == 2).count(),
        num_xd: 0,
        num_z: 0,
        num_u: 0,
        num_y: 0,
        has_jacobians: false,
        states,
        state_derivatives: Vec::new(),
        discrete_states: Vec::new(),
        constraint_states: Vec::new(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        a: Some(a),
        b: None,
        c: None,
        d: None,
    }
}
