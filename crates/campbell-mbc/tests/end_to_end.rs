//! End-to-end runs from linearization files on disk to a Campbell diagram.

use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use campbell_lin::discover_cases;
use campbell_mbc::{
    AnalysisConfig, Analyzer, BatchConfig, BladeTriplets, ErrorKind, MbcOperators, RotatingFrame,
    analyze_cases, collect_diagram,
};
use nalgebra::DMatrix;

const BLADE_STATES: [&str; 3] = [
    "ED 1st flapwise bending-mode DOF of blade 1 (internal DOF index = DOF_BF(1,1)), m",
    "ED 1st flapwise bending-mode DOF of blade 2 (internal DOF index = DOF_BF(2,1)), m",
    "ED 1st flapwise bending-mode DOF of blade 3 (internal DOF index = DOF_BF(3,1)), m",
];

/// Fixed-frame system: collective flap at 2 rad/s, cosine and sine flap
/// at 3 rad/s.
fn fixed_frame_system() -> DMatrix<f64> {
    let stiffness = [4.0, 9.0, 9.0];
    let mut m = DMatrix::zeros(6, 6);
    for (i, k) in stiffness.iter().enumerate() {
        m[(i, 3 + i)] = 1.0;
        m[(3 + i, i)] = -k;
        m[(3 + i, 3 + i)] = -0.1;
    }
    m
}

fn blade_frame() -> RotatingFrame {
    RotatingFrame::new(
        BladeTriplets::from_triplets(3, vec![[0, 1, 2]]).unwrap(),
        BladeTriplets::fixed(0),
        BladeTriplets::fixed(0),
        BladeTriplets::fixed(0),
    )
}

/// Rotating-frame A at azimuth `psi` whose transform is `m`.
fn rotating_system(m: &DMatrix<f64>, psi: f64, omega: f64) -> DMatrix<f64> {
    let ops = MbcOperators::new(&blade_frame(), psi, omega, 0.0);
    let t = ops.t_inv.clone().try_inverse().unwrap();
    let l_inv = ops.l.clone().try_inverse().unwrap();
    (t * m + &ops.r) * l_inv
}

fn lin_text(psi: f64, omega: f64, wind: f64, a: &DMatrix<f64>) -> String {
    let mut s = String::new();
    writeln!(s, "Linearized model: turbine").unwrap();
    writeln!(s).unwrap();
    writeln!(s, "Simulation information:").unwrap();
    writeln!(s, "  Simulation time:             60.0000 s").unwrap();
    writeln!(s, "  Rotor Speed:                 {omega:e} rad/s").unwrap();
    writeln!(s, "  Azimuth:                     {psi:e} rad").unwrap();
    writeln!(s, "  Wind Speed:                  {wind:e} m/s").unwrap();
    writeln!(s, "  Number of continuous states: 6").unwrap();
    writeln!(s, "  Number of discrete states:   0").unwrap();
    writeln!(s, "  Number of constraint states: 0").unwrap();
    writeln!(s, "  Number of inputs:            0").unwrap();
    writeln!(s, "  Number of outputs:           0").unwrap();
    writeln!(s, "Jacobians included in this file?    No").unwrap();
    writeln!(s).unwrap();
    writeln!(s, "Order of continuous states:").unwrap();
    writeln!(
        s,
        "   Row/Column  Operating Point  Rotating Frame?  Derivative Order  Description"
    )
    .unwrap();
    writeln!(
        s,
        "   ----------  ---------------  ---------------  ----------------  -----------"
    )
    .unwrap();
    for (i, d) in BLADE_STATES.iter().enumerate() {
        writeln!(s, "   {:>3}   0.0000E+00   T   2   {d}", i + 1).unwrap();
    }
    for (i, d) in BLADE_STATES.iter().enumerate() {
        writeln!(
            s,
            "   {:>3}   0.0000E+00   T   2   First time derivative of {d}/s",
            i + 4
        )
        .unwrap();
    }
    writeln!(s).unwrap();
    writeln!(s, "Linearized state matrices:").unwrap();
    writeln!(s).unwrap();
    writeln!(s, "A: 6 x 6").unwrap();
    for i in 0..a.nrows() {
        let row: Vec<String> = (0..a.ncols()).map(|j| format!("{:e}", a[(i, j)])).collect();
        writeln!(s, "  {}", row.join("  ")).unwrap();
    }
    s
}

fn write_case(dir: &Path, name: &str, omega: f64, wind: f64) {
    let m = fixed_frame_system();
    for (k, deg) in [0.0_f64, 120.0, 240.0].iter().enumerate() {
        let psi = deg.to_radians();
        let a = rotating_system(&m, psi, omega);
        fs::write(
            dir.join(format!("{name}.{}.lin", k + 1)),
            lin_text(psi, omega, wind, &a),
        )
        .unwrap();
    }
}

#[test]
fn test_case_recovers_fixed_frame_modes() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), "rated", 1.2, 11.4);

    let cases = discover_cases(dir.path()).unwrap();
    let result = Analyzer::new(&AnalysisConfig::default())
        .unwrap()
        .analyze_files("rated", &cases["rated"])
        .unwrap();

    let m = fixed_frame_system();
    let err = (&result.state.avg_a - &m).abs().max();
    assert!(err < 1e-9, "averaged matrix off by {err}");

    assert_eq!(result.modes.len(), 3);
    let freqs: Vec<f64> = result.modes.iter().map(|m| m.natural_frequency).collect();
    assert!((freqs[0] - 2.0).abs() < 1e-6);
    assert!((freqs[1] - 3.0).abs() < 1e-6);
    assert!((freqs[2] - 3.0).abs() < 1e-6);

    // Collective mode moves the first reduced DOF only.
    assert_eq!(result.modes[0].dominant_dof(), Some(0));
    assert!(result.modes[0].shape[1] < 1e-6);
    assert_eq!(result.dof_labels.len(), 3);
    assert_eq!(result.files.len(), 3);

    let az = result.state.azimuths_deg();
    assert!((az[1] - 120.0).abs() < 1e-9);
    assert!((result.wind_speed() - 11.4).abs() < 1e-12);
}

#[test]
fn test_campbell_run_over_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), "op_fast", 1.6, 8.0);
    write_case(dir.path(), "op_slow", 0.8, 8.0);
    write_case(dir.path(), "op_high_wind", 1.2, 14.0);
    fs::write(dir.path().join("op_broken.1.lin"), "Rotor Speed: fast rad/s\n").unwrap();

    let cases = discover_cases(dir.path()).unwrap();
    assert_eq!(cases.len(), 4);

    let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
    let outcomes = analyze_cases(&analyzer, &cases, &BatchConfig::default().with_jobs(2)).unwrap();
    assert_eq!(outcomes.len(), 4);

    let (diagram, failures) = collect_diagram(outcomes);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "op_broken");
    assert_eq!(failures[0].1.kind(), ErrorKind::Format);

    let names: Vec<&str> = diagram.points.iter().map(|p| p.case.as_str()).collect();
    assert_eq!(names, ["op_slow", "op_fast", "op_high_wind"]);

    // The fixed-frame system does not depend on rotor speed.
    for point in &diagram.points {
        assert_eq!(point.modes.len(), 3);
        assert!((point.modes[1].natural_frequency - 3.0).abs() < 1e-6);
    }
    assert!((diagram.points[0].rotor_speed_rpm - 0.8 * 30.0 / PI).abs() < 1e-9);

    let json: serde_json::Value = serde_json::from_str(&diagram.to_json().unwrap()).unwrap();
    assert_eq!(json["points"].as_array().unwrap().len(), 3);
}
