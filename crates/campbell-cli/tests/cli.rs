//! Runs the `campbell` binary against a directory of linearization files.

use std::fs;
use std::process::Command;

const TOWER: &str = "\
Simulation information:
  Rotor Speed:  0.5 rad/s
  Azimuth:      0.0 rad
  Wind Speed:   9.0 m/s
  Number of continuous states: 2
Jacobians included in this file? No

Order of continuous states:
  Row/Column  Operating Point  Rotating Frame?  Derivative Order  Description
     1   0.0   F   2   ED 1st tower fore-aft bending-mode DOF, m
     2   0.0   F   2   First time derivative of ED 1st tower fore-aft bending-mode DOF, m/s

Linearized state matrices:
A: 2 x 2
  0.0    1.0
 -9.0   -0.06
";

#[test]
fn test_writes_json_diagram() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tower.1.lin"), TOWER).unwrap();
    let shifted = TOWER.replace("Azimuth:      0.0", "Azimuth:      3.1");
    fs::write(dir.path().join("tower.2.lin"), shifted).unwrap();
    let json_path = dir.path().join("campbell.json");

    let output = Command::new(env!("CARGO_BIN_EXE_campbell"))
        .arg(dir.path())
        .arg("--json")
        .arg(&json_path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Case tower"));

    let text = fs::read_to_string(&json_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let point = &json["points"][0];
    assert_eq!(point["case"], "tower");
    let freq = point["modes"][0]["natural_frequency"].as_f64().unwrap();
    assert!((freq - 3.0).abs() < 1e-9);
}

#[test]
fn test_unknown_case_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tower.1.lin"), TOWER).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_campbell"))
        .arg(dir.path())
        .args(["--case", "blade"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("blade"));
}
