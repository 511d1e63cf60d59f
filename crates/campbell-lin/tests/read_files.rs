//! Integration tests for reading linearization files from disk.

use std::fs;
use std::path::Path;

use campbell_lin::{Error, case_files, discover_cases, read_case, read_lin_file};

fn lin_text(azimuth: f64) -> String {
    format!(
        "\
Simulation information:
  Simulation time:   10.0 s
  Rotor Speed:       1.0 rad/s
  Azimuth:           {azimuth} rad
  Wind Speed:        0.0 m/s
  Number of continuous states:  2
  Number of discrete states:    0
  Number of constraint states:  0
  Number of inputs:             0
  Number of outputs:            0
Jacobians included in this file?    No

Order of continuous states:
   Row/Column  Operating Point  Rotating Frame?  Derivative Order  Description
   ----------  ---------------  ---------------  ----------------  -----------
        1      0.0000E+00              F                2          ED Platform pitch tilt rotation DOF, rad
        2      0.0000E+00              F                2          First time derivative of ED Platform pitch tilt rotation DOF, rad/s

Linearized state matrices:

A: 2 x 2
  0.0000E+00  1.0000E+00
 -1.0000E+00 -1.0000E-02
"
    )
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_discover_groups_by_case() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "turb_01.2.lin", &lin_text(2.0944));
    write(dir.path(), "turb_01.1.lin", &lin_text(0.0));
    write(dir.path(), "turb_01.10.lin", &lin_text(4.1888));
    write(dir.path(), "turb_02.1.lin", &lin_text(0.0));
    write(dir.path(), "turb_01.log", "not a linearization file");

    let cases = discover_cases(dir.path()).unwrap();
    assert_eq!(cases.len(), 2);

    let names: Vec<String> = cases["turb_01"]
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["turb_01.1.lin", "turb_01.2.lin", "turb_01.10.lin"]);
    assert_eq!(cases["turb_02"].len(), 1);
}

#[test]
fn test_case_files_and_read_case() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "case_a.1.lin", &lin_text(0.0));
    write(dir.path(), "case_a.2.lin", &lin_text(2.0944));
    write(dir.path(), "case_b.1.lin", &lin_text(0.0));

    let files = case_files(dir.path(), "case_a").unwrap();
    assert_eq!(files.len(), 2);

    let samples = read_case(&files).unwrap();
    assert_eq!(samples.len(), 2);
    assert!((samples[1].azimuth - 2.0944).abs() < 1e-12);
    assert_eq!(samples[0].path.as_deref(), Some(files[0].as_path()));
}

#[test]
fn test_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = lin_text(0.0).replace("-1.0000E+00", "oops");
    write(dir.path(), "bad.1.lin", &bad);

    let path = dir.path().join("bad.1.lin");
    match read_lin_file(&path) {
        Err(Error::Format { file, line, .. }) => {
            assert_eq!(file, path.display().to_string());
            assert_eq!(line, 23);
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_lin_file(&dir.path().join("absent.1.lin")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
