//! Reader for rotor linearization files.
//!
//! An aeroelastic simulator writes one linearization file per rotor azimuth
//! sample. Each file holds scalar metadata (time, azimuth, rotor speed, wind
//! speed), the operating point of every state, input and output, and the
//! dense state-space matrices A, B, C, D.
//!
//! # Example
//!
//! ```
//! use campbell_lin::parse_lin;
//!
//! let sample = parse_lin(r#"
//! Rotor Speed:  1.0 rad/s
//! Azimuth:      0.0 rad
//! Number of continuous states: 2
//! Jacobians included in this file? No
//! Order of continuous states:
//!   Row/Column  Operating Point  Rotating Frame?  Derivative Order  Description
//!      1   0.0   F   2   Tower fore-aft DOF, m
//!      2   0.0   F   2   First time derivative of Tower fore-aft DOF, m/s
//! Linearized state matrices:
//! A: 2 x 2
//!   0.0   1.0
//!  -4.0  -0.1
//! "#).unwrap();
//!
//! assert_eq!(sample.num_x, 2);
//! assert_eq!(sample.ndof2(), 1);
//! ```

pub mod discover;
pub mod error;
pub mod reader;
pub mod types;

pub use discover::{case_files, discover_cases, read_case, split_case_name};
pub use error::{Error, Result};
pub use reader::{parse_lin, parse_lin_named, read_lin_file};
pub use types::{Category, LinearizationSample, OperatingPoint};
