//! Multi-blade coordinate transform.
//!
//! Each linearization sample describes the rotor at one azimuth, with blade
//! signals expressed in the rotating frame. The transform maps every blade
//! triplet onto collective, cosine and sine components so that the resulting
//! state matrix no longer depends on azimuth, then averages the samples.
//!
//! The continuous state vector is laid out as
//! `[positions (ndof2) | velocities (ndof2) | first-order states (ndof1)]`.
//! Inside each block, signals are reordered into `[fixed | triplets]` before
//! the transform and restored afterwards.

use std::f64::consts::PI;

use campbell_lin::{Category, LinearizationSample, OperatingPoint};
use nalgebra::{DMatrix, DVector, Matrix3};

use crate::config::{BladeMatchers, MbcOptions};
use crate::error::{Error, Result};
use crate::permutation::{Permutation, permute, unpermute};
use crate::triplets::{BladeTriplets, NUM_BLADES, find_blade_triplets};

/// Per-azimuth 3x3 coordinate matrices for one blade triplet.
#[derive(Debug, Clone, PartialEq)]
pub struct BladeCoordinates {
    /// Rows `[1, cos ψk, sin ψk]`.
    pub t1: Matrix3<f64>,
    /// Closed-form inverse of `t1`.
    pub t1_inv: Matrix3<f64>,
    /// First azimuth derivative of `t1`, rows `[0, -sin ψk, cos ψk]`.
    pub t2: Matrix3<f64>,
    /// Second azimuth derivative of `t1`, rows `[0, -cos ψk, -sin ψk]`.
    pub t3: Matrix3<f64>,
}

impl BladeCoordinates {
    /// Coordinate matrices with blade 1 at `azimuth` (rad).
    pub fn at(azimuth: f64) -> Self {
        let mut s = [0.0; NUM_BLADES];
        let mut c = [0.0; NUM_BLADES];
        for k in 0..NUM_BLADES {
            let psi = azimuth + 2.0 * PI * k as f64 / NUM_BLADES as f64;
            (s[k], c[k]) = psi.sin_cos();
        }

        let t1 = Matrix3::new(
            1.0, c[0], s[0], //
            1.0, c[1], s[1], //
            1.0, c[2], s[2],
        );

        let scale = 1.0 / (1.5 * 3.0_f64.sqrt());
        let t1_inv = Matrix3::new(
            c[1] * s[2] - s[1] * c[2],
            c[2] * s[0] - s[2] * c[0],
            c[0] * s[1] - s[0] * c[1],
            s[1] - s[2],
            s[2] - s[0],
            s[0] - s[1],
            c[2] - c[1],
            c[0] - c[2],
            c[1] - c[0],
        ) * scale;

        let t2 = Matrix3::new(
            0.0, -s[0], c[0], //
            0.0, -s[1], c[1], //
            0.0, -s[2], c[2],
        );
        let t3 = Matrix3::new(
            0.0, -c[0], -s[0], //
            0.0, -c[1], -s[1], //
            0.0, -c[2], -s[2],
        );

        Self { t1, t1_inv, t2, t3 }
    }
}

/// What fills the fixed-frame block of a block-diagonal operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixedBlock {
    Identity,
    Zero,
}

/// Block-diagonal operator over `[fixed | triplets]`, with `block` repeated
/// once per triplet.
fn triplet_block_diag(
    triplets: &BladeTriplets,
    block: &Matrix3<f64>,
    fixed: FixedBlock,
) -> DMatrix<f64> {
    let n = triplets.len();
    let num_fixed = triplets.num_fixed();
    let mut m = DMatrix::zeros(n, n);

    if fixed == FixedBlock::Identity {
        for i in 0..num_fixed {
            m[(i, i)] = 1.0;
        }
    }
    for t in 0..triplets.num_triplets() {
        let offset = num_fixed + NUM_BLADES * t;
        m.fixed_view_mut::<3, 3>(offset, offset).copy_from(block);
    }
    m
}

fn set_block(dst: &mut DMatrix<f64>, row: usize, col: usize, src: &DMatrix<f64>) {
    if src.is_empty() {
        return;
    }
    dst.view_mut((row, col), src.shape()).copy_from(src);
}

/// Sizes of the continuous-state partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    /// Second-order degrees of freedom (positions).
    pub ndof2: usize,
    /// First-order states.
    pub ndof1: usize,
}

impl StateLayout {
    pub fn num_states(&self) -> usize {
        2 * self.ndof2 + self.ndof1
    }

    /// Number of second-order states (positions and velocities).
    pub fn num_second_order(&self) -> usize {
        2 * self.ndof2
    }

    /// Rows kept in a reduced eigenvector: positions and first-order
    /// states, velocities dropped.
    pub fn reduced_rows(&self) -> Vec<usize> {
        (0..self.ndof2)
            .chain(self.num_second_order()..self.num_states())
            .collect()
    }
}

/// Blade triplets of every signal list a transform touches.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatingFrame {
    /// Triplets over the position block of the second-order states.
    pub states2: BladeTriplets,
    /// Triplets over the first-order states.
    pub states1: BladeTriplets,
    pub inputs: BladeTriplets,
    pub outputs: BladeTriplets,
    state_permutation: Permutation,
}

impl RotatingFrame {
    pub fn new(
        states2: BladeTriplets,
        states1: BladeTriplets,
        inputs: BladeTriplets,
        outputs: BladeTriplets,
    ) -> Self {
        // Velocities share the position ordering
        let state_permutation =
            Permutation::concat(&[&states2.permutation().doubled(), states1.permutation()]);
        Self {
            states2,
            states1,
            inputs,
            outputs,
            state_permutation,
        }
    }

    /// Classify the signals of a sample.
    ///
    /// Velocities reuse the position triplets. Inputs and outputs whose
    /// descriptor table is absent are treated as fixed-frame.
    pub fn classify(sample: &LinearizationSample, matchers: &BladeMatchers) -> Result<Self> {
        check_layout(sample)?;

        let ndof2 = sample.ndof2();
        let states2 = find_blade_triplets(&sample.states[..ndof2], matchers)?;
        let states1 = find_blade_triplets(&sample.states[sample.num_x2..], matchers)?;

        let signals = |table: &[OperatingPoint], count: usize| {
            if table.len() == count {
                find_blade_triplets(table, matchers)
            } else {
                Ok(BladeTriplets::fixed(count))
            }
        };
        let inputs = signals(&sample.inputs, sample.num_u)?;
        let outputs = signals(&sample.outputs, sample.num_y)?;

        log::debug!(
            "{}: {} position, {} first-order, {} input and {} output triplets",
            sample.source_name(),
            states2.num_triplets(),
            states1.num_triplets(),
            inputs.num_triplets(),
            outputs.num_triplets()
        );

        Ok(Self::new(states2, states1, inputs, outputs))
    }

    pub fn layout(&self) -> StateLayout {
        StateLayout {
            ndof2: self.states2.len(),
            ndof1: self.states1.len(),
        }
    }

    pub fn num_states(&self) -> usize {
        self.layout().num_states()
    }

    /// Reordering of the full state vector into `[fixed | triplets]` per block.
    pub fn state_permutation(&self) -> &Permutation {
        &self.state_permutation
    }
}

/// Azimuth-dependent operators in the reordered layout.
#[derive(Debug, Clone)]
pub struct MbcOperators {
    /// Rotating states in terms of fixed-frame states.
    pub l: DMatrix<f64>,
    /// Terms from the time variation of the transform.
    pub r: DMatrix<f64>,
    /// `blkdiag(T1inv, T1inv, T1qinv)`.
    pub t_inv: DMatrix<f64>,
    /// Input transform.
    pub t1c: DMatrix<f64>,
    /// Inverse output transform.
    pub t1ov: DMatrix<f64>,
}

impl MbcOperators {
    /// Build operators for rotor position `azimuth` (rad), speed `omega`
    /// (rad/s) and acceleration `omega_dot` (rad/s²).
    pub fn new(frame: &RotatingFrame, azimuth: f64, omega: f64, omega_dot: f64) -> Self {
        use FixedBlock::{Identity, Zero};

        let coords = BladeCoordinates::at(azimuth);
        let s2 = &frame.states2;
        let s1 = &frame.states1;

        let t1 = triplet_block_diag(s2, &coords.t1, Identity);
        let t1_inv = triplet_block_diag(s2, &coords.t1_inv, Identity);
        let t2 = triplet_block_diag(s2, &coords.t2, Zero);
        let t3 = triplet_block_diag(s2, &coords.t3, Zero);
        let t1q = triplet_block_diag(s1, &coords.t1, Identity);
        let t1q_inv = triplet_block_diag(s1, &coords.t1_inv, Identity);
        let t2q = triplet_block_diag(s1, &coords.t2, Zero);

        let layout = frame.layout();
        let n = layout.num_states();
        let ndof2 = layout.ndof2;
        let n2 = layout.num_second_order();

        let mut l = DMatrix::zeros(n, n);
        set_block(&mut l, 0, 0, &t1);
        set_block(&mut l, ndof2, 0, &(&t2 * omega));
        set_block(&mut l, ndof2, ndof2, &t1);
        set_block(&mut l, n2, n2, &t1q);

        let mut r = DMatrix::zeros(n, n);
        set_block(&mut r, 0, 0, &(&t2 * omega));
        set_block(&mut r, ndof2, 0, &(&t3 * (omega * omega) + &t2 * omega_dot));
        set_block(&mut r, ndof2, ndof2, &(&t2 * (2.0 * omega)));
        set_block(&mut r, n2, n2, &(&t2q * omega));

        let mut t_inv = DMatrix::zeros(n, n);
        set_block(&mut t_inv, 0, 0, &t1_inv);
        set_block(&mut t_inv, ndof2, ndof2, &t1_inv);
        set_block(&mut t_inv, n2, n2, &t1q_inv);

        Self {
            l,
            r,
            t_inv,
            t1c: triplet_block_diag(&frame.inputs, &coords.t1, Identity),
            t1ov: triplet_block_diag(&frame.outputs, &coords.t1_inv, Identity),
        }
    }
}

/// Fixed-frame matrices of one sample.
#[derive(Debug, Clone)]
pub struct TransformedSample {
    /// Azimuth (rad).
    pub azimuth: f64,
    /// Rotor speed (rad/s).
    pub rotor_speed: f64,
    pub a: DMatrix<f64>,
    pub b: Option<DMatrix<f64>>,
    pub c: Option<DMatrix<f64>>,
    pub d: Option<DMatrix<f64>>,
}

/// Result of transforming all samples of a case.
#[derive(Debug, Clone)]
pub struct TransformedState {
    pub layout: StateLayout,
    /// Per-sample results, sorted by azimuth.
    pub samples: Vec<TransformedSample>,
    /// Average of the per-sample state matrices.
    pub avg_a: DMatrix<f64>,
    /// Averages of B, C, D; present when every sample carried the matrix.
    pub avg_b: Option<DMatrix<f64>>,
    pub avg_c: Option<DMatrix<f64>>,
    pub avg_d: Option<DMatrix<f64>>,
    /// Average continuous-state operating point.
    pub avg_op_states: DVector<f64>,
    /// Average state-derivative operating point, if every sample has one.
    pub avg_op_state_derivatives: Option<DVector<f64>>,
    /// Mean rotor speed (rad/s).
    pub mean_rotor_speed: f64,
    /// Mean wind speed (m/s).
    pub mean_wind_speed: f64,
}

impl TransformedState {
    /// Sample azimuths in degrees, in transform order.
    pub fn azimuths_deg(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.azimuth.to_degrees()).collect()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }
}

fn check_shape(
    sample: &LinearizationSample,
    matrix: &'static str,
    m: &DMatrix<f64>,
    expected: (usize, usize),
) -> Result<()> {
    if m.shape() != expected {
        return Err(Error::ShapeMismatch {
            file: sample.source_name(),
            matrix,
            expected,
            actual: m.shape(),
        });
    }
    Ok(())
}

/// Transform one sample into the fixed frame.
pub fn transform_sample(
    sample: &LinearizationSample,
    frame: &RotatingFrame,
    options: &MbcOptions,
) -> Result<TransformedSample> {
    let a = sample.a.as_ref().ok_or_else(|| Error::MissingMatrix {
        file: sample.source_name(),
        matrix: "A",
    })?;

    let n = frame.num_states();
    let nu = frame.inputs.len();
    let ny = frame.outputs.len();
    check_shape(sample, "A", a, (n, n))?;

    let ops = MbcOperators::new(
        frame,
        sample.azimuth,
        sample.rotor_speed,
        options.rotor_acceleration,
    );
    let p = frame.state_permutation();
    let pu = frame.inputs.permutation();
    let py = frame.outputs.permutation();

    let a_nr = &ops.t_inv * (permute(a, p, p) * &ops.l - &ops.r);

    let b = match &sample.b {
        Some(b) => {
            check_shape(sample, "B", b, (n, nu))?;
            let b_nr = &ops.t_inv * permute(b, p, pu) * &ops.t1c;
            Some(unpermute(&b_nr, p, pu))
        }
        None => None,
    };
    let c = match &sample.c {
        Some(c) => {
            check_shape(sample, "C", c, (ny, n))?;
            let c_nr = &ops.t1ov * permute(c, py, p) * &ops.l;
            Some(unpermute(&c_nr, py, p))
        }
        None => None,
    };
    let d = match &sample.d {
        Some(d) => {
            check_shape(sample, "D", d, (ny, nu))?;
            let d_nr = &ops.t1ov * permute(d, py, pu) * &ops.t1c;
            Some(unpermute(&d_nr, py, pu))
        }
        None => None,
    };

    log::debug!(
        "{}: transformed at azimuth {:.2} deg",
        sample.source_name(),
        sample.azimuth.to_degrees()
    );

    Ok(TransformedSample {
        azimuth: sample.azimuth,
        rotor_speed: sample.rotor_speed,
        a: unpermute(&a_nr, p, p),
        b,
        c,
        d,
    })
}

/// Element-wise mean of equally sized matrices, `None` if there are none.
///
/// Computed as the first matrix plus the mean deviation from it, so
/// identical inputs give back the input exactly.
pub fn average<'a, I>(matrices: I) -> Option<DMatrix<f64>>
where
    I: IntoIterator<Item = &'a DMatrix<f64>>,
{
    let mut iter = matrices.into_iter();
    let first = iter.next()?;

    let mut deviation = DMatrix::zeros(first.nrows(), first.ncols());
    let mut count = 1usize;
    for m in iter {
        deviation += m - first;
        count += 1;
    }
    Some(first + deviation / count as f64)
}

fn average_optional<'a, I>(name: &str, matrices: I) -> Option<DMatrix<f64>>
where
    I: IntoIterator<Item = Option<&'a DMatrix<f64>>>,
{
    let matrices: Vec<Option<&DMatrix<f64>>> = matrices.into_iter().collect();
    if matrices.iter().any(Option::is_none) {
        if matrices.iter().any(Option::is_some) {
            log::debug!("matrix {name} missing from some samples, not averaged");
        }
        return None;
    }
    average(matrices.into_iter().flatten())
}

fn average_values(samples: &[&LinearizationSample], table: Category) -> Option<DVector<f64>> {
    let len = samples.first()?.table(table).len();
    if samples.iter().any(|s| s.table(table).len() != len) {
        return None;
    }
    let count = samples.len() as f64;
    Some(DVector::from_fn(len, |i, _| {
        samples.iter().map(|s| s.table(table)[i].value).sum::<f64>() / count
    }))
}

/// Check the state layout of one sample: table length, an even number of
/// second-order states, and second-order states listed first.
fn check_layout(sample: &LinearizationSample) -> Result<()> {
    if sample.states.len() != sample.num_x {
        return Err(Error::TableLength {
            file: sample.source_name(),
            category: Category::ContinuousStates.to_string(),
            expected: sample.num_x,
            actual: sample.states.len(),
        });
    }
    if sample.num_x2 % 2 != 0 {
        return Err(Error::OddSecondOrderStates {
            file: sample.source_name(),
            num_x2: sample.num_x2,
        });
    }
    if let Some(op) = sample.states[sample.num_x2..]
        .iter()
        .find(|op| op.derivative_order == 2)
    {
        return Err(Error::StateOrdering {
            file: sample.source_name(),
            row: op.index,
        });
    }
    Ok(())
}

fn describe(op: &OperatingPoint) -> String {
    format!(
        "'{}' (rotating {}, order {})",
        op.description, op.rotating, op.derivative_order
    )
}

/// Check that all samples of a case can be transformed together.
///
/// Every sample must have the first sample's counts and the same
/// descriptors, in the same order, for states, inputs and outputs.
pub fn validate_samples(samples: &[LinearizationSample]) -> Result<()> {
    let (first, rest) = samples.split_first().ok_or(Error::EmptySampleSet)?;
    check_layout(first)?;

    for sample in rest {
        check_layout(sample)?;

        let counts = [
            ("number of continuous states", first.num_x, sample.num_x),
            ("number of second-order states", first.num_x2, sample.num_x2),
            ("number of discrete states", first.num_xd, sample.num_xd),
            ("number of constraint states", first.num_z, sample.num_z),
            ("number of inputs", first.num_u, sample.num_u),
            ("number of outputs", first.num_y, sample.num_y),
        ];
        for (what, expected, actual) in counts {
            if expected != actual {
                return Err(Error::InconsistentSamples {
                    file: sample.source_name(),
                    what: what.to_string(),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        for category in [
            Category::ContinuousStates,
            Category::Inputs,
            Category::Outputs,
        ] {
            let expected = first.table(category);
            let actual = sample.table(category);
            if expected.len() != actual.len() {
                return Err(Error::InconsistentSamples {
                    file: sample.source_name(),
                    what: format!("{category} table length"),
                    expected: expected.len().to_string(),
                    actual: actual.len().to_string(),
                });
            }
            let mismatch = expected.iter().zip(actual).find(|(e, a)| {
                e.description != a.description
                    || e.rotating != a.rotating
                    || e.derivative_order != a.derivative_order
            });
            if let Some((e, a)) = mismatch {
                return Err(Error::InconsistentSamples {
                    file: sample.source_name(),
                    what: format!("{category} row {}", a.index),
                    expected: describe(e),
                    actual: describe(a),
                });
            }
        }
    }
    Ok(())
}

/// Transform every sample of a case and average the results.
///
/// Samples are validated, then processed in order of increasing azimuth.
pub fn mbc_transform(
    samples: &[LinearizationSample],
    frame: &RotatingFrame,
    options: &MbcOptions,
) -> Result<TransformedState> {
    validate_samples(samples)?;

    let mut sorted: Vec<&LinearizationSample> = samples.iter().collect();
    sorted.sort_by(|a, b| a.azimuth.total_cmp(&b.azimuth));

    let transformed = sorted
        .iter()
        .map(|s| transform_sample(s, frame, options))
        .collect::<Result<Vec<_>>>()?;

    let avg_a = average(transformed.iter().map(|t| &t.a)).ok_or(Error::EmptySampleSet)?;
    let avg_b = average_optional("B", transformed.iter().map(|t| t.b.as_ref()));
    let avg_c = average_optional("C", transformed.iter().map(|t| t.c.as_ref()));
    let avg_d = average_optional("D", transformed.iter().map(|t| t.d.as_ref()));

    let count = sorted.len() as f64;
    let mean_rotor_speed = sorted.iter().map(|s| s.rotor_speed).sum::<f64>() / count;
    let mean_wind_speed = sorted.iter().map(|s| s.wind_speed).sum::<f64>() / count;

    let avg_op_states =
        average_values(&sorted, Category::ContinuousStates).unwrap_or_else(|| DVector::zeros(0));
    let avg_op_state_derivatives = if sorted.iter().all(|s| !s.state_derivatives.is_empty()) {
        average_values(&sorted, Category::StateDerivatives)
    } else {
        None
    };

    log::info!(
        "MBC transform: {} samples, {} states, {} blade triplets",
        transformed.len(),
        frame.num_states(),
        frame.states2.num_triplets() + frame.states1.num_triplets()
    );

    Ok(TransformedState {
        layout: frame.layout(),
        samples: transformed,
        avg_a,
        avg_b,
        avg_c,
        avg_d,
        avg_op_states,
        avg_op_state_derivatives,
        mean_rotor_speed,
        mean_wind_speed,
    })
}
