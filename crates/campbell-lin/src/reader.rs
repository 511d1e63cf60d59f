//! Parser for linearization (.lin) files.
//!
//! A linearization file has three zones:
//! - Header: `label: value` lines in no fixed order, terminated by the
//!   "Jacobians included" line
//! - Operating-point tables: one per category, each introduced by an
//!   `Order of ...` heading and a `Row/Column ...` column header
//! - Matrices: `<Label>: <rows> x <cols>` followed by that many numeric rows

use std::iter::Peekable;
use std::path::Path;

use nalgebra::DMatrix;

use crate::error::{Error, INLINE_SOURCE, Result};
use crate::types::{Category, LinearizationSample, OperatingPoint};

/// Read and parse a linearization file from disk.
pub fn read_lin_file(path: &Path) -> Result<LinearizationSample> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut sample = parse_lin_named(&text, &path.display().to_string())?;
    sample.path = Some(path.to_path_buf());
    log::debug!(
        "read {}: azimuth {:.4} rad, {} states, {} inputs, {} outputs",
        path.display(),
        sample.azimuth,
        sample.num_x,
        sample.num_u,
        sample.num_y
    );
    Ok(sample)
}

/// Parse linearization text that did not come from a file.
pub fn parse_lin(input: &str) -> Result<LinearizationSample> {
    parse_lin_named(input, INLINE_SOURCE)
}

/// Parse linearization text, using `file` to label errors.
pub fn parse_lin_named(input: &str, file: &str) -> Result<LinearizationSample> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .peekable();

    let header = parse_header(&mut lines, file)?;
    let tables = parse_tables(&mut lines, file)?;
    let matrices = parse_matrices(&mut lines, file)?;

    assemble(file, header, tables, matrices)
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    SimTime,
    RotorSpeed,
    Azimuth,
    WindSpeed,
    NumX,
    NumXd,
    NumZ,
    NumU,
    NumY,
    Jacobians,
}

/// Recognized header labels, matched case-insensitively as substrings.
const HEADER_LABELS: &[(&str, HeaderField)] = &[
    ("jacobians included", HeaderField::Jacobians),
    ("simulation time", HeaderField::SimTime),
    ("rotor speed", HeaderField::RotorSpeed),
    ("azimuth", HeaderField::Azimuth),
    ("wind speed", HeaderField::WindSpeed),
    ("number of continuous states", HeaderField::NumX),
    ("number of discrete states", HeaderField::NumXd),
    ("number of constraint states", HeaderField::NumZ),
    ("number of inputs", HeaderField::NumU),
    ("number of outputs", HeaderField::NumY),
];

#[derive(Debug, Default)]
struct Header {
    sim_time: Option<f64>,
    rotor_speed: Option<f64>,
    azimuth: Option<f64>,
    wind_speed: Option<f64>,
    num_x: Option<usize>,
    num_xd: Option<usize>,
    num_z: Option<usize>,
    num_u: Option<usize>,
    num_y: Option<usize>,
    has_jacobians: bool,
}

/// Match a header line against the label set.
///
/// The label is the text before the first colon; the value text follows it.
/// Lines without a colon carry their value right after the label.
fn match_header(line: &str) -> Option<(HeaderField, &'static str, &str)> {
    let lower = line.to_ascii_lowercase();
    let colon = line.find(':');
    let label = &lower[..colon.unwrap_or(line.len())];

    HEADER_LABELS.iter().find_map(|&(key, field)| {
        label.find(key).map(|pos| {
            let rest = match colon {
                Some(c) => &line[c + 1..],
                None => &line[pos + key.len()..],
            };
            (field, key, rest)
        })
    })
}

fn parse_header<'a, I>(lines: &mut Peekable<I>, file: &str) -> Result<Header>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut header = Header::default();
    let mut last_line = 0;

    for (line_no, line) in lines.by_ref() {
        last_line = line_no;
        if line.is_empty() {
            continue;
        }

        let Some((field, key, rest)) = match_header(line) else {
            continue;
        };

        let token = rest.split_whitespace().next();
        let value = || {
            token.ok_or_else(|| Error::format(file, line_no, format!("missing value for '{key}'")))
        };
        let real = || -> Result<f64> {
            let t = value()?;
            t.parse().map_err(|_| {
                Error::format(file, line_no, format!("invalid value '{t}' for '{key}'"))
            })
        };
        let count = || -> Result<usize> {
            let t = value()?;
            t.parse().map_err(|_| {
                Error::format(file, line_no, format!("invalid count '{t}' for '{key}'"))
            })
        };

        match field {
            HeaderField::Jacobians => {
                // The answer follows the question mark when there is one
                let answer = line.split_once('?').map_or(rest, |(_, after)| after);
                header.has_jacobians = answer
                    .split_whitespace()
                    .next()
                    .is_some_and(|t| t.eq_ignore_ascii_case("yes"));
                return Ok(header);
            }
            HeaderField::SimTime => header.sim_time = Some(real()?),
            HeaderField::RotorSpeed => header.rotor_speed = Some(real()?),
            HeaderField::Azimuth => header.azimuth = Some(real()?),
            HeaderField::WindSpeed => header.wind_speed = Some(real()?),
            HeaderField::NumX => header.num_x = Some(count()?),
            HeaderField::NumXd => header.num_xd = Some(count()?),
            HeaderField::NumZ => header.num_z = Some(count()?),
            HeaderField::NumU => header.num_u = Some(count()?),
            HeaderField::NumY => header.num_y = Some(count()?),
        }
    }

    Err(Error::format(
        file,
        last_line,
        "end of file before 'Jacobians included' line",
    ))
}

// ============================================================================
// Operating-point tables
// ============================================================================

/// A parsed table and the line of its heading.
#[derive(Debug)]
struct Table {
    category: Category,
    line: usize,
    rows: Vec<OperatingPoint>,
}

/// Parse a rotating-frame flag (`T`, `F`, `true`, `false`, `1`, `0`).
fn parse_flag(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Some(true),
        "f" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn is_matrix_label(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    fields.len() == 4 && fields[2].eq_ignore_ascii_case("x")
}

fn parse_tables<'a, I>(lines: &mut Peekable<I>, file: &str) -> Result<Vec<Table>>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut tables: Vec<Table> = Vec::new();
    let mut has_derivative_column = false;

    while let Some(&(line_no, line)) = lines.peek() {
        if line.is_empty() {
            lines.next();
            continue;
        }

        // Matrix labels belong to the next zone
        if is_matrix_label(line) {
            break;
        }
        lines.next();

        let fields: Vec<&str> = line.split_whitespace().collect();

        let Ok(index) = fields[0].parse::<usize>() else {
            let lower = line.to_ascii_lowercase();
            if lower.contains("linearized state matrices") {
                break;
            } else if let Some(category) = Category::from_heading(line) {
                if tables.iter().any(|t| t.category == category) {
                    return Err(Error::format(
                        file,
                        line_no,
                        format!("duplicate table for {category}"),
                    ));
                }
                tables.push(Table {
                    category,
                    line: line_no,
                    rows: Vec::new(),
                });
                has_derivative_column = false;
            } else if lower.starts_with("row/column") {
                has_derivative_column = lower.contains("derivative order");
            }
            // Anything else is a separator or free text
            continue;
        };

        let table = tables.last_mut().ok_or_else(|| {
            Error::format(file, line_no, "operating-point row outside of a table")
        })?;

        let row = parse_row(&fields, index, table.category, has_derivative_column)
            .map_err(|message| Error::format(file, line_no, message))?;
        table.rows.push(row);
    }

    Ok(tables)
}

fn parse_row(
    fields: &[&str],
    index: usize,
    category: Category,
    has_derivative_column: bool,
) -> std::result::Result<OperatingPoint, String> {
    if fields.len() < 3 {
        return Err(format!(
            "{category} row {index}: expected index, operating point and rotating flag"
        ));
    }

    let value = fields[1]
        .parse::<f64>()
        .map_err(|_| format!("{category} row {index}: invalid operating point '{}'", fields[1]))?;

    let rotating = parse_flag(fields[2])
        .ok_or_else(|| format!("{category} row {index}: invalid rotating flag '{}'", fields[2]))?;

    let (derivative_order, description_start) = if has_derivative_column {
        let token = fields
            .get(3)
            .ok_or_else(|| format!("{category} row {index}: missing derivative order"))?;
        let order = token
            .parse::<u8>()
            .map_err(|_| format!("{category} row {index}: invalid derivative order '{token}'"))?;
        (order, 4)
    } else {
        (category.default_derivative_order(), 3)
    };

    let description = fields
        .get(description_start..)
        .map(|rest| rest.join(" "))
        .unwrap_or_default();

    Ok(OperatingPoint {
        index,
        value,
        rotating,
        derivative_order,
        description,
    })
}

// ============================================================================
// Matrices
// ============================================================================

/// A parsed matrix and the line of its label.
#[derive(Debug)]
struct LabeledMatrix {
    label: String,
    line: usize,
    matrix: DMatrix<f64>,
}

/// Matrix currently being filled.
#[derive(Debug)]
struct PendingMatrix {
    label: String,
    line: usize,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl PendingMatrix {
    fn filled_rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    fn finish(self, file: &str) -> Result<LabeledMatrix> {
        let filled = self.filled_rows();
        if filled != self.rows {
            return Err(Error::format(
                file,
                self.line,
                format!(
                    "matrix {} declares {} rows but has {}",
                    self.label, self.rows, filled
                ),
            ));
        }
        Ok(LabeledMatrix {
            matrix: DMatrix::from_row_slice(self.rows, self.cols, &self.data),
            label: self.label,
            line: self.line,
        })
    }
}

fn parse_matrices<'a, I>(lines: &mut Peekable<I>, file: &str) -> Result<Vec<LabeledMatrix>>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut matrices = Vec::new();
    let mut current: Option<PendingMatrix> = None;

    for (line_no, line) in lines.by_ref() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();

        if is_matrix_label(line) {
            if let Some(done) = current.take() {
                matrices.push(done.finish(file)?);
            }

            let label = fields[0].trim_end_matches(':').to_string();
            let dim = |token: &str| {
                token.parse::<usize>().map_err(|_| {
                    Error::format(
                        file,
                        line_no,
                        format!("invalid dimension '{token}' for matrix {label}"),
                    )
                })
            };
            let rows = dim(fields[1])?;
            let cols = dim(fields[3])?;

            current = Some(PendingMatrix {
                label,
                line: line_no,
                rows,
                cols,
                data: Vec::with_capacity(rows * cols),
            });
            continue;
        }

        let pending = current
            .as_mut()
            .ok_or_else(|| Error::format(file, line_no, "numeric row before any matrix label"))?;

        if fields.len() != pending.cols {
            return Err(Error::format(
                file,
                line_no,
                format!(
                    "matrix {} row has {} values, expected {}",
                    pending.label,
                    fields.len(),
                    pending.cols
                ),
            ));
        }
        if pending.filled_rows() == pending.rows {
            return Err(Error::format(
                file,
                line_no,
                format!(
                    "matrix {} has more than {} rows",
                    pending.label, pending.rows
                ),
            ));
        }

        for token in fields {
            let value = token.parse::<f64>().map_err(|_| {
                Error::format(
                    file,
                    line_no,
                    format!("invalid number '{token}' in matrix {}", pending.label),
                )
            })?;
            pending.data.push(value);
        }
    }

    if let Some(done) = current.take() {
        matrices.push(done.finish(file)?);
    }

    Ok(matrices)
}

// ============================================================================
// Assembly
// ============================================================================

fn assemble(
    file: &str,
    header: Header,
    tables: Vec<Table>,
    matrices: Vec<LabeledMatrix>,
) -> Result<LinearizationSample> {
    let rotor_speed = header.rotor_speed.ok_or(Error::MissingField {
        file: file.to_string(),
        field: "rotor speed",
    })?;
    let azimuth = header.azimuth.ok_or(Error::MissingField {
        file: file.to_string(),
        field: "azimuth",
    })?;
    let num_x = header.num_x.ok_or(Error::MissingField {
        file: file.to_string(),
        field: "number of continuous states",
    })?;

    let mut sample = LinearizationSample {
        path: None,
        sim_time: header.sim_time.unwrap_or(0.0),
        azimuth,
        rotor_speed,
        wind_speed: header.wind_speed.unwrap_or(0.0),
        num_x,
        num_x2: 0,
        num_xd: header.num_xd.unwrap_or(0),
        num_z: header.num_z.unwrap_or(0),
        num_u: header.num_u.unwrap_or(0),
        num_y: header.num_y.unwrap_or(0),
        has_jacobians: header.has_jacobians,
        states: Vec::new(),
        state_derivatives: Vec::new(),
        discrete_states: Vec::new(),
        constraint_states: Vec::new(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        a: None,
        b: None,
        c: None,
        d: None,
    };

    for table in tables {
        let expected = sample.count(table.category);
        if table.rows.len() != expected {
            return Err(Error::format(
                file,
                table.line,
                format!(
                    "{} table has {} rows, header declares {}",
                    table.category,
                    table.rows.len(),
                    expected
                ),
            ));
        }
        let slot = match table.category {
            Category::ContinuousStates => &mut sample.states,
            Category::StateDerivatives => &mut sample.state_derivatives,
            Category::DiscreteStates => &mut sample.discrete_states,
            Category::ConstraintStates => &mut sample.constraint_states,
            Category::Inputs => &mut sample.inputs,
            Category::Outputs => &mut sample.outputs,
        };
        *slot = table.rows;
    }

    if sample.num_x > 0 && sample.states.is_empty() {
        return Err(Error::MissingTable {
            file: file.to_string(),
            category: Category::ContinuousStates.to_string(),
            expected: sample.num_x,
        });
    }

    sample.num_x2 = sample
        .states
        .iter()
        .filter(|op| op.derivative_order == 2)
        .count();

    for labeled in matrices {
        let (slot, expected) = match labeled.label.as_str() {
            "A" => (&mut sample.a, (sample.num_x, sample.num_x)),
            "B" => (&mut sample.b, (sample.num_x, sample.num_u)),
            "C" => (&mut sample.c, (sample.num_y, sample.num_x)),
            "D" => (&mut sample.d, (sample.num_y, sample.num_u)),
            other => {
                log::debug!("{file}:{}: skipping matrix {other}", labeled.line);
                continue;
            }
        };

        let actual = labeled.matrix.shape();
        if actual != expected {
            return Err(Error::format(
                file,
                labeled.line,
                format!(
                    "matrix {} is {}x{}, header counts require {}x{}",
                    labeled.label, actual.0, actual.1, expected.0, expected.1
                ),
            ));
        }
        if slot.is_some() {
            return Err(Error::format(
                file,
                labeled.line,
                format!("duplicate matrix {}", labeled.label),
            ));
        }
        *slot = Some(labeled.matrix);
    }

    Ok(sample)
}
