//! Plain-text reports.

use std::f64::consts::PI;

use campbell::{CampbellDiagram, CaseResult, Error, Mode};

/// Description of the DOF a mode moves most, shortened for a table cell.
fn dominant_label(mode: &Mode, labels: &[String]) -> String {
    const WIDTH: usize = 48;
    let label = mode
        .dominant_dof()
        .and_then(|i| labels.get(i))
        .map(String::as_str)
        .unwrap_or("-");
    if label.chars().count() > WIDTH {
        let cut: String = label.chars().take(WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        label.to_string()
    }
}

pub fn print_case(result: &CaseResult, max_modes: Option<usize>) {
    let title = format!("Case {}", result.name);
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!(
        "Samples: {}   Rotor speed: {:.4} rad/s ({:.2} rpm)   Wind speed: {:.2} m/s",
        result.state.num_samples(),
        result.rotor_speed(),
        result.rotor_speed() * 30.0 / PI,
        result.wind_speed()
    );
    println!();

    println!(
        "{:>4}{:>14}{:>14}{:>12}  {}",
        "#", "Freq (Hz)", "Damped (Hz)", "Zeta (%)", "Dominant DOF"
    );
    println!("{}", "-".repeat(4 + 14 + 14 + 12 + 2 + 48));

    let shown = max_modes.unwrap_or(result.modes.len()).min(result.modes.len());
    for (i, mode) in result.modes.iter().take(shown).enumerate() {
        println!(
            "{:>4}{:>14.5}{:>14.5}{:>12.3}  {}",
            i + 1,
            mode.natural_frequency_hz,
            mode.damped_frequency_hz,
            100.0 * mode.damping_ratio,
            dominant_label(mode, &result.dof_labels)
        );
    }
    if shown < result.modes.len() {
        println!("  ... {} more", result.modes.len() - shown);
    }
    println!();
}

pub fn print_summary(diagram: &CampbellDiagram, failures: &[(String, Error)]) {
    println!("Campbell Summary");
    println!("================");
    println!();
    println!("{:<24}{:>12}{:>12}{:>8}", "Case", "Wind (m/s)", "Rotor (rpm)", "Modes");
    println!("{}", "-".repeat(24 + 12 + 12 + 8));
    for point in &diagram.points {
        println!(
            "{:<24}{:>12.2}{:>12.2}{:>8}",
            point.case,
            point.wind_speed,
            point.rotor_speed_rpm,
            point.modes.len()
        );
    }
    println!();

    if !failures.is_empty() {
        eprintln!("{} case(s) failed:", failures.len());
        for (name, err) in failures {
            eprintln!("  {name}: {err}");
        }
        eprintln!();
    }
}
