//! Campbell command-line interface.

mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use campbell::{
    AnalysisConfig, Analyzer, BatchConfig, CampbellDiagram, analyze_cases, case_files,
    collect_diagram, discover_cases,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "campbell")]
#[command(
    about = "MBC transform and modal analysis of rotor linearization files",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Directory holding <case>.<k>.lin files
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Analyze only this case (file prefix before the sample number)
    #[arg(short, long)]
    case: Option<String>,

    /// JSON analysis configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rotor angular acceleration in rad/s² (default: constant speed)
    #[arg(long, value_name = "RAD_S2")]
    rotor_acceleration: Option<f64>,

    /// Worker threads for multi-case runs
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write the Campbell diagram as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Print only the first N modes of each case
    #[arg(long, value_name = "N")]
    max_modes: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = load_config(&cli)?;
    let analyzer = Analyzer::new(&config).context("Invalid analysis configuration")?;

    let diagram = match &cli.case {
        Some(case) => run_single_case(&analyzer, &cli.dir, case, cli.max_modes)?,
        None => run_all_cases(&analyzer, &cli)?,
    };

    if let Some(path) = &cli.json {
        write_json(&diagram, path)?;
        println!("Wrote {} case(s) to {}", diagram.len(), path.display());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(acc) = cli.rotor_acceleration {
        config = config.with_rotor_acceleration(acc);
    }
    log::debug!("configuration: {config:?}");
    Ok(config)
}

fn run_single_case(
    analyzer: &Analyzer,
    dir: &Path,
    case: &str,
    max_modes: Option<usize>,
) -> Result<CampbellDiagram> {
    let files = case_files(dir, case)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?;
    if files.is_empty() {
        bail!("No linearization files for case '{}' in {}", case, dir.display());
    }

    let result = analyzer
        .analyze_files(case, &files)
        .with_context(|| format!("Analysis of case '{case}' failed"))?;

    report::print_case(&result, max_modes);
    Ok(CampbellDiagram::from_results([&result]))
}

fn run_all_cases(analyzer: &Analyzer, cli: &Cli) -> Result<CampbellDiagram> {
    let cases = discover_cases(&cli.dir)
        .with_context(|| format!("Failed to list directory: {}", cli.dir.display()))?;
    if cases.is_empty() {
        bail!("No linearization files in {}", cli.dir.display());
    }

    let mut batch = BatchConfig::default();
    if let Some(jobs) = cli.jobs {
        batch = batch.with_jobs(jobs);
    }

    let outcomes = analyze_cases(analyzer, &cases, &batch)?;
    for outcome in &outcomes {
        if let Ok(result) = &outcome.result {
            report::print_case(result, cli.max_modes);
        }
    }

    let (diagram, failures) = collect_diagram(outcomes);
    report::print_summary(&diagram, &failures);

    if diagram.is_empty() {
        bail!("All {} case(s) failed", failures.len());
    }
    Ok(diagram)
}

fn write_json(diagram: &CampbellDiagram, path: &Path) -> Result<()> {
    let json = diagram.to_json().context("Failed to serialize results")?;
    fs::write(path, json).with_context(|| format!("Failed to write: {}", path.display()))
}
