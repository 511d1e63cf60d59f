//! Grouping of linearization files into cases.
//!
//! The simulator writes one file per azimuth sample, named
//! `<case>.<k>.lin` with `k` counting from 1. All files sharing a case
//! prefix belong to one operating point.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::reader::read_lin_file;
use crate::types::LinearizationSample;

/// Split a linearization file name into its case name and sample number.
///
/// Returns `None` if the file does not have a `.lin` extension. Files
/// without a numeric sample suffix form a single-sample case.
pub fn split_case_name(path: &Path) -> Option<(String, Option<usize>)> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case("lin") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;

    match stem.rsplit_once('.') {
        Some((case, suffix)) if !case.is_empty() => match suffix.parse::<usize>() {
            Ok(k) => Some((case.to_string(), Some(k))),
            Err(_) => Some((stem.to_string(), None)),
        },
        _ => Some((stem.to_string(), None)),
    }
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn sort_samples(files: &mut [(Option<usize>, PathBuf)]) {
    files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
}

/// Find every case in a directory, keyed by case name.
///
/// Files within a case are ordered by sample number.
pub fn discover_cases(dir: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut cases: BTreeMap<String, Vec<(Option<usize>, PathBuf)>> = BTreeMap::new();

    for path in list_dir(dir)? {
        if let Some((case, k)) = split_case_name(&path) {
            cases.entry(case).or_default().push((k, path));
        }
    }

    log::debug!("found {} cases in {}", cases.len(), dir.display());

    Ok(cases
        .into_iter()
        .map(|(case, mut files)| {
            sort_samples(&mut files);
            (case, files.into_iter().map(|(_, p)| p).collect())
        })
        .collect())
}

/// List the sample files of one case, ordered by sample number.
pub fn case_files(dir: &Path, case: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<(Option<usize>, PathBuf)> = list_dir(dir)?
        .into_iter()
        .filter_map(|path| match split_case_name(&path) {
            Some((name, k)) if name == case => Some((k, path)),
            _ => None,
        })
        .collect();

    sort_samples(&mut files);
    Ok(files.into_iter().map(|(_, p)| p).collect())
}

/// Read every sample file of a case.
///
/// Stops at the first file that fails to parse.
pub fn read_case(files: &[PathBuf]) -> Result<Vec<LinearizationSample>> {
    files.iter().map(|path| read_lin_file(path)).collect()
}
