//! Fixture discovery.
//!
//! Two naming conventions are understood:
//! - glob: every `*.in` file paired with the `.out` file of the same stem;
//!   inputs without an output are dropped silently.
//! - sequential: `arq01.in`/`arq01.out`, `arq02.in`/`arq02.out`, ... until the
//!   first missing `.in`. A missing `.out` is reported as a gap and the next
//!   index is tried.
//!
//! Both produce fixtures in ascending order of the input file name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::locate::{ensure_readable_dir, PathError};

const SEQUENTIAL_PREFIX: &str = "arq";

/// How fixture files are named in a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Convention {
    /// Sequential when `arq01.in` exists, glob otherwise.
    #[default]
    Auto,
    /// Every `*.in` with a matching `*.out`.
    Glob,
    /// `arq01.in`, `arq02.in`, ... stopping at the first gap.
    Sequential,
}

impl Convention {
    /// Pick the concrete convention for `dir`. Explicit choices are returned as-is.
    pub fn resolve(self, dir: &Path) -> Convention {
        match self {
            Convention::Auto => {
                if sequential_input(dir, 1).is_file() {
                    Convention::Sequential
                } else {
                    Convention::Glob
                }
            }
            other => other,
        }
    }
}

/// An input fixture and its expected output. Only built once both files are
/// known to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePair {
    input: PathBuf,
    expected: PathBuf,
}

impl FixturePair {
    /// Pair `input` with the `.out` file next to it, if that file exists.
    pub fn probe(input: &Path) -> Option<Self> {
        let expected = input.with_extension("out");
        if input.is_file() && expected.is_file() {
            Some(Self { input: input.to_path_buf(), expected })
        } else {
            None
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn expected(&self) -> &Path {
        &self.expected
    }

    /// Input file name without its extension, e.g. `t1` for `t1.in`.
    pub fn name(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// An input fixture whose expected output is missing (sequential convention).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing expected output for {} ({})", file_name(.input), file_name(.expected))]
pub struct DiscoveryGapError {
    pub input: PathBuf,
    pub expected: PathBuf,
}

impl DiscoveryGapError {
    /// File name of the input, e.g. `arq04.in`.
    pub fn input_name(&self) -> String {
        file_name(&self.input)
    }

    /// File name of the missing expected output, e.g. `arq04.out`.
    pub fn expected_name(&self) -> String {
        file_name(&self.expected)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One step of discovery, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fixture {
    Pair(FixturePair),
    Gap(DiscoveryGapError),
}

impl Fixture {
    pub fn as_pair(&self) -> Option<&FixturePair> {
        match self {
            Fixture::Pair(p) => Some(p),
            Fixture::Gap(_) => None,
        }
    }
}

/// Discover fixtures in `dir` under `convention`.
///
/// An empty result is not an error here; deciding what zero tests means is
/// left to the caller.
pub fn discover(dir: &Path, convention: Convention) -> Result<Vec<Fixture>, PathError> {
    ensure_readable_dir(dir)?;

    let convention = convention.resolve(dir);
    tracing::debug!(dir = %dir.display(), ?convention, "discovering fixtures");

    match convention {
        Convention::Sequential => Ok(discover_sequential(dir)),
        Convention::Glob | Convention::Auto => discover_glob(dir),
    }
}

fn discover_glob(dir: &Path) -> Result<Vec<Fixture>, PathError> {
    let entries = fs::read_dir(dir)
        .map_err(|source| PathError::UnreadableDirectory { path: dir.to_path_buf(), source })?;

    let mut inputs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "in") && !is_hidden(p))
        .collect();
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let pairs = inputs
        .iter()
        .filter_map(|input| {
            let pair = FixturePair::probe(input);
            if pair.is_none() {
                tracing::debug!(input = %input.display(), "skipping input without .out");
            }
            pair
        })
        .map(Fixture::Pair)
        .collect();

    Ok(pairs)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n.as_encoded_bytes().starts_with(b"."))
}

fn discover_sequential(dir: &Path) -> Vec<Fixture> {
    let mut fixtures = Vec::new();

    for index in 1.. {
        let input = sequential_input(dir, index);
        if !input.is_file() {
            break;
        }
        match FixturePair::probe(&input) {
            Some(pair) => fixtures.push(Fixture::Pair(pair)),
            None => {
                let expected = input.with_extension("out");
                tracing::warn!(input = %input.display(), "input fixture has no expected output");
                fixtures.push(Fixture::Gap(DiscoveryGapError { input, expected }));
            }
        }
    }

    fixtures
}

fn sequential_input(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{SEQUENTIAL_PREFIX}{index:02}.in"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    fn names(fixtures: &[Fixture]) -> Vec<String> {
        fixtures.iter().filter_map(Fixture::as_pair).map(FixturePair::name).collect()
    }

    #[test]
    fn glob_pairs_sorted_and_unpaired_inputs_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.in", "b.out", "a.in", "a.out", "c.in", "10.in", "10.out"] {
            touch(tmp.path(), name);
        }

        let found = discover(tmp.path(), Convention::Glob).unwrap();
        assert_eq!(names(&found), ["10", "a", "b"]);
        assert!(found.iter().all(|f| f.as_pair().is_some()));

        let first = found[0].as_pair().unwrap();
        assert_eq!(first.input(), tmp.path().join("10.in"));
        assert_eq!(first.expected(), tmp.path().join("10.out"));
    }

    #[test]
    fn glob_ignores_out_only_and_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["x.out", "lab01.py", "readme.txt", ".hidden.in", ".hidden.out", ".in", ".out"] {
            touch(tmp.path(), name);
        }
        assert!(discover(tmp.path(), Convention::Glob).unwrap().is_empty());
    }

    #[test]
    fn discovery_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..20 {
            touch(tmp.path(), &format!("case{i}.in"));
            touch(tmp.path(), &format!("case{i}.out"));
        }
        let first = discover(tmp.path(), Convention::Glob).unwrap();
        let second = discover(tmp.path(), Convention::Glob).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 20);
    }

    #[test]
    fn sequential_stops_at_first_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        for i in [1, 2, 3, 5] {
            touch(tmp.path(), &format!("arq{i:02}.in"));
            touch(tmp.path(), &format!("arq{i:02}.out"));
        }

        let found = discover(tmp.path(), Convention::Sequential).unwrap();
        assert_eq!(names(&found), ["arq01", "arq02", "arq03"]);
    }

    #[test]
    fn sequential_reports_missing_output_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["arq01.in", "arq01.out", "arq02.in", "arq03.in", "arq03.out"] {
            touch(tmp.path(), name);
        }

        let found = discover(tmp.path(), Convention::Sequential).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(names(&found), ["arq01", "arq03"]);
        match &found[1] {
            Fixture::Gap(gap) => {
                assert_eq!(gap.input, tmp.path().join("arq02.in"));
                assert_eq!(gap.to_string(), "missing expected output for arq02.in (arq02.out)");
            }
            other => panic!("expected a gap, got {other:?}"),
        }
    }

    #[test]
    fn auto_picks_sequential_when_arq01_present() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Convention::Auto.resolve(tmp.path()), Convention::Glob);

        touch(tmp.path(), "arq01.in");
        assert_eq!(Convention::Auto.resolve(tmp.path()), Convention::Sequential);
        assert_eq!(Convention::Glob.resolve(tmp.path()), Convention::Glob);
    }

    #[test]
    fn auto_in_mixed_directory_uses_sequential_only() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["arq01.in", "arq01.out", "t1.in", "t1.out"] {
            touch(tmp.path(), name);
        }
        let found = discover(tmp.path(), Convention::Auto).unwrap();
        assert_eq!(names(&found), ["arq01"]);

        let found = discover(tmp.path(), Convention::Glob).unwrap();
        assert_eq!(names(&found), ["arq01", "t1"]);
    }

    #[test]
    fn missing_directory_is_a_path_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = discover(&tmp.path().join("absent"), Convention::Auto);
        assert!(matches!(result, Err(PathError::MissingDirectory { .. })));
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover(tmp.path(), Convention::Auto).unwrap().is_empty());
        assert!(discover(tmp.path(), Convention::Sequential).unwrap().is_empty());
    }
}
