//! The whole run: resolve paths, discover fixtures, execute each one in order
//! and stream verdicts to the reporter.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery::{discover, Convention, Fixture};
use crate::exec::{run_fixture, Program};
use crate::locate::{resolve_directory, resolve_program, PathError};
use crate::report::{Reporter, RunStats};

/// Everything a run needs, resolved or not. Paths left as `None` fall back to
/// the current directory and the `labNN.*` program found in it.
#[derive(Debug, Clone, Default)]
pub struct SuiteConfig {
    pub directory: Option<PathBuf>,
    pub program: Option<PathBuf>,
    pub interpreter: Option<OsString>,
    pub convention: Convention,
    pub timeout: Option<Duration>,
}

/// Reasons a run ends without a summary of results.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("no tests were run")]
    EmptySuite,

    #[error("failed to write the report: {0}")]
    Output(#[from] io::Error),
}

/// Run every discovered fixture once, in discovery order.
///
/// Per-fixture problems are reported as failed tests and never stop the run.
/// Path problems abort before discovery; finding no fixtures at all is
/// [`RunError::EmptySuite`], after the reporter has said so.
pub fn run_suite<W: Write>(
    config: &SuiteConfig,
    reporter: &mut Reporter<W>,
) -> Result<RunStats, RunError> {
    let directory = resolve_directory(config.directory.as_deref())?;
    let program_path = resolve_program(&directory, config.program.as_deref())?;
    let program = match &config.interpreter {
        Some(interp) => Program::with_interpreter(program_path, interp.clone()),
        None => Program::new(program_path),
    };
    tracing::debug!(
        dir = %directory.display(),
        program = %program.path().display(),
        "starting run"
    );

    let fixtures = discover(&directory, config.convention)?;

    let mut ordinal = 0;
    for fixture in &fixtures {
        match fixture {
            Fixture::Pair(pair) => {
                ordinal += 1;
                let result = run_fixture(ordinal, &program, pair, config.timeout);
                reporter.record(&result)?;
            }
            Fixture::Gap(gap) => reporter.gap(gap)?,
        }
    }

    let stats = reporter.stats();
    if stats.total == 0 {
        reporter.empty_suite()?;
        return Err(RunError::EmptySuite);
    }

    reporter.summary()?;
    Ok(stats)
}

/// Process exit code for a finished run: 0 only when at least one test ran
/// and none failed.
pub fn exit_code(outcome: &Result<RunStats, RunError>) -> i32 {
    match outcome {
        Ok(stats) if stats.all_passed() => 0,
        _ => 1,
    }
}
