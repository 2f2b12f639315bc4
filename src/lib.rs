//! A batch tester for lab assignments.
//!
//! Given a directory of fixtures, this crate runs a program once per input
//! fixture, feeds the fixture to the program's stdin and compares what the
//! program prints with the expected-output fixture.
//!
//! Features and behaviors:
//! - Fixtures are discovered either as `NAME.in`/`NAME.out` pairs (glob) or
//!   as `arq01.in`/`arq01.out`, `arq02.in`/... (sequential).
//! - Comparison is exact: no trimming, no line-ending normalization.
//! - A program that exits with a non-zero status fails that test only; the
//!   remaining fixtures still run.
//! - Output can be verbose, quiet, summary-only or silent, in any combination.
//!
//! Quick start:
//!
//! ```no_run
//! use labtest::{run_suite, Reporter, SuiteConfig, Verbosity};
//!
//! let config = SuiteConfig {
//!     directory: Some("tests/lab03".into()),
//!     program: Some("tests/lab03/lab03.py".into()),
//!     ..Default::default()
//! };
//! let mut reporter = Reporter::new(std::io::stdout(), Verbosity::default(), None);
//! let stats = run_suite(&config, &mut reporter).expect("suite should run");
//! println!("{} of {} passed", stats.passed, stats.total);
//! ```

pub mod cli;
mod cli_util;
pub mod config;
pub mod discovery;
pub mod exec;
pub mod locate;
pub mod report;
pub mod runner;

pub use discovery::{discover, Convention, DiscoveryGapError, Fixture, FixturePair};
pub use exec::{run_fixture, run_program, ExecutionError, Outcome, Program, TestResult};
pub use locate::PathError;
pub use report::{Reporter, RunStats, Verbosity};
pub use runner::{exit_code, run_suite, RunError, SuiteConfig};
