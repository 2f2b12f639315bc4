use std::io::{self, Write};
use crate::runner::RunError;

/// Print a run-ending error to stderr, prefixed with the program name.
/// An empty suite has already been announced by the reporter.
pub fn print_run_error(program: &str, err: &RunError) {
    match err {
        RunError::EmptySuite => {}
        RunError::Path(path_err) => {
            eprintln!("{program}: {path_err}");
            eprintln!("Run {program} -h for help.");
        }
        RunError::Output(_) => {
            eprintln!("{program}: {err}");
        }
    }
    let _ = io::stderr().flush();
}
