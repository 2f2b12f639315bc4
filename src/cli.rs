use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cli_util::print_run_error;
use crate::config;
use crate::discovery::Convention;
use crate::report::{Reporter, Verbosity};
use crate::runner::{exit_code, run_suite, SuiteConfig};

#[derive(Parser, Debug)]
#[command(name = "labtest", disable_help_flag = true)]
pub struct Cli {
    /// Show both outputs when a test fails
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only show failing tests and the summary
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Only show the summary
    #[arg(short = 's', long = "summary")]
    pub summary: bool,

    /// Print nothing; the exit code tells the result
    #[arg(short = 'x', long = "silent")]
    pub silent: bool,

    /// Program to test (default: the labNN.* file in the test directory)
    #[arg(short = 'f', long = "filename", value_name = "PATH")]
    pub filename: Option<PathBuf>,

    /// Directory holding the .in and .out files (default: current directory)
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Fixture naming convention
    #[arg(short = 'c', long = "convention", value_enum, default_value_t = Convention::Auto)]
    pub convention: Convention,

    /// Command used to launch the program (default depends on its extension)
    #[arg(short = 'i', long = "interpreter", value_name = "CMD")]
    pub interpreter: Option<OsString>,

    /// Kill a test's program after MS milliseconds (fallback LABTEST_TIMEOUT_MS; default none)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, cli: Cli) -> i32 {
    if cli.help {
        usage_and_exit(program, 0);
    }

    let verbosity = Verbosity {
        verbose: cli.verbose,
        quiet: cli.quiet,
        summary_only: cli.summary,
        silent: cli.silent,
    };

    // --timeout beats LABTEST_TIMEOUT_MS; neither means no limit
    let timeout = cli
        .timeout_ms
        .or_else(|| std::env::var("LABTEST_TIMEOUT_MS").ok().and_then(|s| s.parse::<u64>().ok()))
        .map(Duration::from_millis);

    let suite = SuiteConfig {
        directory: cli.directory,
        program: cli.filename,
        interpreter: cli.interpreter,
        convention: cli.convention,
        timeout,
    };

    let colors = use_color(cli.no_color).then(|| config::colors().clone());

    let stdout = io::stdout();
    let mut reporter = Reporter::new(stdout.lock(), verbosity, colors);
    let outcome = run_suite(&suite, &mut reporter);

    if let Err(err) = &outcome {
        if !verbosity.silent {
            print_run_error(program, err);
        }
    }

    exit_code(&outcome)
}

fn use_color(disabled: bool) -> bool {
    if disabled {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    io::stdout().is_terminal()
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [OPTIONS]

Runs a lab program once for every .in file in the test directory that has a
matching .out file, feeding the .in file to the program's stdin and comparing
its stdout with the .out file. Outputs must be identical, so watch out for
trailing spaces and line breaks.

Options:
  --verbose,     -v          Show both outputs when a test fails
  --quiet,       -q          Only show failing tests and the summary
  --summary,     -s          Only show the summary
  --silent,      -x          Print nothing; the exit code tells the result
  --filename,    -f <PATH>   Program to test (default: labNN.* in the test directory)
  --directory,   -d <DIR>    Directory with .in/.out files (default: current directory)
  --convention,  -c <NAME>   auto | glob | sequential (default: auto)
  --interpreter, -i <CMD>    Launch the program with CMD instead of by extension
  --timeout <MS>             Kill a test's program after MS milliseconds
  --no-color                 Disable colored output
  --help,        -h          Show this help

Conventions:
  glob        every NAME.in with a NAME.out next to it, in name order
  sequential  arq01.in/arq01.out, arq02.in/arq02.out, ... up to the first missing .in
  auto        sequential when arq01.in exists, glob otherwise

Notes:
  - .py programs run under python3 and .sh programs under sh; anything else is executed directly.
  - Exit code is 0 only when at least one test ran and every test passed.
  - Set LABTEST_LOG=debug to trace discovery and program launches on stderr.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
