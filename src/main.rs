use clap::Parser;
use labtest::cli::{self, Cli};
use std::env;
use std::io;

fn main() {
    // argv[0] prefixes error lines and the usage text
    let program = env::args().next().unwrap_or_else(|| String::from("labtest"));

    let args = Cli::parse();

    // Diagnostics are opt-in via LABTEST_LOG and never shown in silent mode
    if !args.silent {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("LABTEST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
            )
            .with_writer(io::stderr)
            .try_init();
    }

    std::process::exit(cli::run(&program, args));
}
