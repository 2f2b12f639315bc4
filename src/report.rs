//! Streaming report of per-test verdicts and the final summary.

use std::io::{self, Write};

use nu_ansi_term::Color;

use crate::config::Colors;
use crate::discovery::DiscoveryGapError;
use crate::exec::{Outcome, TestResult};

/// Output switches. They are independent and may be combined freely:
/// `silent` wins over everything, `summary_only` hides per-test lines that
/// `quiet` would still allow, and `verbose` only adds detail to failures that
/// are shown at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub verbose: bool,
    pub quiet: bool,
    pub summary_only: bool,
    pub silent: bool,
}

impl Verbosity {
    fn shows_failures(&self) -> bool {
        !self.silent && !self.summary_only
    }

    fn shows_passes(&self) -> bool {
        self.shows_failures() && !self.quiet
    }

    fn shows_diagnostics(&self) -> bool {
        self.shows_failures() && self.verbose
    }

    pub fn shows_summary(&self) -> bool {
        !self.silent
    }
}

/// Running totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunStats {
    fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
    }

    /// Every test passed and there was at least one.
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// Writes report lines to `out` as verdicts arrive and keeps the totals.
pub struct Reporter<W: Write> {
    out: W,
    verbosity: Verbosity,
    colors: Option<Colors>,
    stats: RunStats,
}

impl<W: Write> Reporter<W> {
    /// `colors` of `None` produces plain text.
    pub fn new(out: W, verbosity: Verbosity, colors: Option<Colors>) -> Self {
        Self { out, verbosity, colors, stats: RunStats::default() }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn record(&mut self, result: &TestResult) -> io::Result<()> {
        self.stats.record(result.passed());

        let label = format!("Test {:02} ({})", result.ordinal, result.name);
        match &result.outcome {
            Outcome::Passed => {
                if self.verbosity.shows_passes() {
                    let line = self.paint(|c| c.pass, &format!("{label}: correct result"));
                    writeln!(self.out, "{line}")?;
                }
            }
            Outcome::Mismatch { actual, expected } => {
                if self.verbosity.shows_failures() {
                    let line = self.paint(|c| c.fail, &format!("{label}: incorrect result"));
                    writeln!(self.out, "{line}")?;
                }
                if self.verbosity.shows_diagnostics() {
                    self.body(">>> Your output:", actual)?;
                    self.body(">>> Expected output:", expected)?;
                }
            }
            Outcome::Failed(err) => {
                if self.verbosity.shows_failures() {
                    let line = self.paint(|c| c.fail, &format!("{label}: execution error: {err}"));
                    writeln!(self.out, "{line}")?;
                }
                if self.verbosity.shows_diagnostics() {
                    if let Some(stderr) = err.stderr().filter(|s| !s.is_empty()) {
                        self.body(">>> Program stderr:", stderr.as_bytes())?;
                    }
                }
            }
        }
        self.out.flush()
    }

    /// A sequential input without its expected output. Not counted as a test.
    pub fn gap(&mut self, gap: &DiscoveryGapError) -> io::Result<()> {
        if self.verbosity.shows_failures() {
            let msg = format!(
                "Missing expected output for {} ({})",
                gap.input_name(),
                gap.expected_name()
            );
            let line = self.paint(|c| c.fail, &msg);
            writeln!(self.out, "{line}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn summary(&mut self) -> io::Result<()> {
        if !self.verbosity.shows_summary() {
            return Ok(());
        }
        let RunStats { passed, failed, total } = self.stats;

        let headers = format!(
            "{}  {}  {}",
            self.paint(|c| c.passed, "Passed"),
            self.paint(|c| c.failed, "Failed"),
            self.paint(|c| c.total, "Total"),
        );
        let counts = format!(
            "{}  {}  {}",
            self.paint(|c| c.passed, &format!("{passed:>6}")),
            self.paint(|c| c.failed, &format!("{failed:>6}")),
            self.paint(|c| c.total, &format!("{total:>5}")),
        );
        writeln!(self.out, "Summary: | {headers}")?;
        writeln!(self.out, "         | {counts}")?;
        self.out.flush()
    }

    /// Shown instead of the summary when discovery found nothing to run.
    pub fn empty_suite(&mut self) -> io::Result<()> {
        if self.verbosity.silent {
            return Ok(());
        }
        let line = self.paint(|c| c.fail, "No tests were run. Run with -h for help.");
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    fn body(&mut self, header: &str, text: &[u8]) -> io::Result<()> {
        let header = self.paint(|c| c.header, header);
        writeln!(self.out, "{header}")?;
        writeln!(self.out, "{}", String::from_utf8_lossy(text))
    }

    fn paint(&self, pick: impl Fn(&Colors) -> Color, text: &str) -> String {
        match &self.colors {
            Some(colors) => pick(colors).paint(text).to_string(),
            None => text.to_string(),
        }
    }
}
