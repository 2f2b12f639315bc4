//! Running the program under test against one fixture and judging the result.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::discovery::FixturePair;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors that turn a single fixture into a failure without stopping the run.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read fixture {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while talking to the program: {source}")]
    Io {
        #[source]
        source: io::Error,
    },

    #[error("program exited with status {code}")]
    Status { code: i32, stderr: String },

    #[error("program terminated abnormally ({status})")]
    Abnormal { status: ExitStatus, stderr: String },

    #[error("program did not finish within {millis} ms")]
    TimedOut { millis: u128 },
}

impl ExecutionError {
    /// Whatever the program wrote to stderr before failing, if it got that far.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ExecutionError::Status { stderr, .. } | ExecutionError::Abnormal { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

impl From<io::Error> for ExecutionError {
    fn from(source: io::Error) -> Self {
        ExecutionError::Io { source }
    }
}

/// The program under test and how to launch it.
///
/// `.py` files run under `python3` and `.sh` files under `sh`; anything else
/// is executed directly. The path is always passed as a single argument, never
/// through a shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    path: PathBuf,
    interpreter: Option<OsString>,
}

impl Program {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let interpreter = match path.extension().and_then(|e| e.to_str()) {
            Some("py") => Some(OsString::from("python3")),
            Some("sh") => Some(OsString::from("sh")),
            _ => None,
        };
        Self { path, interpreter }
    }

    pub fn with_interpreter(path: impl Into<PathBuf>, interpreter: impl Into<OsString>) -> Self {
        Self { path: path.into(), interpreter: Some(interpreter.into()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn interpreter(&self) -> Option<&OsStr> {
        self.interpreter.as_deref()
    }

    fn command(&self) -> Command {
        match &self.interpreter {
            Some(interp) => {
                let mut cmd = Command::new(interp);
                cmd.arg(&self.path);
                cmd
            }
            None => {
                // A bare file name would be looked up on PATH
                if self.path.components().count() == 1 {
                    Command::new(Path::new(".").join(&self.path))
                } else {
                    Command::new(&self.path)
                }
            }
        }
    }

    fn describe(&self) -> String {
        match &self.interpreter {
            Some(interp) => format!("{} {}", interp.to_string_lossy(), self.path.display()),
            None => self.path.display().to_string(),
        }
    }
}

/// Run `program` with `input` on its stdin and return everything it wrote to
/// stdout.
///
/// Blocks until the program exits. With `timeout` set, a program still running
/// at the deadline is killed and reported as [`ExecutionError::TimedOut`].
pub fn run_program(
    program: &Program,
    input: &[u8],
    timeout: Option<Duration>,
) -> Result<Vec<u8>, ExecutionError> {
    tracing::debug!(program = %program.describe(), bytes = input.len(), "launching");

    let mut child = program
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExecutionError::Spawn { program: program.describe(), source })?;

    // stdin is fed and the output pipes drained on their own threads so a
    // chatty program can never fill a pipe and stall.
    let writer = feed(child.stdin.take(), input.to_vec());
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        None => child.wait()?,
        Some(limit) => wait_until(&mut child, limit)?,
    };

    let stdout = join(stdout)?;
    let stderr = String::from_utf8_lossy(&join(stderr)?).into_owned();
    join(writer)?;

    if status.success() {
        Ok(stdout)
    } else if let Some(code) = status.code() {
        Err(ExecutionError::Status { code, stderr })
    } else {
        Err(ExecutionError::Abnormal { status, stderr })
    }
}

fn feed<W: Write + Send + 'static>(
    pipe: Option<W>,
    input: Vec<u8>,
) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let Some(mut pipe) = pipe else {
            return Ok(());
        };
        match pipe.write_all(&input) {
            // The program is free to exit without reading all of its input
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: thread::JoinHandle<io::Result<T>>) -> Result<T, ExecutionError> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(ExecutionError::Io {
            source: io::Error::other("pipe thread panicked"),
        }),
    }
}

fn wait_until(child: &mut Child, limit: Duration) -> Result<ExitStatus, ExecutionError> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(millis = limit.as_millis(), "program killed after timeout");
            return Err(ExecutionError::TimedOut { millis: limit.as_millis() });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// How one fixture went.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    /// Output differed from the expected fixture; both texts are kept in full.
    Mismatch { actual: Vec<u8>, expected: Vec<u8> },
    /// The program could not be run to completion.
    Failed(ExecutionError),
}

/// The verdict for one executed fixture pair.
#[derive(Debug)]
pub struct TestResult {
    /// 1-based position among the executed fixtures.
    pub ordinal: usize,
    pub name: String,
    pub outcome: Outcome,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }

    pub fn actual_output(&self) -> Option<&[u8]> {
        match &self.outcome {
            Outcome::Mismatch { actual, .. } => Some(actual),
            _ => None,
        }
    }

    pub fn expected_output(&self) -> Option<&[u8]> {
        match &self.outcome {
            Outcome::Mismatch { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

/// Exact comparison: no trimming and no line-ending normalization.
pub fn compare(actual: Vec<u8>, expected: Vec<u8>) -> Outcome {
    if actual == expected {
        Outcome::Passed
    } else {
        Outcome::Mismatch { actual, expected }
    }
}

/// Run `program` on `pair` and judge its output. Never fails: anything that
/// goes wrong becomes [`Outcome::Failed`].
pub fn run_fixture(
    ordinal: usize,
    program: &Program,
    pair: &FixturePair,
    timeout: Option<Duration>,
) -> TestResult {
    let outcome = match execute(program, pair, timeout) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(fixture = %pair.name(), error = %err, "execution failed");
            Outcome::Failed(err)
        }
    };

    TestResult { ordinal, name: pair.name(), outcome }
}

fn execute(
    program: &Program,
    pair: &FixturePair,
    timeout: Option<Duration>,
) -> Result<Outcome, ExecutionError> {
    let input = read_fixture(pair.input())?;
    let actual = run_program(program, &input, timeout)?;
    let expected = read_fixture(pair.expected())?;
    Ok(compare(actual, expected))
}

fn read_fixture(path: &Path) -> Result<Vec<u8>, ExecutionError> {
    fs::read(path).map_err(|source| ExecutionError::Fixture { path: path.to_path_buf(), source })
}
