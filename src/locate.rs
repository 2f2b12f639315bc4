use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Preconditions on the configured paths. Any of these aborts the run before
/// a single fixture is looked at.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("the directory {} does not exist", .path.display())]
    MissingDirectory { path: PathBuf },

    #[error("{} is a file, but a directory of test files was expected", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot read the directory {}: {source}", .path.display())]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot determine the current directory: {source}")]
    CurrentDir {
        #[source]
        source: io::Error,
    },

    #[error("the file {} does not exist", .path.display())]
    MissingProgram { path: PathBuf },

    #[error("no lab program (labNN.*) found in {}", .dir.display())]
    ProgramNotFound { dir: PathBuf },
}

/// Resolve the fixture directory: the explicit one when given, otherwise the
/// current working directory.
pub fn resolve_directory(dir: Option<&Path>) -> Result<PathBuf, PathError> {
    let path = match dir {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().map_err(|source| PathError::CurrentDir { source })?,
    };

    if path.is_dir() {
        Ok(path)
    } else if path.is_file() {
        Err(PathError::NotADirectory { path })
    } else {
        Err(PathError::MissingDirectory { path })
    }
}

/// Check that `dir` is a directory whose entries can be listed.
pub fn ensure_readable_dir(dir: &Path) -> Result<(), PathError> {
    if dir.is_file() {
        return Err(PathError::NotADirectory { path: dir.to_path_buf() });
    }
    match fs::read_dir(dir) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(PathError::MissingDirectory { path: dir.to_path_buf() })
        }
        Err(source) => Err(PathError::UnreadableDirectory { path: dir.to_path_buf(), source }),
    }
}

/// Resolve the program under test.
///
/// An explicit path must name an existing file. Without one, the directory is
/// scanned for `labNN.*` files (`NN` is exactly two digits) that can actually
/// be launched. `.py` wins over `.sh`, which wins over other executables;
/// ties go to the lowest file name.
pub fn resolve_program(dir: &Path, explicit: Option<&Path>) -> Result<PathBuf, PathError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(PathError::MissingProgram { path: path.to_path_buf() })
        };
    }

    let entries = fs::read_dir(dir)
        .map_err(|source| PathError::UnreadableDirectory { path: dir.to_path_buf(), source })?;

    entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_lab_program(p))
        .filter_map(|p| launch_rank(&p).map(|rank| (rank, p)))
        .min_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.file_name().cmp(&b.file_name())))
        .map(|(_, p)| p)
        .ok_or_else(|| PathError::ProgramNotFound { dir: dir.to_path_buf() })
}

/// Preference among launchable candidates, lower first. `None` for files that
/// can't be started (`lab01.pdf`, `lab01.txt`, ...).
fn launch_rank(path: &Path) -> Option<u8> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Some(0),
        Some("sh") => Some(1),
        _ if is_executable(path) => Some(2),
        _ => None,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("exe"))
}

/// `lab` + two ASCII digits as the file stem; fixture files are never programs.
fn is_lab_program(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let Some(number) = stem.strip_prefix("lab") else {
        return false;
    };
    if number.len() != 2 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    !matches!(path.extension().and_then(|e| e.to_str()), Some("in") | Some("out"))
}
