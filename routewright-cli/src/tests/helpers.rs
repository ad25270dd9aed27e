//! Test helpers for writing problem files into temporary directories.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

use crate::problem::ProblemFile;

/// Write `contents` to `path`, creating the file.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path, contents).expect("write test file");
}

/// A temporary directory and a `problem.json` path inside it.
pub(super) fn problem_dir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let problem_path = root.join("problem.json");
    (tmp, problem_path)
}

/// Serialize `problem` to `path`.
pub(super) fn write_problem(path: &Utf8Path, problem: &ProblemFile) {
    let payload = serde_json::to_string_pretty(problem).expect("serialize problem");
    write_utf8(path, payload.as_bytes());
}

/// Nodes `0..nodes` on a line, one unit apart, served from depot 0.
pub(super) fn line_problem(nodes: usize, vehicles: usize) -> ProblemFile {
    let distance_matrix = (0..nodes)
        .map(|from| {
            (0..nodes)
                .map(|to| i64::try_from(from.abs_diff(to)).expect("small line"))
                .collect()
        })
        .collect();
    ProblemFile {
        distance_matrix,
        vehicles,
        depot: Some(0),
        ..ProblemFile::default()
    }
}
