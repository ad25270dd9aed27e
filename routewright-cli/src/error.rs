//! Error types emitted by the routewright CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use routewright_core::SolveError;
use thiserror::Error;

use crate::problem::ProblemError;

/// Errors emitted by the routewright CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag that was not provided.
        field: &'static str,
        /// Environment variable that could provide it.
        env: &'static str,
    },
    /// A search budget would stop the engine before it starts.
    #[error("{field} must be greater than zero")]
    EmptyBudget {
        /// Flag carrying the budget.
        field: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was looked up.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening the problem file failed.
    #[error("failed to open problem at {path:?}: {source}")]
    OpenProblem {
        /// Problem file.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Problem JSON could not be decoded.
    #[error("failed to parse problem JSON at {path:?}: {source}")]
    ParseProblem {
        /// Problem file.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The problem decoded but describes an impossible model.
    #[error("problem in {path:?} failed validation: {source}")]
    InvalidProblem {
        /// Problem file.
        path: Utf8PathBuf,
        /// What was wrong with it.
        #[source]
        source: ProblemError,
    },
    /// The run aborted before the walk completed.
    #[error("solver failed: {source}")]
    Solve {
        /// Orchestration failure.
        source: SolveError,
    },
    /// Serializing the report failed.
    #[error("failed to serialize solve report: {0}")]
    SerializeReport(#[source] serde_json::Error),
    /// Writing the report failed.
    #[error("failed to write solve output: {0}")]
    WriteSolveOutput(#[source] std::io::Error),
}
