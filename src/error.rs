//! Error taxonomy for scanning, building, and running pipelines.

use std::io;
use thiserror::Error;

/// Failures surfaced to callers of [`crate::pipe`].
///
/// Invariant violations — a zero-stage pipeline reaching the executor,
/// an empty token reaching the expander — are explicit panics, not
/// variants: no input string can produce them.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The scanner or builder rejected the token sequence. Nothing has
    /// been executed and no redirection target has been opened past the
    /// offending point.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A redirection target could not be opened in the required mode.
    /// Aborts the parse before any process starts.
    #[error("cannot open `{path}`: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A stage failed to start, could not be fed its input, or exited
    /// unsuccessfully. Remaining stages were not run. `stderr` holds
    /// everything captured up to and including the failing stage.
    #[error("command `{command}` {detail}")]
    Execution {
        command: String,
        detail: String,
        stderr: String,
    },
}
