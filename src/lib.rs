//! pipeweld: a mini shell-pipeline interpreter.
//!
//! Takes a single command string in a small shell-like mini-language —
//! words, single/double quoting with backslash escapes, pipes (`|`),
//! redirections (`<`, `>`, `>>`, `^` for stderr), and tilde expansion —
//! parses it into a chain of external commands, runs them with their
//! standard streams wired together, and returns the captured stdout
//! and stderr.
//!
//! This is deliberately not a shell: no globbing, no variable
//! substitution, no subshells, no job control. Stages run one at a
//! time with fully buffered chaining (see [`exec`] for the contract).
//!
//! # Architecture
//!
//! - **[`parse`]** — word scanner (state-machine lexer), tilde
//!   expansion, and the pipeline builder that opens redirection targets.
//! - **[`exec`]** — sequential, fully-buffered stage execution with
//!   capture and newline normalization.
//! - **[`env`]** — read-only environment snapshot consumed by expansion.
//! - **[`error`]** — the [`PipeError`] taxonomy.
//!
//! ```no_run
//! let out = pipeweld::pipe("echo hello | wc -l").unwrap();
//! assert_eq!(out.stdout.trim(), "1");
//! ```

/// Read-only environment snapshot for tilde expansion.
pub mod env;
/// Error types for scanning, building, and running pipelines.
pub mod error;
/// Sequential pipeline execution with output capture.
pub mod exec;
/// Scanning, expansion, and pipeline construction.
pub mod parse;

pub use env::EnvSnapshot;
pub use error::PipeError;
pub use exec::PipeOutput;

/// Parse and run a pipeline, reading `HOME` from the current process
/// environment.
///
/// This is the main entry point for simple usage; [`pipe_with_env`]
/// takes an injected snapshot instead, and [`parse::build`] plus
/// [`exec::run`] expose the two phases separately.
///
/// # Panics
///
/// On a command string with no tokens at all (empty or blank input) —
/// there is no pipeline to run. Callers taking untrusted strings should
/// check for that case first, as the bundled CLI does.
pub fn pipe(command: &str) -> Result<PipeOutput, PipeError> {
    pipe_with_env(command, &EnvSnapshot::from_process())
}

/// Parse and run a pipeline against an injected environment snapshot.
pub fn pipe_with_env(command: &str, env: &EnvSnapshot) -> Result<PipeOutput, PipeError> {
    let pipeline = parse::build(command, env)?;
    exec::run(pipeline)
}
