//! Pipeline executor: runs stages one at a time, fully buffering
//! between them.
//!
//! Chaining is sequential by design, not an accident: stage i runs to
//! completion — consuming all its input, producing all its output —
//! before stage i+1 starts, with the captured stdout replayed into the
//! next stage's stdin from memory. There is no live OS-level pipe
//! between stages, so total memory is bounded by the sum of the
//! intermediate outputs, and a command whose termination depends on a
//! concurrently-running downstream consumer will deadlock. Commands
//! must terminate on their own input.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use log::{debug, warn};
use serde::Serialize;

use crate::error::PipeError;
use crate::parse::{Pipeline, Stage};

/// Captured output of a completed pipeline, with at most one trailing
/// newline stripped from each stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipeOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run every stage of the pipeline to completion.
///
/// Execution stops at the first stage that cannot start or exits
/// unsuccessfully; the returned [`PipeError::Execution`] then carries
/// the stderr captured up to and including the failing stage, and the
/// pipeline's stdout is discarded.
///
/// # Panics
///
/// On a zero-stage pipeline. The builder never produces one from a
/// non-empty command string, so this is unreachable through [`crate::pipe`].
pub fn run(pipeline: Pipeline) -> Result<PipeOutput, PipeError> {
    assert!(!pipeline.stages.is_empty(), "pipeline has no stages");

    let total = pipeline.stages.len();
    let mut stderr_acc: Vec<u8> = Vec::new();
    let mut carry: Vec<u8> = Vec::new();

    for (i, stage) in pipeline.stages.into_iter().enumerate() {
        carry = run_stage(stage, i == 0, i + 1 == total, carry, &mut stderr_acc)?;
    }

    Ok(PipeOutput {
        stdout: normalize(carry),
        stderr: normalize(stderr_acc),
    })
}

/// Run one stage to completion, returning its captured stdout (empty
/// when stdout went to a redirection file instead).
fn run_stage(
    stage: Stage,
    first: bool,
    last: bool,
    input: Vec<u8>,
    stderr_acc: &mut Vec<u8>,
) -> Result<Vec<u8>, PipeError> {
    let Some((program, args)) = stage.argv.split_first() else {
        return Err(PipeError::Execution {
            command: String::new(),
            detail: "is empty (nothing between two pipes?)".to_string(),
            stderr: normalize(std::mem::take(stderr_acc)),
        });
    };

    let mut command = Command::new(program);
    command.args(args);

    // Input redirections are honored on the first stage only; any later
    // stage always reads the previous stage's buffered output. An
    // unwired handle was still opened at parse time and is dropped here.
    let feed_input = if first {
        match stage.stdin {
            Some(file) => command.stdin(Stdio::from(file)),
            None => command.stdin(Stdio::inherit()),
        };
        false
    } else {
        drop(stage.stdin);
        command.stdin(Stdio::piped());
        true
    };

    // Symmetrically, output redirections are honored on the last stage
    // only; earlier stages always feed the next buffer.
    let capture_stdout = if last {
        match stage.stdout {
            Some(file) => {
                command.stdout(Stdio::from(file));
                false
            }
            None => {
                command.stdout(Stdio::piped());
                true
            }
        }
    } else {
        drop(stage.stdout);
        command.stdout(Stdio::piped());
        true
    };

    // Stderr is per-stage: redirected, or appended to the shared capture.
    let capture_stderr = match stage.stderr {
        Some(file) => {
            command.stderr(Stdio::from(file));
            false
        }
        None => {
            command.stderr(Stdio::piped());
            true
        }
    };

    debug!(
        "running `{program}`{}",
        if feed_input {
            format!(" with {} byte(s) piped in", input.len())
        } else {
            String::new()
        }
    );

    let mut child = command.spawn().map_err(|e| {
        warn!("`{program}` failed to start: {e}");
        PipeError::Execution {
            command: program.clone(),
            detail: format!("failed to start: {e}"),
            stderr: normalize(std::mem::take(stderr_acc)),
        }
    })?;

    if feed_input {
        let mut stdin = child.stdin.take().expect("stdin was configured as piped");
        if let Err(e) = stdin.write_all(&input) {
            // A stage may legitimately stop reading early (`head`);
            // anything other than a broken pipe is a real failure.
            if e.kind() != ErrorKind::BrokenPipe {
                let _ = child.kill();
                let _ = child.wait();
                return Err(PipeError::Execution {
                    command: program.clone(),
                    detail: format!("could not be fed its input: {e}"),
                    stderr: normalize(std::mem::take(stderr_acc)),
                });
            }
        }
        drop(stdin);
    }

    let output = child.wait_with_output().map_err(|e| PipeError::Execution {
        command: program.clone(),
        detail: format!("could not be waited on: {e}"),
        stderr: normalize(std::mem::take(stderr_acc)),
    })?;

    if capture_stderr {
        stderr_acc.extend_from_slice(&output.stderr);
    }

    if !output.status.success() {
        warn!("`{program}` exited with {}", output.status);
        return Err(PipeError::Execution {
            command: program.clone(),
            detail: format!("exited with {}", output.status),
            stderr: normalize(std::mem::take(stderr_acc)),
        });
    }

    debug!("`{program}` produced {} byte(s)", output.stdout.len());
    Ok(if capture_stdout { output.stdout } else { Vec::new() })
}

/// Decode captured bytes, stripping at most one trailing newline.
fn normalize(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Stage;

    fn stage(argv: &[&str]) -> Stage {
        Stage {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            ..Stage::default()
        }
    }

    #[test]
    #[should_panic(expected = "no stages")]
    fn zero_stage_pipeline_is_a_contract_violation() {
        let _ = run(Pipeline { stages: vec![] });
    }

    #[test]
    fn empty_argv_stage_is_an_execution_error() {
        // Empty stage first, so the error surfaces before anything spawns.
        let pipeline = Pipeline {
            stages: vec![Stage::default(), stage(&["echo", "a"])],
        };
        let err = run(pipeline).unwrap_err();
        assert!(matches!(err, PipeError::Execution { .. }), "got {err:?}");
    }

    #[test]
    fn normalize_strips_exactly_one_newline() {
        assert_eq!(normalize(b"hello\n".to_vec()), "hello");
        assert_eq!(normalize(b"hello\n\n".to_vec()), "hello\n");
        assert_eq!(normalize(b"hello".to_vec()), "hello");
        assert_eq!(normalize(Vec::new()), "");
    }

    #[cfg(unix)]
    #[test]
    fn single_stage_captures_stdout() {
        let out = run(Pipeline {
            stages: vec![stage(&["echo", "hi"])],
        })
        .unwrap();
        assert_eq!(out.stdout, "hi");
        assert_eq!(out.stderr, "");
    }

    #[cfg(unix)]
    #[test]
    fn failing_single_stage_reports_its_status() {
        let err = run(Pipeline {
            stages: vec![stage(&["false"])],
        })
        .unwrap_err();
        match err {
            PipeError::Execution { command, .. } => assert_eq!(command, "false"),
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unknown_program_fails_to_start() {
        let err = run(Pipeline {
            stages: vec![stage(&["definitely-not-a-real-binary-5309"])],
        })
        .unwrap_err();
        match err {
            PipeError::Execution { detail, .. } => {
                assert!(detail.contains("failed to start"), "detail: {detail}")
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }
}
