//! pipeweld CLI: run a mini-language pipeline and print captured output.
//!
//! The command string is the joined arguments, or stdin when no
//! arguments are given. The result is one JSON object on stdout:
//!
//! ```json
//! {"ok":true,"stdout":"hello","stderr":"","error":null}
//! ```
//!
//! Exit code 0 on success, 1 on any pipeline error, 2 on usage errors.

use std::io::Read;

use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use pipeweld::PipeError;

#[derive(Debug, Serialize)]
struct Response {
    ok: bool,
    stdout: String,
    stderr: String,
    error: Option<String>,
}

fn main() {
    let mut verbose = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ => words.push(arg),
        }
    }

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let command = if words.is_empty() {
        let mut buf = String::new();
        if std::io::stdin().read_to_string(&mut buf).is_err() {
            eprintln!("failed to read stdin");
            std::process::exit(2);
        }
        buf.trim_end().to_string()
    } else {
        words.join(" ")
    };

    if command.trim().is_empty() {
        eprintln!("usage: pipeweld [-v|--verbose] <command string>");
        std::process::exit(2);
    }

    let response = match pipeweld::pipe(&command) {
        Ok(out) => Response {
            ok: true,
            stdout: out.stdout,
            stderr: out.stderr,
            error: None,
        },
        Err(err) => {
            // Execution failures still carry everything the pipeline
            // wrote to stderr before stopping.
            let stderr = match &err {
                PipeError::Execution { stderr, .. } => stderr.clone(),
                _ => String::new(),
            };
            Response {
                ok: false,
                stdout: String::new(),
                stderr,
                error: Some(err.to_string()),
            }
        }
    };

    println!("{}", serde_json::to_string(&response).unwrap());
    std::process::exit(if response.ok { 0 } else { 1 });
}
