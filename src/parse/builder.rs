//! Pipeline builder: groups the token stream into stages, resolving
//! redirection operators into opened file handles as they are named.

use std::fs::{File, OpenOptions};

use log::debug;

use super::expand::expand;
use super::scanner;
use super::types::{Operator, Pipeline, Stage, Token};
use crate::env::EnvSnapshot;
use crate::error::PipeError;

/// Parse a command string into a pipeline.
///
/// Redirection targets are opened here, in the mode the operator
/// demands, so an unopenable file aborts the parse before anything
/// runs. A stage left empty by the token stream (`a | | b`) is kept;
/// the executor, not the builder, rejects it.
pub fn build(input: &str, env: &EnvSnapshot) -> Result<Pipeline, PipeError> {
    let tokens = scanner::tokens(input)?;
    debug!("scanned {} token(s) from {input:?}", tokens.len());

    let mut stages = Vec::new();
    let mut current = Stage::default();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Operator(Operator::Pipe) => {
                stages.push(std::mem::take(&mut current));
            }
            Token::Operator(op) => {
                let path = redirect_target(op, iter.next(), env)?;
                let file = open_redirect(op, &path)?;
                match op {
                    Operator::RedirectIn => current.stdin = Some(file),
                    Operator::RedirectOut | Operator::RedirectAppend => {
                        current.stdout = Some(file)
                    }
                    Operator::RedirectErr => current.stderr = Some(file),
                    Operator::Pipe => unreachable!("handled above"),
                }
            }
            word => current.argv.push(resolve(&word, env)),
        }
    }

    if !current.argv.is_empty() {
        stages.push(current);
    }

    Ok(Pipeline { stages })
}

/// The file name following a redirection operator.
fn redirect_target(
    op: Operator,
    token: Option<Token>,
    env: &EnvSnapshot,
) -> Result<String, PipeError> {
    match token {
        Some(token @ (Token::Word(_) | Token::Quoted(_))) => Ok(resolve(&token, env)),
        Some(Token::Operator(other)) => Err(PipeError::MalformedToken(format!(
            "`{}` must be followed by a file name, found `{}`",
            op.as_str(),
            other.as_str()
        ))),
        None => Err(PipeError::MalformedToken(format!(
            "`{}` at end of command has no file name",
            op.as_str()
        ))),
    }
}

fn open_redirect(op: Operator, path: &str) -> Result<File, PipeError> {
    let opened = match op {
        Operator::RedirectIn => File::open(path),
        Operator::RedirectOut | Operator::RedirectErr => File::create(path),
        Operator::RedirectAppend => OpenOptions::new().create(true).append(true).open(path),
        Operator::Pipe => unreachable!("pipe is not a redirection"),
    };
    opened.map_err(|source| PipeError::Redirect {
        path: path.to_string(),
        source,
    })
}

/// Expand then unquote a token into its argument value.
fn resolve(token: &Token, env: &EnvSnapshot) -> String {
    unquote(&expand(token.text(), env))
}

/// Strip the enclosing quotes from a quoted value and resolve escaped
/// quote characters and backslashes (`\"` → `"`, `\\` → `\`). Other
/// backslash sequences pass through untouched, so `'a\nb'` hands the
/// command a literal backslash-n. Unquoted values pass through whole.
fn unquote(text: &str) -> String {
    let bytes = text.as_bytes();
    let quote = match bytes.first() {
        Some(&q @ (b'\'' | b'"')) => q,
        _ => return text.to_string(),
    };

    let mut inner = &bytes[1..];
    if inner.last() == Some(&quote) {
        inner = &inner[..inner.len() - 1];
    }

    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\'
            && i + 1 < inner.len()
            && matches!(inner[i + 1], b'\'' | b'"' | b'\\')
        {
            out.push(inner[i + 1]);
            i += 2;
        } else {
            out.push(inner[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
