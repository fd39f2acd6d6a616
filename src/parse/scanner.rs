//! Word scanner: splits raw command text into words, quoted words, and
//! operators.
//!
//! [`scan_token`] is a stepping function over the remaining unconsumed
//! bytes: each call consumes at most one token's worth of input and
//! reports how far it got, so a caller feeding data incrementally can
//! retry with more bytes whenever the scanner cannot decide yet (the
//! only such point is a `>` that might still become `>>`). [`tokens`]
//! drives the stepping function over a complete command string.

use super::types::{Operator, Token};
use crate::error::PipeError;

/// Scanner state. One token is produced per acceptance, after which the
/// scanner restarts in `Normal` for the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between tokens.
    Normal,
    /// Inside an unquoted word.
    InWord,
    /// Inside a quoted token, single or double.
    InQuote(Quote),
    /// Backslash seen inside a quoted token; the next byte is taken
    /// literally and cannot terminate the quote.
    Escaped(Quote),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
}

impl Quote {
    fn from_byte(b: u8) -> Self {
        if b == b'\'' { Quote::Single } else { Quote::Double }
    }

    fn byte(self) -> u8 {
        match self {
            Quote::Single => b'\'',
            Quote::Double => b'"',
        }
    }
}

/// One scanning step.
///
/// Takes the remaining unconsumed buffer and whether more input may
/// still arrive. Returns how many bytes to consume and the extracted
/// token; `(0, None)` means either "need more data" (`at_eof` false) or
/// "nothing left but padding" (`at_eof` true).
pub fn scan_token(data: &[u8], at_eof: bool) -> Result<(usize, Option<Token>), PipeError> {
    if at_eof && data.is_empty() {
        return Ok((0, None));
    }

    let mut state = State::Normal;
    let mut start = 0usize;

    for (i, &b) in data.iter().enumerate() {
        match state {
            State::Escaped(quote) => state = State::InQuote(quote),

            State::InQuote(quote) => {
                if b == quote.byte() {
                    // Token includes both quote characters.
                    return Ok((i + 1, Some(quoted(&data[start..=i]))));
                }
                if b == b'\\' {
                    state = State::Escaped(quote);
                }
            }

            State::Normal | State::InWord => match b {
                b'\'' | b'"' => {
                    if state == State::InWord {
                        return Err(PipeError::MalformedToken(format!(
                            "quote character inside an unquoted word at byte {i}"
                        )));
                    }
                    start = i;
                    state = State::InQuote(Quote::from_byte(b));
                }
                b' ' => {
                    if state == State::InWord {
                        return Ok((i + 1, Some(word(&data[start..i]))));
                    }
                }
                b'|' | b'<' | b'^' => {
                    if state == State::InWord {
                        // Close the word; the operator is re-scanned on
                        // the next call.
                        return Ok((i, Some(word(&data[start..i]))));
                    }
                    let op = match b {
                        b'|' => Operator::Pipe,
                        b'<' => Operator::RedirectIn,
                        _ => Operator::RedirectErr,
                    };
                    return Ok((i + 1, Some(Token::Operator(op))));
                }
                b'>' => {
                    if i + 1 == data.len() && !at_eof {
                        // Cannot tell `>` from `>>` yet.
                        return Ok((0, None));
                    }
                    if state == State::InWord {
                        return Ok((i, Some(word(&data[start..i]))));
                    }
                    if data.get(i + 1) == Some(&b'>') {
                        return Ok((i + 2, Some(Token::Operator(Operator::RedirectAppend))));
                    }
                    return Ok((i + 1, Some(Token::Operator(Operator::RedirectOut))));
                }
                _ => {
                    if state == State::Normal {
                        start = i;
                        state = State::InWord;
                    }
                }
            },
        }
    }

    if at_eof {
        // Trailing padding is trimmed; whatever remains (including an
        // unclosed quote) is emitted verbatim as the final token.
        let tail = trim_padding(data);
        if !tail.is_empty() {
            let token = if matches!(tail[0], b'\'' | b'"') {
                quoted(tail)
            } else {
                word(tail)
            };
            return Ok((data.len(), Some(token)));
        }
    }

    Ok((0, None))
}

/// Scan a complete command string into its token sequence.
pub fn tokens(input: &str) -> Result<Vec<Token>, PipeError> {
    let mut out = Vec::new();
    let mut rest = input.as_bytes();
    loop {
        let (consumed, token) = scan_token(rest, true)?;
        if consumed == 0 {
            break;
        }
        rest = &rest[consumed..];
        if let Some(token) = token {
            out.push(token);
        }
    }
    Ok(out)
}

fn word(bytes: &[u8]) -> Token {
    Token::Word(String::from_utf8_lossy(bytes).into_owned())
}

fn quoted(bytes: &[u8]) -> Token {
    Token::Quoted(String::from_utf8_lossy(bytes).into_owned())
}

/// Strip spaces and carriage returns from both ends.
fn trim_padding(data: &[u8]) -> &[u8] {
    let is_padding = |b: u8| b == b' ' || b == b'\r';
    let start = match data.iter().position(|&b| !is_padding(b)) {
        Some(i) => i,
        None => return &[],
    };
    let end = data.iter().rposition(|&b| !is_padding(b)).unwrap_or(start);
    &data[start..=end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Token> {
        tokens(input).expect("scan should succeed")
    }

    fn w(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    fn q(s: &str) -> Token {
        Token::Quoted(s.to_string())
    }

    fn op(o: Operator) -> Token {
        Token::Operator(o)
    }

    #[test]
    fn splits_plain_words() {
        assert_eq!(toks("echo hello world"), vec![w("echo"), w("hello"), w("world")]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(toks(""), vec![]);
        assert_eq!(toks("   "), vec![]);
    }

    #[test]
    fn pipe_between_words() {
        assert_eq!(
            toks("echo hello | wc -l"),
            vec![w("echo"), w("hello"), op(Operator::Pipe), w("wc"), w("-l")]
        );
    }

    #[test]
    fn operators_need_no_surrounding_spaces() {
        assert_eq!(toks("a|b"), vec![w("a"), op(Operator::Pipe), w("b")]);
        assert_eq!(toks("a>b"), vec![w("a"), op(Operator::RedirectOut), w("b")]);
        assert_eq!(toks("a<b"), vec![w("a"), op(Operator::RedirectIn), w("b")]);
        assert_eq!(toks("a^b"), vec![w("a"), op(Operator::RedirectErr), w("b")]);
    }

    #[test]
    fn double_gt_is_one_operator() {
        assert_eq!(
            toks("a >> b"),
            vec![w("a"), op(Operator::RedirectAppend), w("b")]
        );
        // Still one operator when glued to the preceding word.
        assert_eq!(
            toks("a>>b"),
            vec![w("a"), op(Operator::RedirectAppend), w("b")]
        );
    }

    #[test]
    fn gt_at_end_of_input() {
        assert_eq!(toks("a >"), vec![w("a"), op(Operator::RedirectOut)]);
        assert_eq!(toks(">"), vec![op(Operator::RedirectOut)]);
    }

    #[test]
    fn gt_at_buffer_end_requests_more_data() {
        let step = scan_token(b">", false).unwrap();
        assert_eq!(step, (0, None));
        // With EOF flagged, the same buffer resolves to `>`.
        let step = scan_token(b">", true).unwrap();
        assert_eq!(step, (1, Some(op(Operator::RedirectOut))));
    }

    #[test]
    fn quoted_token_keeps_its_quotes() {
        assert_eq!(toks("echo \"a|b\""), vec![w("echo"), q("\"a|b\"")]);
        assert_eq!(toks("echo 'a > b'"), vec![w("echo"), q("'a > b'")]);
    }

    #[test]
    fn operators_inside_quotes_are_literal() {
        assert_eq!(toks("\"a < b >> c\""), vec![q("\"a < b >> c\"")]);
    }

    #[test]
    fn backslash_escapes_quote_inside_quotes() {
        assert_eq!(toks(r#""a\"b""#), vec![q(r#""a\"b""#)]);
        assert_eq!(toks(r"'a\'b'"), vec![q(r"'a\'b'")]);
    }

    #[test]
    fn quote_inside_open_word_is_malformed() {
        let err = tokens("a\"b\"").unwrap_err();
        assert!(matches!(err, PipeError::MalformedToken(_)), "got {err:?}");
        let err = tokens("echo don't").unwrap_err();
        assert!(matches!(err, PipeError::MalformedToken(_)), "got {err:?}");
    }

    #[test]
    fn trailing_padding_is_trimmed() {
        assert_eq!(toks("a  "), vec![w("a")]);
        assert_eq!(toks("a\r"), vec![w("a")]);
        assert_eq!(toks("wc -l \r"), vec![w("wc"), w("-l")]);
    }

    #[test]
    fn unclosed_quote_is_emitted_verbatim() {
        assert_eq!(toks("\"abc"), vec![q("\"abc")]);
    }

    #[test]
    fn full_redirection_line() {
        assert_eq!(
            toks("cat < in.txt > out.txt ^ err.txt"),
            vec![
                w("cat"),
                op(Operator::RedirectIn),
                w("in.txt"),
                op(Operator::RedirectOut),
                w("out.txt"),
                op(Operator::RedirectErr),
                w("err.txt"),
            ]
        );
    }

    #[test]
    fn tilde_word_passes_through_unexpanded() {
        // Expansion is not the scanner's concern.
        assert_eq!(toks("ls ~/docs"), vec![w("ls"), w("~/docs")]);
    }
}
