//! Tilde expansion against an environment snapshot.

use crate::env::EnvSnapshot;

/// Expand a leading home-directory shorthand in a token.
///
/// `~` alone becomes the snapshot's `HOME` value and `~/rest` becomes
/// `HOME` plus the remainder verbatim. A token starting with a quote
/// character is returned unchanged (quoting suppresses expansion), as
/// is anything else — `~user` is not resolved. A missing `HOME` key
/// expands to the empty string rather than erroring.
///
/// # Panics
///
/// On an empty token. The scanner never emits one; reaching here with
/// an empty string is a programming error, not bad user input.
pub fn expand(token: &str, env: &EnvSnapshot) -> String {
    assert!(!token.is_empty(), "empty token reached the path expander");

    if token.starts_with('\'') || token.starts_with('"') {
        return token.to_string();
    }

    shellexpand::tilde_with_context(token, || Some(env.home().unwrap_or(""))).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> EnvSnapshot {
        EnvSnapshot::with_home("/home/gopher")
    }

    #[test]
    fn bare_tilde_becomes_home() {
        assert_eq!(expand("~", &home()), "/home/gopher");
    }

    #[test]
    fn tilde_slash_prefix_is_replaced() {
        assert_eq!(expand("~/docs", &home()), "/home/gopher/docs");
        assert_eq!(expand("~/a/b.txt", &home()), "/home/gopher/a/b.txt");
    }

    #[test]
    fn quoted_tokens_are_untouched() {
        assert_eq!(expand("\"~/docs\"", &home()), "\"~/docs\"");
        assert_eq!(expand("'~'", &home()), "'~'");
    }

    #[test]
    fn tilde_user_is_untouched() {
        assert_eq!(expand("~gopher/docs", &home()), "~gopher/docs");
    }

    #[test]
    fn plain_words_are_untouched() {
        assert_eq!(expand("docs/~", &home()), "docs/~");
        assert_eq!(expand("wc", &home()), "wc");
    }

    #[test]
    fn missing_home_expands_to_empty() {
        assert_eq!(expand("~", &EnvSnapshot::empty()), "");
        assert_eq!(expand("~/docs", &EnvSnapshot::empty()), "/docs");
    }

    #[test]
    #[should_panic(expected = "empty token")]
    fn empty_token_is_a_contract_violation() {
        expand("", &home());
    }
}
