//! Shell-style tokenizing of command lines and configuration strings.
//!
//! Splitting follows POSIX shell word rules via `shlex`: whitespace separates
//! tokens, single and double quotes group, backslash escapes. Note that an
//! unquoted `#` at the start of a token begins a comment, so such tokens must
//! be quoted (`'#tag'`); [`join`] does this automatically.

use std::borrow::Cow;

use kvbridge_core::{Error, Result};

/// Split one line into argument tokens.
///
/// Empty or whitespace-only input yields an empty vector. An unterminated
/// quote or a trailing backslash is a [`Error::Parse`].
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    shlex::split(line)
        .ok_or_else(|| Error::parse(format!("unbalanced quotes or dangling escape in '{}'", line)))
}

/// Quote a single token so that [`tokenize`] yields it back unchanged.
pub fn quote(token: &str) -> Result<Cow<'_, str>> {
    shlex::try_quote(token)
        .map_err(|e| Error::invalid_argument(format!("cannot quote '{}': {}", token.escape_default(), e)))
}

/// Join tokens into one line that [`tokenize`] splits back into the same tokens.
pub fn join<'a, I>(tokens: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut line = String::new();
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&quote(token)?);
    }
    Ok(line)
}

/// Split a newline-separated script into individual command lines.
///
/// Each line is trimmed; blank lines and `#` comment lines are dropped.
/// Text that is empty or only whitespace is rejected.
pub fn parse_commands(text: &str) -> Result<Vec<String>> {
    if text.trim().is_empty() {
        return Err(Error::parse("empty command line"));
    }

    Ok(text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_plain() {
        assert_eq!(tokenize("SET foo bar").unwrap(), vec!["SET", "foo", "bar"]);
    }

    #[test]
    fn test_tokenize_quotes_and_escapes() {
        assert_eq!(
            tokenize(r#"SET "my key" 'a b' c\ d"#).unwrap(),
            vec!["SET", "my key", "a b", "c d"]
        );
    }

    #[test]
    fn test_tokenize_empty_is_not_error() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \t ").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        assert!(matches!(tokenize("GET \"abc"), Err(Error::Parse { .. })));
        assert!(matches!(tokenize("GET 'abc"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_tokenize_dangling_escape() {
        assert!(matches!(tokenize("GET abc\\"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_join_then_tokenize() {
        let tokens = ["-d", "\n", "-ns", ":", "-f", "/tmp/my db", "#tag", ""];
        let line = join(tokens.iter().copied()).unwrap();
        assert_eq!(tokenize(&line).unwrap(), tokens);
    }

    #[test]
    fn test_quote_rejects_nul() {
        assert!(matches!(quote("a\0b"), Err(Error::InvalidArgument { .. })));
    }

    #[test]
    fn test_parse_commands() {
        let cmds = parse_commands("GET a\n\n  SET b c  \n# note\nDEL a").unwrap();
        assert_eq!(cmds, vec!["GET a", "SET b c", "DEL a"]);
    }

    #[test]
    fn test_parse_commands_rejects_empty() {
        assert!(matches!(parse_commands(""), Err(Error::Parse { .. })));
        assert!(matches!(parse_commands("\n \n"), Err(Error::Parse { .. })));
    }
}
