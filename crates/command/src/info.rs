//! Command metadata: name, arity bounds and per-position argument shapes.

use std::fmt;

use kvbridge_core::{Error, Result};

/// Shape check applied to one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Any token
    Any,
    /// Signed 64-bit integer
    Integer,
    /// Unsigned 64-bit integer
    UInteger,
    /// Floating point number
    Double,
}

impl ArgShape {
    fn accepts(self, arg: &str) -> bool {
        match self {
            ArgShape::Any => true,
            ArgShape::Integer => arg.parse::<i64>().is_ok(),
            ArgShape::UInteger => arg.parse::<u64>().is_ok(),
            ArgShape::Double => arg.parse::<f64>().is_ok(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ArgShape::Any => "any",
            ArgShape::Integer => "integer",
            ArgShape::UInteger => "unsigned integer",
            ArgShape::Double => "number",
        }
    }
}

/// Static description of one command.
///
/// The name may consist of several tokens (`"MULTI SET"`); arguments start
/// right after the last name token.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInfo {
    name: String,
    params: String,
    summary: String,
    since: String,
    min_args: usize,
    max_args: Option<usize>,
    shapes: Vec<ArgShape>,
    paired_from: Option<usize>,
    load_key: bool,
}

impl CommandInfo {
    /// A command accepting between `min_args` and `max_args` arguments;
    /// `None` means unbounded.
    pub fn new(name: impl Into<String>, min_args: usize, max_args: Option<usize>) -> Self {
        Self {
            name: name.into(),
            params: String::new(),
            summary: String::new(),
            since: String::new(),
            min_args,
            max_args,
            shapes: Vec::new(),
            paired_from: None,
            load_key: false,
        }
    }

    /// Parameter synopsis shown in help, e.g. `"<key> <value>"`
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }

    /// One-line description
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Backend version the command first appeared in
    pub fn since(mut self, since: impl Into<String>) -> Self {
        self.since = since.into();
        self
    }

    /// Shape checks by argument position; positions past the list are unchecked.
    pub fn shapes(mut self, shapes: &[ArgShape]) -> Self {
        self.shapes = shapes.to_vec();
        self
    }

    /// Arguments from position `start` on must come in pairs.
    pub fn paired_from(mut self, start: usize) -> Self {
        self.paired_from = Some(start);
        self
    }

    /// Tag as a read-only "load key" command; its first argument is the key.
    pub fn load_key(mut self) -> Self {
        self.load_key = true;
        self
    }

    /// Full command name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name split into tokens
    pub fn name_tokens(&self) -> impl Iterator<Item = &str> {
        self.name.split_whitespace()
    }

    /// Parameter synopsis
    pub fn param_text(&self) -> &str {
        &self.params
    }

    /// One-line description
    pub fn summary_text(&self) -> &str {
        &self.summary
    }

    /// Minimum argument count
    pub fn min_args(&self) -> usize {
        self.min_args
    }

    /// Maximum argument count, `None` when unbounded
    pub fn max_args(&self) -> Option<usize> {
        self.max_args
    }

    /// Whether this is a read-only key load
    pub fn is_load_key(&self) -> bool {
        self.load_key
    }

    /// Case-sensitive comparison against the full name.
    pub fn is_equal_name(&self, name: &str) -> bool {
        self.name_tokens().eq(name.split_whitespace())
    }

    /// If the name tokens are a prefix of `argv`, the offset where arguments begin.
    pub fn match_prefix<S: AsRef<str>>(&self, argv: &[S]) -> Option<usize> {
        let mut off = 0;
        for token in self.name_tokens() {
            match argv.get(off) {
                Some(arg) if arg.as_ref() == token => off += 1,
                _ => return None,
            }
        }
        Some(off)
    }

    /// True when every name token of `self` leads the name of `other`.
    pub(crate) fn shadows(&self, other: &CommandInfo) -> bool {
        let theirs: Vec<&str> = other.name_tokens().collect();
        self.match_prefix(theirs.as_slice()).is_some()
    }

    /// Validate the arguments that follow the name.
    ///
    /// Arity is checked first, then pairing, then per-position shapes.
    pub fn test_args<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let argc = args.len();
        let too_many = self.max_args.is_some_and(|max| argc > max);
        if argc < self.min_args || too_many {
            return Err(Error::ArityMismatch {
                command: self.name.clone(),
                expected: self.arity_text(),
                actual: argc,
            });
        }

        if let Some(start) = self.paired_from {
            if argc < start || (argc - start) % 2 != 0 {
                return Err(Error::ArityMismatch {
                    command: self.name.clone(),
                    expected: format!("{} followed by pairs", start),
                    actual: argc,
                });
            }
        }

        for (pos, (shape, arg)) in self.shapes.iter().zip(args).enumerate() {
            if !shape.accepts(arg.as_ref()) {
                return Err(Error::InvalidArgumentShape {
                    command: self.name.clone(),
                    position: pos + 1,
                    expected: shape.name().to_string(),
                    actual: arg.as_ref().to_string(),
                });
            }
        }
        Ok(())
    }

    fn arity_text(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }

    /// Usage text: name, parameters, summary and version.
    pub fn usage(&self) -> String {
        let mut text = self.name.clone();
        if !self.params.is_empty() {
            text.push(' ');
            text.push_str(&self.params);
        }
        if !self.summary.is_empty() {
            text.push_str("\n  ");
            text.push_str(&self.summary);
        }
        if !self.since.is_empty() {
            text.push_str("\n  since: ");
            text.push_str(&self.since);
        }
        text
    }
}

impl fmt::Display for CommandInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_prefix_compound() {
        let info = CommandInfo::new("MULTI SET", 0, None);
        assert_eq!(info.match_prefix(&["MULTI", "SET", "k"]), Some(2));
        assert_eq!(info.match_prefix(&["MULTI"]), None);
        assert_eq!(info.match_prefix(&["multi", "set"]), None);
    }

    #[test]
    fn test_arity_bounds() {
        let info = CommandInfo::new("SET", 2, Some(2));
        assert!(info.test_args(&["k", "v"]).is_ok());
        assert!(matches!(info.test_args(&["k"]), Err(Error::ArityMismatch { actual: 1, .. })));
        assert!(matches!(info.test_args(&["k", "v", "x"]), Err(Error::ArityMismatch { actual: 3, .. })));
    }

    #[test]
    fn test_unbounded() {
        let info = CommandInfo::new("DEL", 1, None);
        assert!(info.test_args(&["a", "b", "c", "d"]).is_ok());
        assert!(info.test_args::<&str>(&[]).is_err());
    }

    #[test]
    fn test_pairs() {
        let info = CommandInfo::new("multi_hset", 3, None).paired_from(1);
        assert!(info.test_args(&["h", "f", "v"]).is_ok());
        assert!(info.test_args(&["h", "f", "v", "g"]).is_err());
    }

    #[test]
    fn test_shapes_report_position() {
        let info = CommandInfo::new("incr", 2, Some(2)).shapes(&[ArgShape::Any, ArgShape::Integer]);
        assert!(info.test_args(&["k", "-3"]).is_ok());
        match info.test_args(&["k", "three"]) {
            Err(Error::InvalidArgumentShape { position, actual, .. }) => {
                assert_eq!(position, 2);
                assert_eq!(actual, "three");
            }
            other => panic!("Expected InvalidArgumentShape, got {:?}", other),
        }
    }

    #[test]
    fn test_shadows() {
        let short = CommandInfo::new("MULTI", 0, None);
        let long = CommandInfo::new("MULTI SET", 0, None);
        assert!(short.shadows(&long));
        assert!(!long.shadows(&short));
        assert!(short.shadows(&short.clone()));
    }

    #[test]
    fn test_usage() {
        let info = CommandInfo::new("get", 1, Some(1))
            .params("<key>")
            .summary("Get the value related to the specified key")
            .since("1.9.2");
        let usage = info.usage();
        assert!(usage.starts_with("get <key>"));
        assert!(usage.contains("since: 1.9.2"));
    }
}
