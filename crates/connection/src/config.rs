//! Connection configs and their `-flag value` token syntax.
//!
//! Every config parses from, and serializes back to, the same shell-style
//! argument string, e.g. `-d '\n' -ns : -h localhost -p 6379`. Parsing is
//! lenient: it stops at the first non-flag token (the command name) and
//! degrades an unknown or malformed flag to a warning, returning whatever was
//! accumulated up to that point.

use std::fmt;
use std::str::FromStr;

use kvbridge_command::{join, tokenize};
use kvbridge_core::{Error, Result, DEFAULT_DELIMITER};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default namespace separator
pub const DEFAULT_NS_SEPARATOR: &str = ":";

/// Default remote host
pub const DEFAULT_HOST: &str = "localhost";

/// A remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAndPort {
    pub host: String,
    pub port: u16,
}

impl HostAndPort {
    /// Address of `host:port`
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `localhost:<port>`
    pub fn local_host(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }
}

impl fmt::Display for HostAndPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for HostAndPort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::invalid_argument(format!("expected host:port, got '{}'", s)))?;
        let port = port
            .parse()
            .map_err(|_| Error::invalid_argument(format!("invalid port in '{}'", s)))?;
        Ok(Self::new(host, port))
    }
}

/// A config with a flag syntax.
///
/// Implementors handle their own flags in [`apply_flag`](Self::apply_flag)
/// and delegate the rest to the config they extend.
pub trait ConnectionConfig: Default {
    /// Apply `flag`, whose following token (if any) is `value`.
    ///
    /// Returns the number of tokens consumed, `Ok(None)` for a flag this
    /// config does not know, or an error for a missing or malformed value.
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>>;

    /// Serialize to flag/value tokens.
    fn args(&self) -> Vec<String>;

    /// Parse flag tokens on top of the defaults.
    fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = Self::default();
        let mut i = 0;
        while let Some(flag) = args.get(i).map(AsRef::as_ref) {
            if !flag.starts_with('-') {
                break;
            }
            let value = args.get(i + 1).map(AsRef::as_ref);
            match config.apply_flag(flag, value) {
                Ok(Some(consumed)) => i += consumed,
                Ok(None) => {
                    warn!(target: "kvbridge::config", flag, "Unrecognized option");
                    break;
                }
                Err(e) => {
                    warn!(target: "kvbridge::config", flag, error = %e, "Bad option");
                    break;
                }
            }
        }
        config
    }

    /// Parse a shell-style argument line. A line that does not tokenize
    /// yields the defaults.
    fn from_line(line: &str) -> Self {
        match tokenize(line) {
            Ok(args) => Self::from_args(&args),
            Err(e) => {
                warn!(target: "kvbridge::config", error = %e, "Unparsable config line, using defaults");
                Self::default()
            }
        }
    }

    /// Serialize to a line that [`from_line`](Self::from_line) reads back.
    fn to_line(&self) -> Result<String> {
        let args = self.args();
        join(args.iter().map(String::as_str))
    }
}

/// The token following `flag`, or an error when there is none.
pub fn flag_value<'a>(flag: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| Error::invalid_argument(format!("missing value for {}", flag)))
}

/// The token following `flag`, parsed as a number.
pub fn flag_number<T: FromStr>(flag: &str, value: Option<&str>) -> Result<T> {
    let raw = flag_value(flag, value)?;
    raw.parse()
        .map_err(|_| Error::invalid_argument(format!("invalid number '{}' for {}", raw, flag)))
}

/// Settings shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Delimiter used when flattening nested values for display
    pub delimiter: String,
    /// Namespace separator inside key names
    pub ns_separator: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            ns_separator: DEFAULT_NS_SEPARATOR.to_string(),
        }
    }
}

impl ConnectionConfig for BaseConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-d" => self.delimiter = flag_value(flag, value)?.to_string(),
            "-ns" => self.ns_separator = flag_value(flag, value)?.to_string(),
            _ => return Ok(None),
        }
        Ok(Some(2))
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-d".to_string(),
            self.delimiter.clone(),
            "-ns".to_string(),
            self.ns_separator.clone(),
        ]
    }
}

/// Settings for embedded stores addressed by a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    /// Database file or directory
    pub db_path: String,
}

impl LocalConfig {
    /// Settings for a store at `db_path`
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::default(),
            db_path: db_path.into(),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl ConnectionConfig for LocalConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-f" => {
                self.db_path = flag_value(flag, value)?.to_string();
                Ok(Some(2))
            }
            _ => self.base.apply_flag(flag, value),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.base.args();
        args.push("-f".to_string());
        args.push(self.db_path.clone());
        args
    }
}

/// Settings for network servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    pub host: HostAndPort,
}

impl RemoteConfig {
    /// Settings dialing `host`
    pub fn new(host: HostAndPort) -> Self {
        Self {
            base: BaseConfig::default(),
            host,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(HostAndPort::local_host(0))
    }
}

impl ConnectionConfig for RemoteConfig {
    fn apply_flag(&mut self, flag: &str, value: Option<&str>) -> Result<Option<usize>> {
        match flag {
            "-h" => self.host.host = flag_value(flag, value)?.to_string(),
            "-p" => self.host.port = flag_number(flag, value)?,
            _ => return self.base.apply_flag(flag, value),
        }
        Ok(Some(2))
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.base.args();
        args.push("-h".to_string());
        args.push(self.host.host.clone());
        args.push("-p".to_string());
        args.push(self.host.port.to_string());
        args
    }
}
