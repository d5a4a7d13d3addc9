//! Per-backend command tables and the resolver.
//!
//! A [`CommandTable`] is an ordered list of descriptors built once per
//! backend and passed explicitly to whoever needs it. Resolution walks the
//! table in declared order and the first descriptor whose name tokens lead
//! `argv` wins. Construction rejects any table in which an earlier name is a
//! token-prefix of a later one, so the compound-before-prefix ordering never
//! depends on author discipline alone.

use kvbridge_core::{Error, Result};
use tracing::debug;

use crate::info::CommandInfo;
use crate::tokenize::tokenize;

/// A command's metadata plus the backend's handler for it.
///
/// Tables that only validate text (translators) use `H = ()`.
#[derive(Debug, Clone)]
pub struct CommandDescriptor<H = ()> {
    info: CommandInfo,
    handler: H,
}

impl<H> CommandDescriptor<H> {
    /// Bind a handler to a command
    pub fn new(info: CommandInfo, handler: H) -> Self {
        Self { info, handler }
    }

    /// Command metadata
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    /// The bound handler
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl From<CommandInfo> for CommandDescriptor<()> {
    fn from(info: CommandInfo) -> Self {
        Self::new(info, ())
    }
}

/// Ordered, immutable catalogue of one backend's commands.
#[derive(Debug, Clone)]
pub struct CommandTable<H = ()> {
    descriptors: Vec<CommandDescriptor<H>>,
}

impl<H> CommandTable<H> {
    /// Build a table, rejecting empty names, duplicates and unreachable entries.
    pub fn new(descriptors: Vec<CommandDescriptor<H>>) -> Result<Self> {
        for (j, later) in descriptors.iter().enumerate() {
            if later.info.name_tokens().next().is_none() {
                return Err(Error::invalid_argument(format!(
                    "command #{} has an empty name",
                    j
                )));
            }
            if let Some(earlier) = descriptors[..j].iter().find(|d| d.info.shadows(&later.info)) {
                return Err(Error::invalid_argument(format!(
                    "command '{}' is unreachable: '{}' is declared before it",
                    later.info.name(),
                    earlier.info.name()
                )));
            }
        }
        Ok(Self { descriptors })
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True when the table has no commands
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, CommandDescriptor<H>> {
        self.descriptors.iter()
    }

    /// Look up a descriptor by its exact name.
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor<H>> {
        self.descriptors.iter().find(|d| d.info.is_equal_name(name))
    }

    /// Usage text for a command, if the table knows it.
    pub fn help(&self, name: &str) -> Option<String> {
        self.get(name).map(|d| d.info.usage())
    }

    /// First descriptor (in table order) whose name leads `argv`, with the
    /// offset where its arguments begin. No argument validation.
    pub fn find<S: AsRef<str>>(&self, argv: &[S]) -> Result<(&CommandDescriptor<H>, usize)> {
        self.descriptors
            .iter()
            .find_map(|d| d.info.match_prefix(argv).map(|off| (d, off)))
            .ok_or_else(|| Error::UnknownCommand {
                input: argv
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<&str>>()
                    .join(" "),
            })
    }

    /// Find the matching descriptor and validate its arguments.
    pub fn resolve<S: AsRef<str>>(&self, argv: &[S]) -> Result<(&CommandDescriptor<H>, usize)> {
        let (descriptor, off) = self.find(argv)?;
        descriptor.info.test_args(&argv[off..])?;
        debug!(
            target: "kvbridge::command",
            command = descriptor.info.name(),
            offset = off,
            "Resolved command"
        );
        Ok((descriptor, off))
    }

    /// Transform every handler, keeping metadata and order.
    pub fn map_handlers<F, G>(&self, mut f: F) -> CommandTable<G>
    where
        F: FnMut(&H) -> G,
    {
        CommandTable {
            descriptors: self
                .descriptors
                .iter()
                .map(|d| CommandDescriptor::new(d.info.clone(), f(&d.handler)))
                .collect(),
        }
    }
}

impl CommandTable<()> {
    /// Build a handler-less table straight from metadata.
    pub fn from_infos(infos: Vec<CommandInfo>) -> Result<Self> {
        Self::new(infos.into_iter().map(CommandDescriptor::from).collect())
    }
}

/// Handler-agnostic view of a command table.
///
/// Translators expose their table through this trait so line validation
/// works without knowing the backend's handler type.
pub trait CommandIndex: Send + Sync {
    /// Resolve and validate `argv`, returning the matched metadata and offset.
    fn resolve_info(&self, argv: &[String]) -> Result<(&CommandInfo, usize)>;

    /// Metadata of every command in declared order.
    fn infos(&self) -> Vec<&CommandInfo>;

    /// Tokenize, resolve and validate one line without executing it.
    ///
    /// A line with no tokens is a [`Error::Parse`], as it is for execution.
    fn test_command_line(&self, line: &str) -> Result<()> {
        let argv = tokenize(line)?;
        if argv.is_empty() {
            return Err(Error::parse("empty command line"));
        }
        self.resolve_info(&argv).map(|_| ())
    }
}

impl<H: Send + Sync> CommandIndex for CommandTable<H> {
    fn resolve_info(&self, argv: &[String]) -> Result<(&CommandInfo, usize)> {
        self.resolve(argv).map(|(d, off)| (d.info(), off))
    }

    fn infos(&self) -> Vec<&CommandInfo> {
        self.descriptors.iter().map(CommandDescriptor::info).collect()
    }
}
