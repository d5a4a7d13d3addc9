//! The key-operation capability contract.
//!
//! A backend implements [`KeyTranslator`]: it declares its capability set,
//! exposes its command table and overrides the `*_impl` hooks for the
//! operations it supports. Callers go through [`KeyOperations`], which every
//! translator gets for free. It checks the capability set, validates input,
//! then delegates to the hook. Wire lines are shell-quoted so they tokenize
//! back into the same arguments.

use kvbridge_core::{Error, NDbKValue, NDbPSChannel, NKey, Result, Ttl, ValueType};
use tracing::debug;

use crate::capability::{Capability, CapabilitySet};
use crate::table::CommandIndex;
use crate::tokenize::{join, tokenize};

/// Backend-specific translation of the abstract key operations.
///
/// Unsupported hooks keep their default body, which returns
/// [`Error::NotSupported`]. The hooks are only reached through
/// [`KeyOperations`], after the capability and input checks.
pub trait KeyTranslator: Send + Sync {
    /// Backend name used in errors and logs
    fn backend_name(&self) -> &'static str;

    /// Operations this backend supports
    fn capabilities(&self) -> CapabilitySet;

    /// The backend's command table, for line validation
    fn commands(&self) -> &dyn CommandIndex;

    /// Render the command that stores `key`; the key name is non-empty.
    fn create_key_impl(&self, _key: &NDbKValue) -> Result<String> {
        Err(self.unsupported(Capability::CreateKey))
    }

    /// Render the read command for a value of `value_type`.
    fn load_key_impl(&self, _key: &NKey, _value_type: ValueType) -> Result<String> {
        Err(self.unsupported(Capability::LoadKey))
    }

    /// Render the command that removes `key`.
    fn delete_key_impl(&self, _key: &NKey) -> Result<String> {
        Err(self.unsupported(Capability::DeleteKey))
    }

    /// Render the rename command; `new_name` is non-empty.
    fn rename_key_impl(&self, _key: &NKey, _new_name: &str) -> Result<String> {
        Err(self.unsupported(Capability::RenameKey))
    }

    /// Render the TTL change. `ttl` is never [`Ttl::NotExists`] and its
    /// seconds fit in an `i64`.
    fn change_key_ttl_impl(&self, _key: &NKey, _ttl: Ttl) -> Result<String> {
        Err(self.unsupported(Capability::ChangeKeyTTL))
    }

    /// Render the command that reads the key's TTL.
    fn load_key_ttl_impl(&self, _key: &NKey) -> Result<String> {
        Err(self.unsupported(Capability::LoadKeyTTL))
    }

    /// Render a publish of a non-empty `message`.
    fn publish_impl(&self, _channel: &NDbPSChannel, _message: &str) -> Result<String> {
        Err(self.unsupported(Capability::Publish))
    }

    /// Render a subscription to `channel`.
    fn subscribe_impl(&self, _channel: &NDbPSChannel) -> Result<String> {
        Err(self.unsupported(Capability::Subscribe))
    }

    /// The `NotSupported` error for `capability` on this backend.
    fn unsupported(&self, capability: Capability) -> Error {
        Error::not_supported(capability.name(), self.backend_name())
    }
}

/// Caller-facing key operations, available on every [`KeyTranslator`].
pub trait KeyOperations: KeyTranslator {
    /// Whether the backend declares `capability`.
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Command that stores `key` with its value.
    fn create_key_command(&self, key: &NDbKValue) -> Result<String> {
        require(self, Capability::CreateKey)?;
        require_key(key.key())?;
        self.create_key_impl(key)
    }

    /// Command that loads `key`, chosen by the stored value type.
    fn load_key_command(&self, key: &NKey, value_type: ValueType) -> Result<String> {
        require(self, Capability::LoadKey)?;
        require_key(key)?;
        self.load_key_impl(key, value_type)
    }

    /// Command that deletes `key`.
    fn delete_key_command(&self, key: &NKey) -> Result<String> {
        require(self, Capability::DeleteKey)?;
        require_key(key)?;
        self.delete_key_impl(key)
    }

    /// Command that renames `key` to `new_name`.
    fn rename_key_command(&self, key: &NKey, new_name: &str) -> Result<String> {
        require(self, Capability::RenameKey)?;
        require_key(key)?;
        if new_name.is_empty() {
            return Err(Error::invalid_argument("new key name is empty"));
        }
        self.rename_key_impl(key, new_name)
    }

    /// Command that sets (or with [`Ttl::Persistent`], clears) the key's TTL.
    ///
    /// Seconds beyond `i64::MAX` are an [`Error::InvalidArgument`]; no
    /// backend accepts them.
    fn change_key_ttl_command(&self, key: &NKey, ttl: Ttl) -> Result<String> {
        require(self, Capability::ChangeKeyTTL)?;
        require_key(key)?;
        match ttl {
            Ttl::NotExists => return Err(Error::invalid_argument("a missing key is not a valid ttl")),
            Ttl::Seconds(secs) if i64::try_from(secs).is_err() => {
                return Err(Error::invalid_argument(format!("ttl of {} seconds is out of range", secs)));
            }
            _ => {}
        }
        self.change_key_ttl_impl(key, ttl)
    }

    /// Command that reads the TTL of `key`.
    fn load_key_ttl_command(&self, key: &NKey) -> Result<String> {
        require(self, Capability::LoadKeyTTL)?;
        require_key(key)?;
        self.load_key_ttl_impl(key)
    }

    /// Command that publishes `message` on `channel`.
    fn publish_command(&self, channel: &NDbPSChannel, message: &str) -> Result<String> {
        require(self, Capability::Publish)?;
        require_channel(channel)?;
        if message.is_empty() {
            return Err(Error::invalid_argument("message is empty"));
        }
        self.publish_impl(channel, message)
    }

    /// Command that subscribes to `channel`.
    fn subscribe_command(&self, channel: &NDbPSChannel) -> Result<String> {
        require(self, Capability::Subscribe)?;
        require_channel(channel)?;
        self.subscribe_impl(channel)
    }

    /// `SELECT <name>`; the template is the same for every backend.
    fn select_db_command(&self, name: &str) -> Result<String> {
        require(self, Capability::SelectDB)?;
        if name.is_empty() {
            return Err(Error::invalid_argument("database name is empty"));
        }
        join(["SELECT", name])
    }

    /// `FLUSHDB`; the template is the same for every backend.
    fn flush_db_command(&self) -> Result<String> {
        require(self, Capability::FlushDB)?;
        Ok("FLUSHDB".to_string())
    }

    /// Tokenize and validate a line against the backend's table.
    fn test_command_line(&self, line: &str) -> Result<()> {
        self.commands().test_command_line(line)
    }

    /// The key a read-only load command refers to, or `None` for any other
    /// line, including lines that fail to resolve.
    fn is_load_key_command(&self, line: &str) -> Option<String> {
        let resolved = tokenize(line).and_then(|argv| {
            let (info, off) = self.commands().resolve_info(&argv)?;
            Ok(if info.is_load_key() { argv.get(off).cloned() } else { None })
        });
        resolved.unwrap_or_else(|e| {
            debug!(
                target: "kvbridge::command",
                backend = self.backend_name(),
                error = %e,
                "Not a load command"
            );
            None
        })
    }
}

impl<T: KeyTranslator + ?Sized> KeyOperations for T {}

fn require<T: KeyTranslator + ?Sized>(translator: &T, capability: Capability) -> Result<()> {
    if translator.capabilities().contains(capability) {
        return Ok(());
    }
    debug!(
        target: "kvbridge::command",
        backend = translator.backend_name(),
        operation = capability.name(),
        "Operation not supported"
    );
    Err(translator.unsupported(capability))
}

fn require_key(key: &NKey) -> Result<()> {
    if key.name().is_empty() {
        return Err(Error::invalid_argument("key name is empty"));
    }
    Ok(())
}

fn require_channel(channel: &NDbPSChannel) -> Result<()> {
    if channel.name().is_empty() {
        return Err(Error::invalid_argument("channel name is empty"));
    }
    Ok(())
}
