//! Memcached key translation.
//!
//! Memcached has flat string values, no rename and no way to read a key's
//! TTL back; `TOUCH` is the only TTL operation.

use kvbridge_command::{ArgShape, CapabilitySet, CommandIndex, CommandInfo, CommandTable, KeyTranslator};
use kvbridge_core::{Error, NDbKValue, NKey, Result, Ttl, ValueType};

use crate::backend::Backend;
use crate::render::line;

fn commands() -> Vec<CommandInfo> {
    use ArgShape::{Any, UInteger};
    vec![
        CommandInfo::new("ADD", 4, Some(4))
            .params("<key> <flags> <exptime> <value>")
            .shapes(&[Any, UInteger, UInteger]),
        CommandInfo::new("APPEND", 2, Some(2)).params("<key> <value>"),
        CommandInfo::new("DECR", 2, Some(2)).params("<key> <value>").shapes(&[Any, UInteger]),
        CommandInfo::new("DELETE", 1, Some(1)).params("<key>").summary("Delete key from the server"),
        CommandInfo::new("FLUSHDB", 0, Some(1)).params("[time]").shapes(&[UInteger]),
        CommandInfo::new("GET", 1, Some(1))
            .params("<key>")
            .summary("Returns the value associated with key")
            .load_key(),
        CommandInfo::new("INCR", 2, Some(2)).params("<key> <value>").shapes(&[Any, UInteger]),
        CommandInfo::new("PREPEND", 2, Some(2)).params("<key> <value>"),
        CommandInfo::new("REPLACE", 4, Some(4))
            .params("<key> <flags> <exptime> <value>")
            .shapes(&[Any, UInteger, UInteger]),
        CommandInfo::new("SET", 4, Some(4))
            .params("<key> <flags> <exptime> <value>")
            .summary("Set the string value of a key")
            .shapes(&[Any, UInteger, UInteger]),
        CommandInfo::new("STATS", 0, Some(1)).params("[args]"),
        CommandInfo::new("TOUCH", 2, Some(2))
            .params("<key> <exptime>")
            .summary("Update the expiration time of a key")
            .shapes(&[Any, UInteger]),
        CommandInfo::new("VERSION", 0, Some(0)),
    ]
}

/// Renders key operations as Memcached text-protocol commands.
pub struct MemcachedTranslator {
    table: CommandTable,
}

impl MemcachedTranslator {
    /// Translator over the Memcached command table
    pub fn new() -> Result<Self> {
        Ok(Self {
            table: CommandTable::from_infos(commands())?,
        })
    }
}

impl KeyTranslator for MemcachedTranslator {
    fn backend_name(&self) -> &'static str {
        Backend::Memcached.name()
    }

    fn capabilities(&self) -> CapabilitySet {
        Backend::Memcached.capabilities()
    }

    fn commands(&self) -> &dyn CommandIndex {
        &self.table
    }

    fn create_key_impl(&self, key: &NDbKValue) -> Result<String> {
        if key.value().is_null() {
            return Err(Error::invalid_argument("cannot store a null value"));
        }
        line(&["SET", key.key_string(), "0", "0", &key.value_string()])
    }

    fn load_key_impl(&self, key: &NKey, _value_type: ValueType) -> Result<String> {
        line(&["GET", key.name()])
    }

    fn delete_key_impl(&self, key: &NKey) -> Result<String> {
        line(&["DELETE", key.name()])
    }

    /// An exptime of zero makes the key persistent.
    fn change_key_ttl_impl(&self, key: &NKey, ttl: Ttl) -> Result<String> {
        let exptime = match ttl {
            Ttl::Seconds(secs) => secs,
            _ => 0,
        };
        line(&["TOUCH", key.name(), &exptime.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbridge_command::{Capability, KeyOperations};
    use kvbridge_core::Value;

    #[test]
    fn test_create_and_touch() {
        let t = MemcachedTranslator::new().unwrap();
        let create = t.create_key_command(&NDbKValue::new("k", Value::from("v"))).unwrap();
        assert_eq!(create, "SET k 0 0 v");
        assert!(t.test_command_line(&create).is_ok());

        let touch = t.change_key_ttl_command(&NKey::new("k"), Ttl::Seconds(60)).unwrap();
        assert_eq!(touch, "TOUCH k 60");
        assert_eq!(t.change_key_ttl_command(&NKey::new("k"), Ttl::Persistent).unwrap(), "TOUCH k 0");
    }

    #[test]
    fn test_unsupported_operations() {
        let t = MemcachedTranslator::new().unwrap();
        let k = NKey::new("k");
        assert!(t.rename_key_command(&k, "j").unwrap_err().is_not_supported());
        assert!(t.load_key_ttl_command(&k).unwrap_err().is_not_supported());
        assert!(t.select_db_command("1").unwrap_err().is_not_supported());
        assert!(!t.supports(Capability::Subscribe));
    }

    #[test]
    fn test_flush_template_resolves() {
        let t = MemcachedTranslator::new().unwrap();
        assert!(t.test_command_line(&t.flush_db_command().unwrap()).is_ok());
    }
}
