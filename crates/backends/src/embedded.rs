//! Key translation for embedded single-file stores.
//!
//! LevelDB, RocksDB, LMDB, UnQLite and UpscaleDB all expose the same flat
//! key/value command set. None of them has TTLs or pub/sub; only the stores
//! with several databases per environment accept `SELECT`.

use kvbridge_command::{
    ArgShape, Capability, CapabilitySet, CommandIndex, CommandInfo, CommandTable, KeyTranslator,
};
use kvbridge_core::{Error, NDbKValue, NKey, Result, ValueType};

use crate::backend::Backend;
use crate::render::line;

fn commands(backend: Backend) -> Vec<CommandInfo> {
    use ArgShape::{Any, UInteger};
    let mut infos = vec![
        CommandInfo::new("DBKCOUNT", 0, Some(0)).summary("Return the number of keys in the selected database"),
        CommandInfo::new("DEL", 1, None).params("<key> [key ...]").summary("Delete key"),
        CommandInfo::new("FLUSHDB", 0, Some(0)).summary("Remove all keys from the current database"),
        CommandInfo::new("GET", 1, Some(1))
            .params("<key>")
            .summary("Get the value of a key")
            .load_key(),
        CommandInfo::new("INFO", 0, Some(1)).params("[section]"),
        CommandInfo::new("KEYS", 3, Some(3))
            .params("<key_start> <key_end> <limit>")
            .summary("Find all keys between the given bounds")
            .shapes(&[Any, Any, UInteger]),
        CommandInfo::new("RENAME", 2, Some(2)).params("<key> <newkey>").summary("Rename a key"),
        CommandInfo::new("SCAN", 1, Some(5)).params("<cursor> [MATCH pattern] [COUNT count]"),
        CommandInfo::new("SET", 2, Some(2)).params("<key> <value>").summary("Set the value of a key"),
    ];
    if backend.supports(Capability::SelectDB) {
        infos.push(CommandInfo::new("SELECT", 1, Some(1)).params("<name>").summary("Change the selected database"));
    }
    infos
}

/// Translator shared by the embedded stores.
pub struct EmbeddedTranslator {
    backend: Backend,
    table: CommandTable,
}

impl EmbeddedTranslator {
    /// Fails for a backend that is not an embedded store.
    pub fn new(backend: Backend) -> Result<Self> {
        if backend.is_remote() {
            return Err(Error::invalid_argument(format!("{} is not an embedded store", backend)));
        }
        Ok(Self {
            backend,
            table: CommandTable::from_infos(commands(backend))?,
        })
    }

    /// The embedded store this translator renders for
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl KeyTranslator for EmbeddedTranslator {
    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.backend.capabilities()
    }

    fn commands(&self) -> &dyn CommandIndex {
        &self.table
    }

    /// Values are stored flattened; containers join their elements with spaces.
    fn create_key_impl(&self, key: &NDbKValue) -> Result<String> {
        if key.value().is_null() {
            return Err(Error::invalid_argument("cannot store a null value"));
        }
        line(&["SET", key.key_string(), &key.value_string()])
    }

    fn load_key_impl(&self, key: &NKey, _value_type: ValueType) -> Result<String> {
        line(&["GET", key.name()])
    }

    fn delete_key_impl(&self, key: &NKey) -> Result<String> {
        line(&["DEL", key.name()])
    }

    fn rename_key_impl(&self, key: &NKey, new_name: &str) -> Result<String> {
        line(&["RENAME", key.name(), new_name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbridge_command::{tokenize, KeyOperations};
    use kvbridge_core::{NDbPSChannel, Ttl, Value};

    #[test]
    fn test_rejects_remote_backend() {
        assert!(EmbeddedTranslator::new(Backend::Redis).is_err());
    }

    #[test]
    fn test_ttl_change_is_not_supported() {
        let t = EmbeddedTranslator::new(Backend::LevelDb).unwrap();
        let k = NKey::new("k");
        for ttl in [Ttl::Persistent, Ttl::NotExists, Ttl::Seconds(0), Ttl::Seconds(u64::MAX)] {
            match t.change_key_ttl_command(&k, ttl) {
                Err(Error::NotSupported { operation, backend }) => {
                    assert_eq!(operation, "ChangeKeyTTLCommand");
                    assert_eq!(backend, "LevelDB");
                }
                other => panic!("Expected NotSupported, got {:?}", other),
            }
        }
        assert!(t.change_key_ttl_command(&NKey::new(""), Ttl::Persistent).unwrap_err().is_not_supported());
        assert!(t.load_key_ttl_command(&k).unwrap_err().is_not_supported());
        assert!(t.subscribe_command(&NDbPSChannel::new("c")).unwrap_err().is_not_supported());
    }

    #[test]
    fn test_crud_lines_validate() {
        let t = EmbeddedTranslator::new(Backend::Lmdb).unwrap();
        let kv = NDbKValue::new("k", Value::Array(vec!["a".into(), "b".into()]));
        let lines = [
            t.create_key_command(&kv).unwrap(),
            t.load_key_command(kv.key(), ValueType::Array).unwrap(),
            t.delete_key_command(kv.key()).unwrap(),
            t.rename_key_command(kv.key(), "j").unwrap(),
            t.select_db_command("db1").unwrap(),
            t.flush_db_command().unwrap(),
        ];
        assert_eq!(tokenize(&lines[0]).unwrap(), vec!["SET", "k", "a b"]);
        for l in &lines {
            assert!(t.test_command_line(l).is_ok(), "{}", l);
        }
    }

    #[test]
    fn test_select_only_where_supported() {
        let leveldb = EmbeddedTranslator::new(Backend::LevelDb).unwrap();
        assert!(leveldb.select_db_command("x").unwrap_err().is_not_supported());
        assert!(leveldb.test_command_line("SELECT x").is_err());
        let upscale = EmbeddedTranslator::new(Backend::UpscaleDb).unwrap();
        assert_eq!(upscale.select_db_command("2").unwrap(), "SELECT 2");
    }
}
