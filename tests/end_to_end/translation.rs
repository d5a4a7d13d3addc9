//! Translator output executed by the matching backend's own stack.

use kvbridge::{translator_for, Backend, HashValue, KeyOperations, NDbKValue, NKey, Ttl, Value, ValueType};

use crate::Session;

fn ssdb() -> Box<dyn kvbridge::KeyTranslator> {
    translator_for(Backend::Ssdb).unwrap()
}

#[test]
fn hash_round_trip_through_ssdb() {
    let mut s = Session::new();
    let t = ssdb();
    let mut hash = HashValue::new();
    hash.insert("name", Value::from("ada"));
    hash.insert("lang", Value::from("en"));
    let kv = NDbKValue::new("profile", hash.into());

    s.run(&t.create_key_command(&kv).unwrap()).unwrap();
    let out = s.run(&t.load_key_command(kv.key(), ValueType::Hash).unwrap()).unwrap();
    let loaded: Vec<String> = out
        .last_child()
        .unwrap()
        .child_values()
        .iter()
        .map(|v| v.to_display_string())
        .collect();
    assert_eq!(loaded, vec!["lang", "en", "name", "ada"]);
}

#[test]
fn ttl_commands_round_trip_through_ssdb() {
    let mut s = Session::new();
    let t = ssdb();
    let key = NKey::new("session");
    s.run(&t.create_key_command(&NDbKValue::new("session", Value::from("x"))).unwrap()).unwrap();
    s.run(&t.change_key_ttl_command(&key, Ttl::Seconds(90)).unwrap()).unwrap();
    let out = s.run(&t.load_key_ttl_command(&key).unwrap()).unwrap();
    assert_eq!(out.last_child().unwrap().value(), Some(&Value::from(90i64)));
}

#[test]
fn flush_template_runs_the_emulated_flush() {
    let mut s = Session::new();
    s.run("MULTI_SET a 1 b 2 c 3").unwrap();
    s.run(&ssdb().flush_db_command().unwrap()).unwrap();
    assert_eq!(s.store.key_count(), 0);
}

#[test]
fn load_key_replay_detection_per_backend() {
    let cases = [
        (Backend::Redis, "LRANGE mylist 0 -1", Some("mylist")),
        (Backend::Memcached, "GET mykey", Some("mykey")),
        (Backend::LevelDb, "GET mykey", Some("mykey")),
        (Backend::Ssdb, "HSCAN h '' '' 0", Some("h")),
        (Backend::Redis, "SET a b", None),
        (Backend::Memcached, "GET", None),
    ];
    for (backend, line, expected) in cases {
        let t = translator_for(backend).unwrap();
        assert_eq!(t.is_load_key_command(line).as_deref(), expected, "{} {}", backend, line);
    }
}
