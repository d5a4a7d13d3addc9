//! Capability matrix checks across every backend translator.

use kvbridge_backends::{translator_for, Backend};
use kvbridge_command::{Capability, KeyOperations};
use kvbridge_core::{Error, NDbKValue, NDbPSChannel, NKey, Ttl, Value, ValueType};
use proptest::prelude::*;

fn ttl_strategy() -> impl Strategy<Value = Ttl> {
    prop_oneof![
        Just(Ttl::Persistent),
        Just(Ttl::NotExists),
        any::<u64>().prop_map(Ttl::Seconds),
    ]
}

proptest! {
    #[test]
    fn ttl_change_without_capability_is_not_supported(key in "[ -~]{0,16}", ttl in ttl_strategy()) {
        for backend in Backend::all() {
            if backend.supports(Capability::ChangeKeyTTL) {
                continue;
            }
            let t = translator_for(*backend).unwrap();
            let result = t.change_key_ttl_command(&NKey::new(key.clone()), ttl);
            prop_assert!(matches!(result, Err(Error::NotSupported { .. })), "{}: {:?}", backend, result);
        }
    }
}

#[test]
fn declared_capabilities_match_behavior() {
    let key = NKey::new("k");
    let kv = NDbKValue::new("k", Value::from("v"));
    let channel = NDbPSChannel::new("c");

    for backend in Backend::all() {
        let t = translator_for(*backend).unwrap();
        assert_eq!(t.capabilities(), backend.capabilities());

        let outcomes = [
            (Capability::CreateKey, t.create_key_command(&kv)),
            (Capability::LoadKey, t.load_key_command(&key, ValueType::String)),
            (Capability::DeleteKey, t.delete_key_command(&key)),
            (Capability::RenameKey, t.rename_key_command(&key, "j")),
            (Capability::ChangeKeyTTL, t.change_key_ttl_command(&key, Ttl::Seconds(5))),
            (Capability::LoadKeyTTL, t.load_key_ttl_command(&key)),
            (Capability::Publish, t.publish_command(&channel, "m")),
            (Capability::Subscribe, t.subscribe_command(&channel)),
            (Capability::SelectDB, t.select_db_command("1")),
            (Capability::FlushDB, t.flush_db_command()),
        ];
        for (capability, outcome) in outcomes {
            match outcome {
                Ok(line) => {
                    assert!(backend.supports(capability), "{} produced {:?} for {}", backend, line, capability.name());
                    assert!(t.test_command_line(&line).is_ok(), "{}: '{}' does not validate", backend, line);
                }
                Err(e) => {
                    assert!(!backend.supports(capability), "{} failed {}: {}", backend, capability.name(), e);
                    assert!(e.is_not_supported());
                }
            }
        }
    }
}

#[test]
fn backend_names_round_trip() {
    for backend in Backend::all() {
        assert_eq!(backend.name().parse::<Backend>().unwrap(), *backend);
        assert_eq!(translator_for(*backend).unwrap().backend_name(), backend.name());
    }
    assert!("cassandra".parse::<Backend>().is_err());
}
