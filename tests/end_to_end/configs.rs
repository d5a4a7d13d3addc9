//! Backend configs through their flag syntax.

use kvbridge::backends::{LmdbConfig, RedisConfig, UpscaleDbConfig};
use kvbridge::ConnectionConfig;
use proptest::prelude::*;

proptest! {
    #[test]
    fn redis_config_round_trips(db in 0u32..16, port in 1u16.., password in proptest::option::of("[a-z0-9]{1,8}")) {
        let mut config = RedisConfig::default();
        config.db_index = db;
        config.remote.host.port = port;
        config.password = password;
        let line = config.to_line().unwrap();
        prop_assert_eq!(RedisConfig::from_line(&line), config);
    }
}

#[test]
fn lmdb_read_only_flag_survives_serialization() {
    let mut config = LmdbConfig::default();
    config.set_read_only(true);
    let parsed = LmdbConfig::from_line(&config.to_line().unwrap());
    assert!(parsed.is_read_only());
}

#[test]
fn malformed_flag_keeps_what_was_parsed() {
    let config = UpscaleDbConfig::from_line("-f /tmp/db -n notanumber -c");
    assert_eq!(config.local.db_path, "/tmp/db");
    assert_eq!(config.db_number, UpscaleDbConfig::default().db_number);
    assert_eq!(config.create_if_missing, UpscaleDbConfig::default().create_if_missing);
}
