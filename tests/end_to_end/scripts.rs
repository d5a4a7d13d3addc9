//! Multi-line scripts and output tree shape.

use kvbridge::{Error, OutputNode, Value};

use crate::Session;

#[test]
fn script_output_has_one_node_per_command() {
    let mut s = Session::new();
    let mut out = OutputNode::default();
    let script = "
        # seed
        SET user:1 alice
        SET user:2 bob
        KEYS user: user:~ 0
    ";
    let ran = s.handler.execute_script(&mut s.raw, script, &mut out).unwrap();
    assert_eq!(ran, 3);
    assert_eq!(out.children().len(), 3);

    let keys = out.last_child().unwrap();
    assert!(keys.is_array());
    assert_eq!(keys.child_values(), vec![&Value::from("user:1"), &Value::from("user:2")]);
}

#[test]
fn empty_script_is_a_parse_error() {
    let mut s = Session::new();
    let mut out = OutputNode::default();
    assert!(matches!(
        s.handler.execute_script(&mut s.raw, "", &mut out),
        Err(Error::Parse { .. })
    ));
}

#[test]
fn unknown_command_names_the_input() {
    let mut s = Session::new();
    match s.run("FROB a b") {
        Err(Error::UnknownCommand { input }) => assert_eq!(input, "FROB a b"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
}

#[test]
fn quoted_arguments_survive_dispatch() {
    let mut s = Session::new();
    s.run(r#"SET "two words" 'it''s'"#).unwrap();
    assert_eq!(s.store.value("two words").as_deref(), Some("its"));
    let out = s.run(r#"GET "two words""#).unwrap();
    assert_eq!(out.to_display_string(), "its");
}

#[test]
fn unbalanced_quote_is_a_parse_error() {
    let mut s = Session::new();
    assert!(matches!(s.run("SET 'k v"), Err(Error::Parse { .. })));
    assert_eq!(s.store.key_count(), 0);
}

#[test]
fn errors_serialize_for_transport() {
    let mut s = Session::new();
    let err = s.run("GET nothing").unwrap_err();
    let json = serde_json::to_string(&err).unwrap();
    let back: Error = serde_json::from_str(&json).unwrap();
    assert_eq!(back, err);
    assert_eq!(back.to_string(), "get function error: not_found");
}
