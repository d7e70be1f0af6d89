use super::*;

#[test]
fn empty_file_is_default_config() {
    let config = CodecConfig::from_toml_str("").expect("empty config");
    assert_eq!(config, CodecConfig::default());
    assert_eq!(config.protocol.task_variable, "task");
    assert_eq!(config.protocol.delimiter, '\u{b4}');
    assert_eq!(config.compose_policy, ComposePolicy::AppendNew);
    assert_eq!(config.delimiter_policy, DelimiterPolicy::Reject);
}

#[test]
fn partial_file_overrides_named_fields() {
    let config = CodecConfig::from_toml_str(
        r#"
compose_policy = "replace_existing"
delimiter_policy = "escape"

[protocol]
task_variable = "job"
poll_interval_ms = 500
"#,
    )
    .expect("config");

    assert_eq!(config.compose_policy, ComposePolicy::ReplaceExisting);
    assert_eq!(config.delimiter_policy, DelimiterPolicy::Escape);
    assert_eq!(config.protocol.task_variable, "job");
    assert_eq!(config.protocol.poll_interval_ms, 500);
    assert_eq!(config.protocol.start_primitive, "SER.START");
    assert_eq!(config.format().policy(), DelimiterPolicy::Escape);
}

#[test]
fn invalid_protocol_is_rejected_on_load() {
    let err = CodecConfig::from_toml_str("[protocol]\ndelimiter = \"'\"\n")
        .expect_err("ascii delimiter");
    assert!(matches!(err, ConfigError::InvalidProtocol(_)));
}

#[test]
fn unknown_policy_is_a_parse_error() {
    let err = CodecConfig::from_toml_str("compose_policy = \"merge\"\n").expect_err("bad policy");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = CodecConfig::load(&dir.path().join("codec.toml")).expect_err("missing");
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn save_and_load_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("codec.toml");
    let mut config = CodecConfig::default();
    config.compose_policy = ComposePolicy::ReplaceExisting;
    config.protocol.tab_name = "Reports".to_string();

    config.save(&path).expect("save");
    let loaded = CodecConfig::load(&path).expect("load");
    assert_eq!(loaded, config);
    let stored = std::fs::read_to_string(&path).expect("read");
    assert!(stored.contains("compose_policy = \"replace_existing\""));
}
