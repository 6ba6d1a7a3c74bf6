//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use mqtt_wire::config::{CodecConfig, FramingConfig, LoggingConfig, MAX_FRAME_SIZE};
use mqtt_wire::{MqttCodec, ProtocolError};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = CodecConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_max_packet_size_too_small() {
    let mut config = CodecConfig::default();
    config.framing.max_packet_size = 1;
    config.framing.initial_buffer_capacity = 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max packet size too small")));
}

#[test]
fn test_max_packet_size_above_protocol_limit() {
    let mut config = CodecConfig::default();
    config.framing.max_packet_size = MAX_FRAME_SIZE + 1;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max packet size too large")));
}

#[test]
fn test_protocol_limit_itself_is_valid() {
    let mut config = CodecConfig::default();
    config.framing.max_packet_size = MAX_FRAME_SIZE;
    assert!(config.validate().is_empty());
}

#[test]
fn test_zero_buffer_capacity() {
    let mut config = CodecConfig::default();
    config.framing.initial_buffer_capacity = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Initial buffer capacity must be greater than 0")));
}

#[test]
fn test_buffer_capacity_larger_than_max_packet() {
    let config = CodecConfig::default_with_overrides(|c| {
        c.framing.max_packet_size = 1024;
        c.framing.initial_buffer_capacity = 4096;
    });

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("cannot be larger than max packet size")));
}

#[test]
fn test_empty_app_name() {
    let mut config = CodecConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let mut config = CodecConfig::default();
    config.logging.app_name = "x".repeat(65);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Application name too long")));
}

#[test]
fn test_validate_strict_with_valid_config() {
    assert!(CodecConfig::default().validate_strict().is_ok());
}

#[test]
fn test_validate_strict_with_invalid_config() {
    let mut config = CodecConfig::default();
    config.framing.max_packet_size = 0;
    config.logging.app_name = String::new();

    match config.validate_strict() {
        Err(ProtocolError::ConfigError(msg)) => {
            assert!(msg.contains("Configuration validation failed"));
            assert!(msg.contains("Max packet size too small"));
            assert!(msg.contains("Application name cannot be empty"));
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_from_toml_partial_uses_defaults() {
    let config = CodecConfig::from_toml(
        r#"
        [framing]
        max_packet_size = 65536
        initial_buffer_capacity = 1024
        "#,
    )
    .expect("TOML should parse");

    assert_eq!(config.framing.max_packet_size, 65536);
    assert_eq!(config.logging.app_name, "mqtt-wire");
    assert_eq!(config.logging.log_level, Level::INFO);
}

#[test]
fn test_from_toml_log_level() {
    let config = CodecConfig::from_toml(
        r#"
        [logging]
        app_name = "broker"
        log_level = "debug"
        json_format = true
        "#,
    )
    .expect("TOML should parse");

    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
}

#[test]
fn test_from_toml_rejects_bad_level() {
    let result = CodecConfig::from_toml(
        r#"
        [logging]
        app_name = "broker"
        log_level = "loud"
        json_format = false
        "#,
    );
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_example_config_round_trips() {
    let text = CodecConfig::example_config();
    let config = CodecConfig::from_toml(&text).expect("example config should parse");
    assert_eq!(
        config.framing.max_packet_size,
        FramingConfig::default().max_packet_size
    );
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!("mqtt-wire-config-{}.toml", std::process::id()));
    let config = CodecConfig {
        framing: FramingConfig {
            max_packet_size: 8192,
            initial_buffer_capacity: 512,
        },
        logging: LoggingConfig {
            app_name: "edge-gateway".to_string(),
            log_level: Level::WARN,
            json_format: false,
        },
    };

    config.save_to_file(&path).expect("save should succeed");
    let loaded = CodecConfig::from_file(&path).expect("load should succeed");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.framing.max_packet_size, 8192);
    assert_eq!(loaded.logging.app_name, "edge-gateway");
    assert_eq!(loaded.logging.log_level, Level::WARN);
}

#[test]
fn test_missing_file() {
    let result = CodecConfig::from_file("/nonexistent/mqtt-wire.toml");
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
#[serial_test::serial]
fn test_from_env_overrides() {
    std::env::set_var("MQTT_WIRE_MAX_PACKET_SIZE", "2048");
    std::env::set_var("MQTT_WIRE_LOG_LEVEL", "trace");
    let config = CodecConfig::from_env();
    std::env::remove_var("MQTT_WIRE_MAX_PACKET_SIZE");
    std::env::remove_var("MQTT_WIRE_LOG_LEVEL");

    let config = config.expect("env config should load");
    assert_eq!(config.framing.max_packet_size, 2048);
    assert_eq!(config.logging.log_level, Level::TRACE);
}

#[test]
#[serial_test::serial]
fn test_from_env_rejects_garbage() {
    std::env::set_var("MQTT_WIRE_MAX_PACKET_SIZE", "lots");
    let result = CodecConfig::from_env();
    std::env::remove_var("MQTT_WIRE_MAX_PACKET_SIZE");

    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_codec_from_config() {
    let config = FramingConfig {
        max_packet_size: 300,
        initial_buffer_capacity: 128,
    };
    assert_eq!(MqttCodec::from_config(&config).max_packet_size(), 300);
}
