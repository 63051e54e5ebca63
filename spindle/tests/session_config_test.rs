use std::io::Write;

use spindle::session::{
    ConfigError, SessionConfig,
    parameter::{ContextMode, ResolvableValue, SamplingSeed},
};

#[test]
fn test_defaults() {
    let config = SessionConfig::new("models/orca-2-7b.Q4_0.gguf");

    assert_eq!(config.context_length, 4096);
    assert_eq!(config.gpu_layers, 20);
    assert_eq!(config.threads, 4);
    assert_eq!(config.batch_capacity, 512);
    assert_eq!(config.context_mode, ContextMode::Fresh);
    assert_eq!(config.sampling_seed, SamplingSeed::Custom(777));
    assert_eq!(config.context_params().seed, 777);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file_fills_missing_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "model_path": "models/test.gguf",
            "context_length": 512,
            "batch_capacity": 64,
            "sampling_seed": {{ "custom": 42 }},
            "context_mode": "persistent"
        }}"#
    )
    .unwrap();

    let config = SessionConfig::from_file(file.path()).unwrap();

    assert_eq!(config.model_path.to_str(), Some("models/test.gguf"));
    assert_eq!(config.context_length, 512);
    assert_eq!(config.batch_capacity, 64);
    assert_eq!(config.threads, 4);
    assert_eq!(config.sampling_seed, SamplingSeed::Custom(42));
    assert_eq!(config.context_mode, ContextMode::Persistent);
    assert_eq!(config.context_params().seed, 42);
}

#[test]
fn test_load_from_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ \"context_length\": \"many\" }}").unwrap();

    let result = SessionConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_validation() {
    let config = SessionConfig::new("model.gguf");

    assert!(matches!(
        config.clone().context_length(0).validate(),
        Err(ConfigError::ZeroContextLength)
    ));
    assert!(matches!(
        config.clone().batch_capacity(0).validate(),
        Err(ConfigError::ZeroBatchCapacity)
    ));
    assert!(matches!(
        config.clone().context_length(128).batch_capacity(256).validate(),
        Err(ConfigError::BatchLargerThanContext {
            batch_capacity: 256,
            context_length: 128,
        })
    ));
    assert!(config.context_length(256).batch_capacity(256).validate().is_ok());
}

#[test]
fn test_custom_seed_resolves_to_itself() {
    assert_eq!(SamplingSeed::Custom(777).resolve(), 777);
}
