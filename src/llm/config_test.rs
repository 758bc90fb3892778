use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<LlmConfig, LlmError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    LlmConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_to_openrouter() {
    let cfg = config_from(&[("LLM_API_KEY_ENV", "TEST_KEY"), ("TEST_KEY", "secret")]).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "openai/gpt-4o-mini");
    assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.api_key, "secret");
}

#[test]
fn parses_overrides() {
    let cfg = config_from(&[
        ("LLM_PROVIDER", "openai"),
        ("LLM_API_KEY_ENV", "OPENAI_API_KEY"),
        ("OPENAI_API_KEY", "sk-test"),
        ("LLM_MODEL", "gpt-4o"),
        ("LLM_OPENAI_BASE_URL", "https://example.test/v1/"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ])
    .unwrap();
    assert_eq!(cfg.model, "gpt-4o");
    assert_eq!(cfg.openai_base_url, "https://example.test/v1");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn anthropic_provider_has_its_own_default_model() {
    let cfg = config_from(&[("LLM_PROVIDER", "anthropic"), ("LLM_API_KEY_ENV", "K"), ("K", "x")]).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
}

#[test]
fn openrouter_is_an_alias_for_openai() {
    let cfg = config_from(&[("LLM_PROVIDER", "openrouter"), ("LLM_API_KEY_ENV", "K"), ("K", "x")]).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
}

#[test]
fn unknown_provider_errors() {
    let err = config_from(&[("LLM_PROVIDER", "bad"), ("LLM_API_KEY_ENV", "K"), ("K", "x")])
        .unwrap_err()
        .to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn missing_key_env_names_the_indirection_var() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "LLM_API_KEY_ENV"));
}

#[test]
fn missing_or_blank_key_names_the_key_var() {
    let err = config_from(&[("LLM_API_KEY_ENV", "OPENROUTER_API_KEY")]).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { var } if var == "OPENROUTER_API_KEY"));

    let err = config_from(&[("LLM_API_KEY_ENV", "OPENROUTER_API_KEY"), ("OPENROUTER_API_KEY", "  ")]).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { .. }));
}

#[test]
fn unparsable_timeouts_fall_back_to_defaults() {
    let cfg = config_from(&[("LLM_API_KEY_ENV", "K"), ("K", "x"), ("LLM_REQUEST_TIMEOUT_SECS", "soon")]).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}
