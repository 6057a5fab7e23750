//! Integration tests for PromptConfig
//!
//! These tests exercise the public API end to end: parse a config document,
//! bind its settings, and build chat message templates from it.

use std::sync::Arc;

use promptconfig::{
    ChatPromptTemplate, ExecutionSettings, ExtractOptions, HandlebarsEngine, PromptLoader, PromptTemplateConfig,
    RequestSettings, TemplateEngine, UntypedSettings,
};
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

fn engine() -> Arc<dyn TemplateEngine> {
    Arc::new(HandlebarsEngine::new())
}

fn document() -> Value {
    json!({
        "schema": 2,
        "type": "completion2",
        "description": "Custom description.",
        "execution_settings": {
            "default": {
                "temperature": 0.5,
                "top_p": 0.5,
                "presence_penalty": 0.5,
                "frequency_penalty": 0.5,
                "max_tokens": 128,
                "number_of_responses": 2,
                "stop": ["\n"],
                "logit_bias": {"1": 1.0}
            }
        }
    })
}

fn as_map(value: &Value) -> &Map<String, Value> {
    value.as_object().expect("document is an object")
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_default_and_empty_map_agree() {
    let default = PromptTemplateConfig::<UntypedSettings>::default();
    let from_empty = PromptTemplateConfig::<UntypedSettings>::from_map(&Map::new()).unwrap();

    assert_eq!(default, from_empty);
    assert_eq!(from_empty.schema, 1);
    assert_eq!(from_empty.template_type, "completion");
    assert_eq!(from_empty.description, "");
    assert!(from_empty.execution_settings.is_empty());
}

#[test]
fn test_empty_text_never_yields_default() {
    let err = PromptTemplateConfig::<UntypedSettings>::from_json("").unwrap_err();
    assert!(err.is_malformed());

    let err = PromptTemplateConfig::<RequestSettings>::from_yaml("").unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_custom_typed_config() {
    let config = PromptTemplateConfig {
        schema: 2,
        template_type: "completion2".to_string(),
        description: "Custom description.".to_string(),
        execution_settings: ExecutionSettings::new(RequestSettings {
            temperature: 0.5,
            top_p: 0.5,
            presence_penalty: 0.5,
            frequency_penalty: 0.5,
            max_tokens: 128,
            number_of_responses: 2,
            stop: vec!["\n".to_string()],
            logit_bias: [("1".to_string(), 1.0)].into_iter().collect(),
        }),
        ..Default::default()
    };

    let parsed = PromptTemplateConfig::<RequestSettings>::from_map(as_map(&document())).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_typed_fields_consistent_with_bag() {
    let config = PromptTemplateConfig::<RequestSettings>::from_map(as_map(&document())).unwrap();
    let settings = &config.execution_settings;

    assert_eq!(settings.temperature, 0.5);
    assert_eq!(settings.number_of_responses, 2);
    for (key, value) in as_map(&document()["execution_settings"]["default"]) {
        assert_eq!(settings.value(key).as_ref(), Some(value), "key {key}");
    }
}

#[test]
fn test_untyped_bucket_preserves_integers() {
    let mut doc = document();
    doc["execution_settings"]["default"]["logit_bias"] = json!({"1": 1});

    let config = PromptTemplateConfig::<UntypedSettings>::from_map(as_map(&doc)).unwrap();
    let data = &config.execution_settings.extension_data;

    assert_eq!(data.len(), 8);
    assert_eq!(data["logit_bias"], json!({"1": 1}));
    assert!(data["logit_bias"]["1"].is_u64());
    assert!(data["max_tokens"].is_u64());
}

#[test]
fn test_text_matches_mapping() {
    let doc = document();
    let from_text = PromptTemplateConfig::<RequestSettings>::from_json(&doc.to_string()).unwrap();
    let from_map = PromptTemplateConfig::<RequestSettings>::from_map(as_map(&doc)).unwrap();
    assert_eq!(from_text, from_map);

    let untyped_text = PromptTemplateConfig::<UntypedSettings>::from_json(&doc.to_string()).unwrap();
    let untyped_map = PromptTemplateConfig::<UntypedSettings>::from_map(as_map(&doc)).unwrap();
    assert_eq!(untyped_text, untyped_map);
}

#[test]
fn test_parameters_round_trip_through_json() {
    let config = PromptTemplateConfig::<RequestSettings>::from_parameters([
        ("temperature", json!(0.9)),
        ("chat_system_prompt", json!("x")),
    ])
    .unwrap();
    let reparsed = PromptTemplateConfig::<RequestSettings>::from_json(&config.to_json()).unwrap();

    assert_eq!(reparsed.execution_settings.temperature, 0.9);
    for key in config.execution_settings.extension_data.keys() {
        assert_eq!(reparsed.execution_settings.value(key), config.execution_settings.value(key), "key {key}");
    }
    assert_eq!(reparsed.to_value(), config.to_value());
}

#[test]
fn test_typed_mismatch_fails_construction() {
    let mut doc = document();
    doc["execution_settings"]["default"]["temperature"] = json!("warm");

    let err = PromptTemplateConfig::<RequestSettings>::from_map(as_map(&doc)).unwrap_err();
    assert!(err.is_type_mismatch());
    assert_eq!(err.field(), Some("temperature"));
}

// =============================================================================
// Chat Prompt Tests
// =============================================================================

#[test]
fn test_chat_prompt_without_flags_is_empty() {
    let chat = ChatPromptTemplate::new("{{$user_input}}", engine(), PromptTemplateConfig::<UntypedSettings>::default());
    assert!(chat.messages().is_empty());
}

#[test]
fn test_chat_prompt_with_messages() {
    let config = PromptTemplateConfig::<RequestSettings>::from_parameters([(
        "messages",
        json!([{"role": "system", "content": "Custom system prompt."}]),
    )])
    .unwrap();
    let chat = ChatPromptTemplate::with_extraction("{{$user_input}}", engine(), config, ExtractOptions::messages())
        .unwrap();

    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].role, "system");
    assert_eq!(chat.messages()[0].content_template.template, "Custom system prompt.");
}

#[test]
fn test_chat_prompt_with_system_prompt() {
    let config = PromptTemplateConfig::<RequestSettings>::from_parameters([("chat_system_prompt", "Custom system prompt.")])
        .unwrap();
    let chat =
        ChatPromptTemplate::with_extraction("{{$user_input}}", engine(), config, ExtractOptions::system_prompt())
            .unwrap();

    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].role, "system");
    assert_eq!(chat.messages()[0].content_template.template, "Custom system prompt.");
}

#[test]
fn test_chat_prompt_ordering_from_json() {
    let text = r#"{
        "type": "chat",
        "execution_settings": {
            "default": {
                "temperature": 0.1,
                "messages": [
                    {"role": "user", "content": "One"},
                    {"role": "assistant", "content": "Two"},
                    {"role": "user", "content": "Three"}
                ],
                "chat_system_prompt": "Zero"
            }
        }
    }"#;
    let config = PromptTemplateConfig::<RequestSettings>::from_json(text).unwrap();
    let chat = ChatPromptTemplate::with_extraction("", engine(), config, ExtractOptions::all()).unwrap();

    let texts: Vec<&str> = chat
        .messages()
        .iter()
        .map(|m| m.content_template.template.as_str())
        .collect();
    assert_eq!(texts, vec!["Zero", "One", "Two", "Three"]);
    assert_eq!(chat.messages()[0].role, "system");
    assert_eq!(chat.prompt_config().execution_settings.temperature, 0.1);
}

#[test]
fn test_loader_to_rendered_messages() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("prompts").join("explain");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("skprompt.txt"), "Explain {{subject}} simply.").unwrap();
    std::fs::write(
        dir.join("config.json"),
        r#"{"schema": 1, "type": "chat", "execution_settings": {"default": {"chat_system_prompt": "You teach {{audience}}."}}}"#,
    )
    .unwrap();

    let loader = PromptLoader::new(temp.path());
    let chat = loader
        .load_chat::<RequestSettings>("explain", engine(), ExtractOptions::system_prompt())
        .unwrap();
    let rendered = chat
        .render_messages(&json!({"subject": "entropy", "audience": "kids"}))
        .unwrap();

    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0].content, "You teach kids.");
    assert_eq!(rendered[1].role, "user");
    assert_eq!(rendered[1].content, "Explain entropy simply.");
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_no_settings_key_dropped(
        extras in prop::collection::btree_map("[a-z_]{1,12}", any::<i64>(), 0..8),
        temperature in 0.0f64..2.0,
    ) {
        let mut bucket = Map::new();
        bucket.insert("temperature".to_string(), json!(temperature));
        for (key, value) in &extras {
            bucket.entry(key.clone()).or_insert(json!(value));
        }
        let doc = json!({"execution_settings": {"default": bucket.clone()}});

        let typed = PromptTemplateConfig::<RequestSettings>::from_map(as_map(&doc));
        let untyped = PromptTemplateConfig::<UntypedSettings>::from_map(as_map(&doc)).unwrap();

        prop_assert_eq!(&untyped.execution_settings.extension_data, &bucket);
        // Random keys may hit a typed field with an integer it can't hold; otherwise nothing is lost
        if let Ok(typed) = typed {
            for key in bucket.keys() {
                prop_assert!(typed.execution_settings.value(key).is_some());
            }
        }
    }
}
