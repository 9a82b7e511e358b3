//! End-to-end checks of the framework pieces a resource relies on:
//! schema building, config validation, planning and typed state.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tfplug::plan::plan_resource_change;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{AttributeBuilder, AttributeType, BlockBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tfplug::validator::{validate_config, NumberRange, StringOneOf};

fn template_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("format", AttributeType::String)
                .required()
                .validator(StringOneOf::new(["HLS", "MPEG-DASH"]))
                .force_new()
                .build(),
        )
        .block(
            BlockBuilder::new("stream_infos")
                .required()
                .block(
                    BlockBuilder::new("video")
                        .single()
                        .required()
                        .attribute(
                            AttributeBuilder::new("fps", AttributeType::Number)
                                .required()
                                .validator(NumberRange {
                                    min: Some(0.0),
                                    max: Some(100.0),
                                })
                                .build(),
                        )
                        .build(),
                )
                .build(),
        )
        .build()
}

fn object(entries: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
    )
}

fn config(format: &str, fps: f64) -> Dynamic {
    object(vec![
        ("id", Dynamic::Null),
        ("name", Dynamic::String("ladder".into())),
        ("format", Dynamic::String(format.into())),
        (
            "stream_infos",
            Dynamic::List(vec![object(vec![(
                "video",
                Dynamic::List(vec![object(vec![("fps", Dynamic::Number(fps))])]),
            )])]),
        ),
    ])
}

#[test]
fn invalid_nested_value_reports_full_path() {
    let schema = template_schema();
    let diagnostics = validate_config(&schema.block, &config("HLS", 250.0));

    assert_eq!(diagnostics.len(), 1);
    let path = diagnostics[0].attribute.as_ref().unwrap();
    assert_eq!(path.to_string(), "stream_infos[0].video[0].fps");
}

#[test]
fn valid_config_has_no_diagnostics() {
    let schema = template_schema();
    assert!(validate_config(&schema.block, &config("MPEG-DASH", 25.0)).is_empty());
}

#[test]
fn create_then_update_lifecycle() {
    let schema = template_schema();

    // create: computed id unknown
    let cfg = DynamicValue::new(config("HLS", 25.0));
    let created = plan_resource_change(&schema, &DynamicValue::null(), &cfg, &cfg);
    assert!(created.requires_replace.is_empty());
    assert!(created
        .planned_state
        .get(&AttributePath::new("id"))
        .unwrap()
        .is_unknown());

    // apply result
    let mut state = cfg.clone();
    state
        .set_string(&AttributePath::new("id"), "1000".to_string())
        .unwrap();

    // in-place change keeps the id
    let mut proposed = DynamicValue::new(config("HLS", 30.0));
    proposed
        .set_string(&AttributePath::new("id"), "1000".to_string())
        .unwrap();
    let updated = plan_resource_change(&schema, &state, &proposed, &DynamicValue::new(config("HLS", 30.0)));
    assert!(updated.requires_replace.is_empty());
    assert_eq!(
        updated.planned_state.get_string(&AttributePath::new("id")).unwrap(),
        "1000"
    );

    // format change forces replacement
    let mut proposed = DynamicValue::new(config("MPEG-DASH", 25.0));
    proposed
        .set_string(&AttributePath::new("id"), "1000".to_string())
        .unwrap();
    let replaced = plan_resource_change(&schema, &state, &proposed, &DynamicValue::new(config("MPEG-DASH", 25.0)));
    assert_eq!(replaced.requires_replace, vec![AttributePath::new("format")]);
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Video {
    fps: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct StreamInfo {
    #[serde(default, with = "tfplug::value::single_block")]
    video: Option<Video>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Template {
    id: Option<String>,
    name: Option<String>,
    format: String,
    stream_infos: Vec<StreamInfo>,
}

#[test]
fn typed_state_survives_msgpack_and_conform() {
    let schema = template_schema();
    let template = Template {
        id: Some("1000".to_string()),
        name: None,
        format: "HLS".to_string(),
        stream_infos: vec![StreamInfo {
            video: Some(Video { fps: 25 }),
        }],
    };

    let state = DynamicValue::encode(&template).unwrap();
    let conformed = DynamicValue::new(schema.block.conform(&state.value));
    let bytes = conformed.encode_msgpack().unwrap();
    let decoded: Template = DynamicValue::decode_msgpack(&bytes).unwrap().decode().unwrap();

    assert_eq!(decoded, template);
}
