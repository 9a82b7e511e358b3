//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining provider, resource and
//! data source schemas: attribute types, nested blocks, validators and plan
//! modifiers.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes.
/// This must match Terraform's type system exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list(elem: AttributeType) -> Self {
        AttributeType::List(Box::new(elem))
    }

    pub fn set(elem: AttributeType) -> Self {
        AttributeType::Set(Box::new(elem))
    }

    /// cty type constraint in its JSON form, e.g. `["list","string"]`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};
        match self {
            AttributeType::String => json!("string"),
            AttributeType::Number => json!("number"),
            AttributeType::Bool => json!("bool"),
            AttributeType::List(elem) => json!(["list", elem.to_json()]),
            AttributeType::Set(elem) => json!(["set", elem.to_json()]),
            AttributeType::Map(elem) => json!(["map", elem.to_json()]),
            AttributeType::Object(fields) => {
                let fields: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.to_json()))
                    .collect();
                json!(["object", fields])
            }
        }
    }

    /// Wire encoding used in `Schema.Attribute.type`
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

/// Schema is returned by providers/resources/data sources.
/// Version is used for state migration.
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

impl Block {
    fn empty() -> Self {
        Self {
            version: 0,
            attributes: Vec::new(),
            block_types: Vec::new(),
            description: String::new(),
            description_kind: StringKind::Plain,
            deprecated: false,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    /// Reshapes `value` so that it matches this block exactly: every attribute
    /// is present (null when missing), list and set blocks are lists, and keys
    /// unknown to the schema are dropped. Terraform rejects state objects whose
    /// shape differs from the schema.
    pub fn conform(&self, value: &Dynamic) -> Dynamic {
        let empty = HashMap::new();
        let map = match value {
            Dynamic::Map(m) => m,
            Dynamic::Unknown => return Dynamic::Unknown,
            _ => &empty,
        };

        let mut out = HashMap::with_capacity(self.attributes.len() + self.block_types.len());
        for attr in &self.attributes {
            let v = map.get(&attr.name).cloned().unwrap_or(Dynamic::Null);
            out.insert(attr.name.clone(), v);
        }
        for nested in &self.block_types {
            let v = map.get(&nested.type_name).unwrap_or(&Dynamic::Null);
            let conformed = match nested.nesting {
                NestingMode::List | NestingMode::Set => match v {
                    Dynamic::List(items) => Dynamic::List(
                        items.iter().map(|item| nested.block.conform(item)).collect(),
                    ),
                    Dynamic::Unknown => Dynamic::Unknown,
                    _ => Dynamic::List(Vec::new()),
                },
                NestingMode::Map => match v {
                    Dynamic::Map(items) => Dynamic::Map(
                        items
                            .iter()
                            .map(|(k, item)| (k.clone(), nested.block.conform(item)))
                            .collect(),
                    ),
                    _ => Dynamic::Map(HashMap::new()),
                },
                NestingMode::Single | NestingMode::Group => match v {
                    Dynamic::Null if nested.nesting == NestingMode::Single => Dynamic::Null,
                    other => nested.block.conform(other),
                },
                NestingMode::Invalid => Dynamic::Null,
            };
            out.insert(nested.type_name.clone(), conformed);
        }
        Dynamic::Map(out)
    }

    /// The object type a value of this block has, for exposing a block's
    /// shape as a computed attribute. Nested list and set blocks become lists
    /// and sets of objects.
    pub fn object_type(&self) -> AttributeType {
        let mut fields: HashMap<String, AttributeType> = self
            .attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.r#type.clone()))
            .collect();
        for nested in &self.block_types {
            let inner = nested.block.object_type();
            let ty = match nested.nesting {
                NestingMode::Set => AttributeType::set(inner),
                NestingMode::Map => AttributeType::Map(Box::new(inner)),
                NestingMode::Single | NestingMode::Group => inner,
                NestingMode::List | NestingMode::Invalid => AttributeType::list(inner),
            };
            fields.insert(nested.type_name.clone(), ty);
        }
        AttributeType::Object(fields)
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub deprecated: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .finish()
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
    /// Changing anything inside the block replaces the resource.
    pub requires_replace: bool,
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
    Group,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator checks a configured attribute value.
/// Unknown and null values are skipped by the framework before validators run.
pub trait Validator: Send + Sync {
    fn description(&self) -> String;
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

#[derive(Default)]
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// PlanModifier adjusts the planned value of an attribute.
/// Common uses: RequiresReplace, UseStateForUnknown
pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;
    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse;
}

pub struct PlanModifierRequest {
    pub config_value: DynamicValue,
    pub state_value: DynamicValue,
    pub plan_value: DynamicValue,
    pub path: AttributePath,
}

pub struct PlanModifierResponse {
    pub plan_value: DynamicValue,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// AttributeBuilder provides fluent API for building attributes.
/// Use this instead of constructing Attribute directly.
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                deprecated: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.attribute.plan_modifiers.push(Arc::new(modifier));
        self
    }

    /// Shorthand for the RequiresReplace plan modifier
    pub fn force_new(self) -> Self {
        self.plan_modifier(crate::plan_modifier::RequiresReplace)
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Builds a nested block. Defaults to list nesting without limits.
pub struct BlockBuilder {
    nested: NestedBlock,
}

impl BlockBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            nested: NestedBlock {
                type_name: type_name.to_string(),
                block: Block::empty(),
                nesting: NestingMode::List,
                min_items: 0,
                max_items: 0,
                requires_replace: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.nested.block.description = desc.to_string();
        self
    }

    pub fn nesting(mut self, nesting: NestingMode) -> Self {
        self.nested.nesting = nesting;
        self
    }

    pub fn min_items(mut self, n: i64) -> Self {
        self.nested.min_items = n;
        self
    }

    pub fn max_items(mut self, n: i64) -> Self {
        self.nested.max_items = n;
        self
    }

    /// A list block holding at most one element
    pub fn single(self) -> Self {
        self.nesting(NestingMode::List).max_items(1)
    }

    /// At least one element must be configured
    pub fn required(self) -> Self {
        let min = self.nested.min_items.max(1);
        self.min_items(min)
    }

    pub fn force_new(mut self) -> Self {
        self.nested.requires_replace = true;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.nested.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.nested.block.block_types.push(block);
        self
    }

    pub fn build(self) -> NestedBlock {
        self.nested
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::empty(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("format", AttributeType::String)
            .description("Adaptive bitstream format")
            .required()
            .build();

        assert_eq!(attr.name, "format");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "Adaptive bitstream format");
    }

    #[test]
    fn nested_blocks_become_lists_of_objects() {
        let block = BlockBuilder::new("trigger")
            .single()
            .attribute(AttributeBuilder::new("type", AttributeType::String).required().build())
            .block(
                BlockBuilder::new("cos_file_upload_trigger")
                    .single()
                    .attribute(
                        AttributeBuilder::new("formats", AttributeType::list(AttributeType::String))
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .build();

        assert_eq!(
            block.block.object_type().to_json(),
            serde_json::json!(["object", {
                "type": "string",
                "cos_file_upload_trigger": ["list", ["object", {"formats": ["list", "string"]}]]
            }])
        );
    }

    #[test]
    fn clone_keeps_plan_modifiers() {
        let attr = AttributeBuilder::new("flow_id", AttributeType::String)
            .required()
            .force_new()
            .build();
        assert_eq!(attr.clone().plan_modifiers.len(), 1);
    }

    #[test]
    fn cty_type_encoding() {
        assert_eq!(AttributeType::String.to_bytes(), b"\"string\"".to_vec());
        assert_eq!(
            AttributeType::set(AttributeType::Number).to_json(),
            serde_json::json!(["set", "number"])
        );
        let obj = AttributeType::Object(HashMap::from([
            ("ip".to_string(), AttributeType::String),
            ("port".to_string(), AttributeType::Number),
        ]));
        assert_eq!(
            obj.to_json(),
            serde_json::json!(["object", {"ip": "string", "port": "number"}])
        );
    }

    #[test]
    fn block_builder_single() {
        let block = BlockBuilder::new("video")
            .single()
            .required()
            .attribute(
                AttributeBuilder::new("codec", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();

        assert_eq!(block.nesting, NestingMode::List);
        assert_eq!(block.min_items, 1);
        assert_eq!(block.max_items, 1);
        assert!(block.block.attribute("codec").is_some());
    }

    #[test]
    fn conform_fills_missing_and_drops_unknown_keys() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .optional()
                    .build(),
            )
            .block(
                BlockBuilder::new("video")
                    .single()
                    .attribute(
                        AttributeBuilder::new("width", AttributeType::Number)
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .build();

        let value = Dynamic::Map(HashMap::from([
            ("id".to_string(), Dynamic::String("30".into())),
            ("extra".to_string(), Dynamic::Bool(true)),
        ]));

        let conformed = schema.block.conform(&value);
        let map = conformed.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["name"], Dynamic::Null);
        assert_eq!(map["video"], Dynamic::List(vec![]));
        assert!(!map.contains_key("extra"));
    }
}
