//! Built-in attribute validators and configuration validation

use crate::schema::{Block, NestingMode, Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Accepts only one of a fixed set of strings
pub struct StringOneOf {
    values: Vec<String>,
}

impl StringOneOf {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.values.join(", "))
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Some(s) = request.config_value.value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!("Expected one of [{}], got \"{}\"", self.values.join(", "), s),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

/// Accepts strings matching a regular expression
pub struct StringPattern {
    pattern: Result<regex::Regex, regex::Error>,
    description: String,
}

impl StringPattern {
    /// `description` names the expected shape in diagnostics
    pub fn new(pattern: &str, description: impl Into<String>) -> Self {
        Self {
            pattern: regex::Regex::new(pattern),
            description: description.into(),
        }
    }
}

impl Validator for StringPattern {
    fn description(&self) -> String {
        format!("value must match {}", self.description)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        let Some(s) = request.config_value.value.as_str() else {
            return response;
        };
        match &self.pattern {
            Ok(pattern) if pattern.is_match(s) => {}
            Ok(_) => response.diagnostics.push(
                Diagnostic::error(
                    format!("{} must match {}", request.path, self.description),
                    format!("Value \"{}\" does not match the pattern", s),
                )
                .with_attribute(request.path),
            ),
            Err(e) => response.diagnostics.push(
                Diagnostic::error("Invalid validator pattern", e.to_string())
                    .with_attribute(request.path),
            ),
        }
        response
    }
}

pub struct StringLength {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLength {
    fn description(&self) -> String {
        format!("string length must be within {:?}..{:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Some(s) = request.config_value.value.as_str() {
            let len = s.chars().count();
            if let Some(min) = self.min.filter(|min| len < *min) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have minimum length of {}", request.path, min),
                        format!("Got length {}", len),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
            if let Some(max) = self.max.filter(|max| len > *max) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have maximum length of {}", request.path, max),
                        format!("Got length {}", len),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRange {
    fn description(&self) -> String {
        format!("number must be within {:?}..={:?}", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Some(n) = request.config_value.value.as_f64() {
            if let Some(min) = self.min.filter(|min| n < *min) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at least {}", request.path, min),
                        format!("Got {}", n),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
            if let Some(max) = self.max.filter(|max| n > *max) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at most {}", request.path, max),
                        format!("Got {}", n),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

pub struct ListLength {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for ListLength {
    fn description(&self) -> String {
        format!("list must hold {:?}..={:?} items", self.min, self.max)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut response = ValidatorResponse::default();
        if let Some(items) = request.config_value.value.as_list() {
            if let Some(min) = self.min.filter(|min| items.len() < *min) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have at least {} items", request.path, min),
                        format!("Got {} items", items.len()),
                    )
                    .with_attribute(request.path.clone()),
                );
            }
            if let Some(max) = self.max.filter(|max| items.len() > *max) {
                response.diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have at most {} items", request.path, max),
                        format!("Got {} items", items.len()),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        response
    }
}

/// Runs every attribute validator in `block` against `config`, descending into
/// nested blocks. Unknown and null values are skipped; Terraform validates again
/// once they are known.
pub fn validate_config(block: &Block, config: &Dynamic) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(block, config, AttributePath::root(), &mut diagnostics);
    diagnostics
}

fn validate_block(
    block: &Block,
    value: &Dynamic,
    path: AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(map) = value.as_map() else {
        return;
    };

    for attr in &block.attributes {
        let Some(v) = map.get(&attr.name) else {
            continue;
        };
        if v.is_null() || !v.is_fully_known() {
            continue;
        }
        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(v.clone()),
                path: path.clone().attribute(&attr.name),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    for nested in &block.block_types {
        let nested_path = path.clone().attribute(&nested.type_name);
        match (nested.nesting, map.get(&nested.type_name)) {
            (NestingMode::List | NestingMode::Set, Some(Dynamic::List(items))) => {
                let count = items.len() as i64;
                if nested.max_items > 0 && count > nested.max_items {
                    diagnostics.push(
                        Diagnostic::error(
                            "Too many blocks",
                            format!(
                                "No more than {} \"{}\" blocks are allowed",
                                nested.max_items, nested.type_name
                            ),
                        )
                        .with_attribute(nested_path.clone()),
                    );
                }
                for (i, item) in items.iter().enumerate() {
                    validate_block(&nested.block, item, nested_path.clone().index(i as i64), diagnostics);
                }
            }
            (NestingMode::Single | NestingMode::Group, Some(item)) => {
                validate_block(&nested.block, item, nested_path, diagnostics);
            }
            _ => {}
        }
    }
}
