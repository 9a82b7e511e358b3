//! Resource change planning
//!
//! Terraform proposes a new state by merging configuration into prior state.
//! The provider then has to say which computed values will change (unknown)
//! and which attribute changes force replacement.

use crate::plan_modifier::values_equal;
use crate::schema::{Block, NestingMode, PlanModifierRequest, Schema};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Computes the planned state.
///
/// * destroy (`proposed` null): planned state is null
/// * create (`prior` null): computed attributes without configuration become unknown
/// * update: the same, but only when something actually changed, after which
///   plan modifiers may restore prior values or request replacement
pub fn plan_resource_change(
    schema: &Schema,
    prior: &DynamicValue,
    proposed: &DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    let mut change = PlannedChange {
        planned_state: DynamicValue::null(),
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };

    if proposed.is_null() {
        return change;
    }

    let creating = prior.is_null();
    let changed = creating || !values_equal(&prior.value, &proposed.value);

    let prior_value = (!creating).then_some(&prior.value);
    let planned = plan_block(
        &schema.block,
        prior_value,
        &proposed.value,
        &config.value,
        AttributePath::root(),
        changed,
        &mut change,
    );
    change.planned_state = DynamicValue::new(planned);
    change
}

fn plan_block(
    block: &Block,
    prior: Option<&Dynamic>,
    proposed: &Dynamic,
    config: &Dynamic,
    path: AttributePath,
    changed: bool,
    change: &mut PlannedChange,
) -> Dynamic {
    let Some(proposed_map) = proposed.as_map() else {
        return proposed.clone();
    };
    let prior_map = prior.and_then(Dynamic::as_map);
    let config_map = config.as_map();

    let mut planned: HashMap<String, Dynamic> = proposed_map.clone();

    for attr in &block.attributes {
        let attr_path = path.clone().attribute(&attr.name);
        let config_value = config_map
            .and_then(|m| m.get(&attr.name))
            .cloned()
            .unwrap_or(Dynamic::Null);
        let state_value = prior_map
            .and_then(|m| m.get(&attr.name))
            .cloned()
            .unwrap_or(Dynamic::Null);
        let mut value = proposed_map
            .get(&attr.name)
            .cloned()
            .unwrap_or(Dynamic::Null);

        if attr.computed && config_value.is_null() && changed {
            value = Dynamic::Unknown;
        }

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: DynamicValue::new(config_value.clone()),
                state_value: DynamicValue::new(state_value.clone()),
                plan_value: DynamicValue::new(value),
                path: attr_path.clone(),
            });
            value = response.plan_value.value;
            change.diagnostics.extend(response.diagnostics);
            if response.requires_replace && !change.requires_replace.contains(&attr_path) {
                change.requires_replace.push(attr_path.clone());
            }
        }

        planned.insert(attr.name.clone(), value);
    }

    for nested in &block.block_types {
        let nested_path = path.clone().attribute(&nested.type_name);
        let proposed_value = proposed_map
            .get(&nested.type_name)
            .cloned()
            .unwrap_or(Dynamic::Null);
        let prior_value = prior_map.and_then(|m| m.get(&nested.type_name));
        let config_value = config_map.and_then(|m| m.get(&nested.type_name));

        if nested.requires_replace {
            if let Some(prior_value) = prior_value {
                if proposed_value.is_fully_known() && !values_equal(prior_value, &proposed_value) {
                    change.requires_replace.push(nested_path.clone());
                }
            }
        }

        let planned_value = match (nested.nesting, &proposed_value) {
            (NestingMode::List | NestingMode::Set, Dynamic::List(items)) => {
                let prior_items = prior_value.and_then(Dynamic::as_list);
                let config_items = config_value.and_then(Dynamic::as_list);
                Dynamic::List(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| {
                            plan_block(
                                &nested.block,
                                prior_items.and_then(|l| l.get(i)),
                                item,
                                config_items
                                    .and_then(|l| l.get(i))
                                    .unwrap_or(&Dynamic::Null),
                                nested_path.clone().index(i as i64),
                                changed,
                                change,
                            )
                        })
                        .collect(),
                )
            }
            (NestingMode::Single | NestingMode::Group, Dynamic::Map(_)) => plan_block(
                &nested.block,
                prior_value,
                &proposed_value,
                config_value.unwrap_or(&Dynamic::Null),
                nested_path,
                changed,
                change,
            ),
            _ => proposed_value.clone(),
        };
        planned.insert(nested.type_name.clone(), planned_value);
    }

    Dynamic::Map(planned)
}
