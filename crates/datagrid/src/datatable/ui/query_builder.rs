//! Visual query builder: rule lists <-> list filters.
//!
//! Builder operators have their own names (`contains`, `=`, `not_in`, ...);
//! the list endpoint receives the API names from [`FilterOperator`].

use contracts::datatable::{FilterExpr, FilterOperator, FilterValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::datatable::source::ListDataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Datetime,
}

/// A field the user can build rules on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterField {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FilterField {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: None,
            field_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    /// Builder name
    pub kind: &'static str,
    pub api: FilterOperator,
    pub nb_inputs: usize,
    pub multiple: bool,
    /// Field types the operator is offered for; empty means all
    pub apply_to: &'static [FieldType],
}

const STRING_ONLY: &[FieldType] = &[FieldType::String];
const EQUALITY: &[FieldType] = &[FieldType::String, FieldType::Number, FieldType::Boolean];
const ORDERED: &[FieldType] = &[FieldType::Number, FieldType::Datetime];
const NULLABLE: &[FieldType] = &[
    FieldType::Number,
    FieldType::String,
    FieldType::Datetime,
    FieldType::Boolean,
];

pub static OPERATORS: [OperatorSpec; 12] = [
    OperatorSpec { kind: "contains", api: FilterOperator::Like, nb_inputs: 1, multiple: false, apply_to: STRING_ONLY },
    OperatorSpec { kind: "not_contains", api: FilterOperator::Unlike, nb_inputs: 1, multiple: false, apply_to: STRING_ONLY },
    OperatorSpec { kind: "=", api: FilterOperator::Eq, nb_inputs: 1, multiple: false, apply_to: EQUALITY },
    OperatorSpec { kind: "!=", api: FilterOperator::Ne, nb_inputs: 1, multiple: false, apply_to: EQUALITY },
    OperatorSpec { kind: "<", api: FilterOperator::Lt, nb_inputs: 1, multiple: false, apply_to: ORDERED },
    OperatorSpec { kind: "<=", api: FilterOperator::Le, nb_inputs: 1, multiple: false, apply_to: ORDERED },
    OperatorSpec { kind: ">", api: FilterOperator::Gt, nb_inputs: 1, multiple: false, apply_to: ORDERED },
    OperatorSpec { kind: ">=", api: FilterOperator::Ge, nb_inputs: 1, multiple: false, apply_to: ORDERED },
    OperatorSpec { kind: "in", api: FilterOperator::In, nb_inputs: 1, multiple: true, apply_to: &[] },
    OperatorSpec { kind: "not_in", api: FilterOperator::Out, nb_inputs: 1, multiple: true, apply_to: &[] },
    OperatorSpec { kind: "between", api: FilterOperator::Between, nb_inputs: 2, multiple: false, apply_to: ORDERED },
    OperatorSpec { kind: "isnull", api: FilterOperator::IsNull, nb_inputs: 1, multiple: false, apply_to: NULLABLE },
];

pub fn operator_spec(api: FilterOperator) -> &'static OperatorSpec {
    OPERATORS
        .iter()
        .find(|spec| spec.api == api)
        .unwrap_or(&OPERATORS[2])
}

/// Builder operator name -> API operator
pub fn operator_to_api(kind: &str) -> Option<FilterOperator> {
    OPERATORS.iter().find(|spec| spec.kind == kind).map(|spec| spec.api)
}

/// API operator -> builder operator name
pub fn api_to_operator(api: FilterOperator) -> &'static str {
    operator_spec(api).kind
}

pub fn operators_for(field_type: FieldType) -> Vec<&'static OperatorSpec> {
    OPERATORS
        .iter()
        .filter(|spec| spec.apply_to.is_empty() || spec.apply_to.contains(&field_type))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRule {
    pub id: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unknown field {0}")]
    UnknownField(String),
    #[error("operator {operator} cannot be used on field {field}")]
    OperatorNotAllowed { field: String, operator: FilterOperator },
    #[error("field {0} needs a value")]
    EmptyValue(String),
    #[error("field {field} needs {expected} values")]
    WrongValueCount { field: String, expected: usize },
    #[error("field {field}: {value:?} is not a number")]
    InvalidNumber { field: String, value: String },
    #[error("field {field}: {value:?} is not a boolean")]
    InvalidBoolean { field: String, value: String },
}

/// Rules for the filters of known fields; other filters are left out
pub fn rules_from_filters(
    filters: &BTreeMap<String, String>,
    fields: &[FilterField],
) -> Vec<QueryRule> {
    filters
        .iter()
        .filter(|(key, _)| fields.iter().any(|f| &f.id == *key))
        .filter_map(|(key, raw)| match FilterExpr::parse(raw) {
            Ok(expr) => Some(QueryRule {
                id: key.clone(),
                operator: expr.operator,
                value: expr.value,
            }),
            Err(e) => {
                log::warn!("skipping filter {key}={raw:?}: {e}");
                None
            }
        })
        .collect()
}

pub fn validate(rules: &[QueryRule], fields: &[FilterField]) -> Result<(), RuleError> {
    for rule in rules {
        let field = fields
            .iter()
            .find(|f| f.id == rule.id)
            .ok_or_else(|| RuleError::UnknownField(rule.id.clone()))?;

        let spec = operator_spec(rule.operator);
        if !(spec.apply_to.is_empty() || spec.apply_to.contains(&field.field_type)) {
            return Err(RuleError::OperatorNotAllowed {
                field: rule.id.clone(),
                operator: rule.operator,
            });
        }

        let values = rule.value.values();
        if values.iter().all(|v| v.trim().is_empty()) {
            return Err(RuleError::EmptyValue(rule.id.clone()));
        }
        if spec.nb_inputs > 1 && values.len() != spec.nb_inputs {
            return Err(RuleError::WrongValueCount {
                field: rule.id.clone(),
                expected: spec.nb_inputs,
            });
        }

        if rule.operator == FilterOperator::IsNull {
            continue;
        }
        for value in values {
            match field.field_type {
                FieldType::Number if value.trim().parse::<f64>().is_err() => {
                    return Err(RuleError::InvalidNumber {
                        field: rule.id.clone(),
                        value: value.to_string(),
                    });
                }
                FieldType::Boolean if !matches!(value, "true" | "false") => {
                    return Err(RuleError::InvalidBoolean {
                        field: rule.id.clone(),
                        value: value.to_string(),
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

pub fn filters_from_rules(rules: &[QueryRule]) -> BTreeMap<String, String> {
    rules
        .iter()
        .map(|rule| {
            let expr = FilterExpr {
                operator: rule.operator,
                value: rule.value.clone(),
            };
            (rule.id.clone(), expr.to_wire())
        })
        .collect()
}

/// Validates `rules` and, if they pass, replaces the source's filters
pub async fn apply_to_source<T>(
    source: &ListDataSource<T>,
    rules: &[QueryRule],
    fields: &[FilterField],
) -> Result<bool, RuleError> {
    validate(rules, fields)?;
    Ok(source.set_filters(filters_from_rules(rules)).await)
}
