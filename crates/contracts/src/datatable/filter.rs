//! Filter expressions in their `operator:value` wire form.
//!
//! A list endpoint receives one query parameter per filtered field, valued as
//! `operator:value`, or `operator:v1,v2,...` for the multi-valued operators
//! (`in`, `out`, `between`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("unknown filter operator: {0}")]
    UnknownOperator(String),
}

/// Comparison operators understood by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Like,
    Unlike,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    /// "not in"
    Out,
    Between,
    IsNull,
}

impl FilterOperator {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Like => "like",
            FilterOperator::Unlike => "unlike",
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Lt => "lt",
            FilterOperator::Le => "le",
            FilterOperator::Gt => "gt",
            FilterOperator::Ge => "ge",
            FilterOperator::In => "in",
            FilterOperator::Out => "out",
            FilterOperator::Between => "between",
            FilterOperator::IsNull => "isnull",
        }
    }

    /// Operators whose value is a comma-separated list
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self,
            FilterOperator::In | FilterOperator::Out | FilterOperator::Between
        )
    }

    pub fn all() -> [FilterOperator; 12] {
        [
            FilterOperator::Like,
            FilterOperator::Unlike,
            FilterOperator::Eq,
            FilterOperator::Ne,
            FilterOperator::Lt,
            FilterOperator::Le,
            FilterOperator::Gt,
            FilterOperator::Ge,
            FilterOperator::In,
            FilterOperator::Out,
            FilterOperator::Between,
            FilterOperator::IsNull,
        ]
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::all()
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterParseError::UnknownOperator(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Multi(Vec<String>),
}

impl FilterValue {
    /// Values as a list; a single value is a one-element list
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::Single(v) => vec![v.as_str()],
            FilterValue::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn to_wire(&self) -> String {
        match self {
            FilterValue::Single(v) => v.clone(),
            FilterValue::Multi(vs) => vs.join(","),
        }
    }
}

/// One predicate on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpr {
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterExpr {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: FilterValue::Single(value.into()),
        }
    }

    pub fn multi<I, S>(operator: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operator,
            value: FilterValue::Multi(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `operator:value` form sent to the server
    pub fn to_wire(&self) -> String {
        format!("{}:{}", self.operator, self.value.to_wire())
    }

    /// Parses the wire form. A string without `:` is an equality test on the
    /// whole string.
    pub fn parse(raw: &str) -> Result<Self, FilterParseError> {
        let Some((op, value)) = raw.split_once(':') else {
            return Ok(FilterExpr::new(FilterOperator::Eq, raw));
        };
        let operator: FilterOperator = op.parse()?;
        let value = if operator.is_multi_valued() {
            FilterValue::Multi(value.split(',').map(str::to_string).collect())
        } else {
            FilterValue::Single(value.to_string())
        };
        Ok(Self { operator, value })
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

impl FromStr for FilterExpr {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterExpr::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_value() {
        let expr = FilterExpr::parse("eq:active").unwrap();
        assert_eq!(expr, FilterExpr::new(FilterOperator::Eq, "active"));
        assert_eq!(expr.to_wire(), "eq:active");
    }

    #[test]
    fn test_parse_multi_value() {
        let expr = FilterExpr::parse("between:1,10").unwrap();
        assert_eq!(expr.operator, FilterOperator::Between);
        assert_eq!(expr.value.values(), vec!["1", "10"]);
        assert_eq!(expr.to_wire(), "between:1,10");

        let expr = FilterExpr::parse("out:a,b,c").unwrap();
        assert_eq!(expr, FilterExpr::multi(FilterOperator::Out, ["a", "b", "c"]));
    }

    #[test]
    fn test_value_keeps_extra_colons() {
        let expr = FilterExpr::parse("like:12:30").unwrap();
        assert_eq!(expr, FilterExpr::new(FilterOperator::Like, "12:30"));
    }

    #[test]
    fn test_without_operator_means_eq() {
        let expr = FilterExpr::parse("hello").unwrap();
        assert_eq!(expr, FilterExpr::new(FilterOperator::Eq, "hello"));
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            FilterExpr::parse("approx:5"),
            Err(FilterParseError::UnknownOperator("approx".to_string()))
        );
    }

    #[test]
    fn test_operator_names() {
        for op in FilterOperator::all() {
            assert_eq!(op.as_str().parse::<FilterOperator>().unwrap(), op);
        }
        assert_eq!(
            serde_json::to_string(&FilterOperator::IsNull).unwrap(),
            "\"isnull\""
        );
    }
}
