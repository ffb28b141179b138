//! Edge conditions evaluated at decision nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::common::Vars;

/// Field that resolves to the action being taken rather than a variable.
pub const ACTION_FIELD: &str = "action";

/// Comparison operator, accepted by name or symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
pub enum Operator {
    #[strum(serialize = "equals", serialize = "==")]
    Equals,
    #[strum(serialize = "not_equals", serialize = "!=")]
    NotEquals,
    #[strum(serialize = "greater_than", serialize = ">")]
    GreaterThan,
    #[strum(serialize = "less_than", serialize = "<")]
    LessThan,
    #[strum(serialize = "contains")]
    Contains,
    #[strum(serialize = "in")]
    In,
}

/// `{field, operator, value}` triple attached to an edge.
///
/// The operator is kept as written so definitions round-trip even when they
/// carry an operator this engine does not know; such conditions never hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(
        field: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.into(),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator.parse().ok()
    }

    /// Evaluates against the action being taken and the execution variables.
    ///
    /// A field other than `action` that is missing from `vars` is false, as is
    /// an unknown operator.
    pub fn evaluate(
        &self,
        action: &str,
        vars: &Vars,
    ) -> bool {
        let Some(operator) = self.operator() else {
            warn!(operator = %self.operator, field = %self.field, "unknown condition operator, treating as false");
            return false;
        };

        let action_value;
        let actual = if self.field == ACTION_FIELD {
            action_value = Value::String(action.to_string());
            &action_value
        } else {
            match vars.get_value(&self.field) {
                Some(v) => v,
                None => return false,
            }
        };

        match operator {
            Operator::Equals => loose_eq(actual, &self.value),
            Operator::NotEquals => !loose_eq(actual, &self.value),
            Operator::GreaterThan => cmp_numbers(actual, &self.value, |a, b| a > b),
            Operator::LessThan => cmp_numbers(actual, &self.value, |a, b| a < b),
            Operator::Contains => coerce_str(actual).contains(&coerce_str(&self.value)),
            Operator::In => match &self.value {
                Value::Array(items) => items.iter().any(|item| loose_eq(actual, item)),
                _ => false,
            },
        }
    }
}

/// String form used for substring and loose comparisons; strings are unquoted.
fn coerce_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Equal when the JSON values match, or when numbers and numeric strings agree
/// (`5 == "5"`), or when both render to the same scalar text.
fn loose_eq(
    a: &Value,
    b: &Value,
) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            matches!((coerce_number(a), coerce_number(b)), (Some(x), Some(y)) if x == y)
        }
        (Value::Bool(_), Value::String(_)) | (Value::String(_), Value::Bool(_)) => coerce_str(a) == coerce_str(b),
        _ => false,
    }
}

fn cmp_numbers<F>(
    actual: &Value,
    expected: &Value,
    cmp: F,
) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (coerce_number(actual), coerce_number(expected)) {
        (Some(a), Some(e)) => cmp(a, e),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn vars() -> Vars {
        Vars::new().with("amount", 1500).with("category", "urgent-finance").with("score", "42").with("approved", true)
    }

    #[test]
    fn test_action_field() {
        let c = Condition::new("action", "equals", "approve");
        assert!(c.evaluate("approve", &Vars::new()));
        assert!(!c.evaluate("reject", &Vars::new()));

        let c = Condition::new("action", "!=", "approve");
        assert!(c.evaluate("reject", &Vars::new()));
    }

    #[test]
    fn test_symbol_and_name_aliases() {
        let v = vars();
        assert!(Condition::new("amount", ">", 1000).evaluate("x", &v));
        assert!(Condition::new("amount", "greater_than", 1000).evaluate("x", &v));
        assert!(Condition::new("amount", "<", 2000).evaluate("x", &v));
        assert!(!Condition::new("amount", "less_than", 1500).evaluate("x", &v));
        assert!(Condition::new("amount", "==", 1500).evaluate("x", &v));
    }

    #[test]
    fn test_numeric_coercion() {
        let v = vars();
        assert!(Condition::new("score", "greater_than", 40).evaluate("x", &v));
        assert!(Condition::new("amount", "equals", "1500").evaluate("x", &v));
        assert!(!Condition::new("category", "greater_than", 1).evaluate("x", &v));
    }

    #[test]
    fn test_contains_and_in() {
        let v = vars();
        assert!(Condition::new("category", "contains", "finance").evaluate("x", &v));
        assert!(Condition::new("amount", "contains", "50").evaluate("x", &v));
        assert!(Condition::new("action", "in", json!(["approve", "forward"])).evaluate("forward", &v));
        assert!(!Condition::new("action", "in", json!(["approve"])).evaluate("reject", &v));
        assert!(!Condition::new("action", "in", "approve").evaluate("approve", &v));
    }

    #[test]
    fn test_missing_field_is_false() {
        let v = vars();
        assert!(!Condition::new("unknown", "equals", json!(null)).evaluate("x", &v));
        assert!(!Condition::new("unknown", "not_equals", 1).evaluate("x", &v));
    }

    #[test]
    fn test_unknown_operator_is_false() {
        let v = vars();
        let c = Condition::new("amount", "between", json!([1, 2000]));
        assert_eq!(c.operator(), None);
        assert!(!c.evaluate("x", &v));
    }

    #[test]
    fn test_bool_against_string() {
        let v = vars();
        assert!(Condition::new("approved", "equals", "true").evaluate("x", &v));
        assert!(Condition::new("approved", "equals", true).evaluate("x", &v));
    }

    #[test]
    fn test_condition_serde_default_value() {
        let c: Condition = serde_json::from_value(json!({"field": "action", "operator": "equals"})).unwrap();
        assert_eq!(c.value, Value::Null);
    }
}
