//! Mission rule expressions
//!
//! A rule is a short textual predicate stored on each daily mission, e.g.
//! `daily_places_scanned>=5` or the bare key `visit_new_place`. Parsing is
//! infallible: input that carries no operator becomes a presence-style
//! predicate, and a key that never matches the context simply evaluates
//! false. Evaluation is pure; all backend interaction stays in the mission
//! layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Category;

/// Comparison operator inside a rule expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `==` or `=`
    Eq,
}

/// Operator tokens in scan order: two-character operators must be tried
/// before their one-character prefixes.
const SCAN_ORDER: [(&str, Operator); 6] = [
    (">=", Operator::Ge),
    ("<=", Operator::Le),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("==", Operator::Eq),
    ("=", Operator::Eq),
];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Eq => "==",
        }
    }

    /// Apply the operator to a context value and a rule target.
    ///
    /// Ordering operators coerce both sides numerically (non-numeric → 0);
    /// equality compares numerically when both sides parse as numbers and
    /// textually otherwise.
    pub fn compare(&self, lhs: &Value, rhs: &Value) -> bool {
        match self {
            Operator::Ge => lhs.as_number() >= rhs.as_number(),
            Operator::Le => lhs.as_number() <= rhs.as_number(),
            Operator::Gt => lhs.as_number() > rhs.as_number(),
            Operator::Lt => lhs.as_number() < rhs.as_number(),
            Operator::Eq => match (lhs.try_number(), rhs.try_number()) {
                (Some(a), Some(b)) => a == b,
                _ => lhs.as_text() == rhs.as_text(),
            },
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule or context value: numeric when it parses as a finite number,
/// textual otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw token, preferring a finite numeric reading
    pub fn parse(raw: &str) -> Value {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Best-effort numeric coercion; non-numeric text is 0
    pub fn as_number(&self) -> f64 {
        self.try_number().unwrap_or(0.0)
    }

    fn try_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Value::Number(n) => {
                // Integral numbers print without a trailing ".0" so that
                // Number(5) compares equal to Text("5").
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Parsed rule expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// `<key><operator><value>`
    Comparison {
        key: String,
        op: Operator,
        value: Value,
    },
    /// Bare key with no operator, e.g. `visit_new_place`
    Predicate { key: String },
}

impl Rule {
    /// Parse a rule expression. Never fails: the worst case is a predicate
    /// whose key matches nothing in the context.
    pub fn parse(raw: &str) -> Rule {
        for (token, op) in SCAN_ORDER {
            if let Some(pos) = raw.find(token) {
                let key = raw[..pos].trim().to_string();
                let value = Value::parse(&raw[pos + token.len()..]);
                return Rule::Comparison { key, op, value };
            }
        }
        Rule::Predicate {
            key: raw.trim().to_string(),
        }
    }

    /// Rule key (left-hand side)
    pub fn key(&self) -> &str {
        match self {
            Rule::Comparison { key, .. } => key,
            Rule::Predicate { key } => key,
        }
    }
}

/// Ephemeral evaluation context, constructed fresh per check-in and never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct CheckInContext {
    /// Whether the scanned place was new to the user's today-set
    pub new_place_visited: bool,
    /// Category of the scanned place
    pub local_category: Option<Category>,
    /// Daily scanned count after the current scan is registered
    pub daily_places_scanned: u32,
    /// Additional context entries for generic comparisons
    pub extra: HashMap<String, Value>,
}

impl CheckInContext {
    /// Look up a context entry by rule key
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "newPlaceVisited" => Some(Value::Number(if self.new_place_visited {
                1.0
            } else {
                0.0
            })),
            "localCategory" => self
                .local_category
                .map(|c| Value::Text(c.as_str().to_string())),
            "daily_places_scanned" => Some(Value::Number(self.daily_places_scanned as f64)),
            _ => self.extra.get(key).cloned(),
        }
    }
}
