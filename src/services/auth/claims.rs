//! Claim mapping read from a verified token payload, and the per-route requirement
//! checked against it.
//!
//! Comparison is deliberately loose: the expected value is a string, and a scalar
//! claim matches when its canonical string rendering is exactly that string. This
//! keeps `("admin", "true")` working for tokens that carry `"admin": true` as well as
//! `"admin": "true"`. It is a compatibility rule for existing tokens, not a typing ideal.
use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Str(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    // arrays and objects (e.g. `aud: [..]`); carried through, never matched
    Structured(Value),
}

impl ClaimValue {
    /// String form used for requirement matching. `None` for non-scalars.
    pub fn as_comparable(&self) -> Option<Cow<'_, str>> {
        match self {
            ClaimValue::Str(s) => Some(Cow::Borrowed(s.as_str())),
            ClaimValue::Number(n) => Some(Cow::Owned(n.to_string())),
            ClaimValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            ClaimValue::Null | ClaimValue::Structured(_) => None,
        }
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ClaimValue::Str(s),
            Value::Number(n) => ClaimValue::Number(n),
            Value::Bool(b) => ClaimValue::Bool(b),
            Value::Null => ClaimValue::Null,
            other => ClaimValue::Structured(other),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("token payload is not a claim mapping")]
    NotAMapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, ClaimValue>);

impl ClaimSet {
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Missing claims never satisfy a requirement.
    pub fn satisfies(&self, requirement: &ClaimRequirement) -> bool {
        self.get(&requirement.name)
            .and_then(ClaimValue::as_comparable)
            .is_some_and(|actual| actual == requirement.value)
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = ClaimsError;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        match payload {
            Value::Object(map) => Ok(Self(
                map.into_iter()
                    .map(|(k, v)| (k, ClaimValue::from(v)))
                    .collect(),
            )),
            _ => Err(ClaimsError::NotAMapping),
        }
    }
}

/// `(claim, expected value)` bound to one guard when the route is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequirement {
    name: String,
    value: String,
}

impl ClaimRequirement {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}
