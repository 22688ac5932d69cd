// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text coercion for primitive children.
//!
//! Children that are not virtual nodes are rendered as the text content of
//! their parent host node. The conversion follows these rules:
//!
//! - an array with more than one element concatenates its elements with no
//!   separator, JSON-encoding the structured ones (arrays, objects);
//! - an empty array yields empty text;
//! - a one-element array is JSON-encoded as a whole with every `,` removed;
//! - a bare object is JSON-encoded;
//! - scalars are used as-is, with `null` rendering as empty text.

use alloc::string::{String, ToString};

use serde_json::Value;

/// Converts a primitive children value into host text content.
#[must_use]
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Array(items) => match items.len() {
            0 => String::new(),
            1 => to_json(value).replace(',', ""),
            _ => items
                .iter()
                .map(|item| {
                    if is_structured(item) {
                        to_json(item)
                    } else {
                        scalar_text(item)
                    }
                })
                .collect(),
        },
        Value::Object(_) => to_json(value),
        scalar => scalar_text(scalar),
    }
}

/// Arrays and objects are encoded as JSON; everything else is a scalar.
fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn to_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Integral floats print without a trailing `.0`.
            Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => {
                alloc::format!("{f}")
            }
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => to_json(value),
    }
}
