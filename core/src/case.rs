//! Key-naming translation between the UI convention (camelCase) and the
//! wire convention (snake_case).
//!
//! # Rules
//! - UI → wire: an ASCII uppercase letter that is not the first character
//!   becomes `_` followed by its lowercase form (`addressId` → `address_id`).
//! - wire → UI: an `_` that is not the first character and is followed by an
//!   ASCII lowercase letter is dropped and the letter uppercased
//!   (`address_id` → `addressId`).
//! - Keys with no internal word boundary are returned unchanged.
//!
//! # Round trip
//! `keys_to_ui(keys_to_wire(v)) == v` holds for every object whose keys are
//! already valid camelCase. It breaks for UI keys that contain `_` followed
//! by a lowercase letter (`address_id` would come back as `addressId`) and
//! when two distinct UI keys collapse to one wire key (`aB` and `a_b` both
//! become `a_b`); in that case the later key in iteration order wins.

use serde_json::{Map, Value};

/// Convert a single camelCase key to snake_case.
pub fn to_wire_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert a single snake_case key to camelCase.
pub fn to_ui_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().enumerate().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch == '_' && i > 0 {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

/// Rewrite every object key in `value` to the wire convention.
pub fn keys_to_wire(value: Value) -> Value {
    rename_keys(value, &to_wire_key)
}

/// Rewrite every object key in `value` to the UI convention.
pub fn keys_to_ui(value: Value) -> Value {
    rename_keys(value, &to_ui_key)
}

fn rename_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(rename(&key), rename_keys(inner, rename));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(|v| rename_keys(v, rename)).collect()),
        primitive => primitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_keys() {
        assert_eq!(to_wire_key("addressId"), "address_id");
        assert_eq!(to_wire_key("rentIncreasePercentage"), "rent_increase_percentage");
        assert_eq!(to_ui_key("first_name"), "firstName");
        assert_eq!(to_ui_key("current_version_id"), "currentVersionId");
    }

    #[test]
    fn keys_without_boundaries_are_untouched() {
        for key in ["id", "rent", "deposit", "Type", "_id", "trailing_", "line_1"] {
            assert_eq!(to_ui_key(key), key);
        }
        for key in ["id", "rent", "Foo", "_private"] {
            assert_eq!(to_wire_key(key), key);
        }
    }

    #[test]
    fn nested_structures_are_preserved() {
        let wire = json!({
            "id": "c1",
            "tenant": {"first_name": "Ana", "address": {"zip_code": "01000"}},
            "versions": [{"version_number": 1, "special_terms": null}, {"version_number": 2}],
            "tags": ["keep_me", 3, true]
        });
        let ui = keys_to_ui(wire);
        assert_eq!(
            ui,
            json!({
                "id": "c1",
                "tenant": {"firstName": "Ana", "address": {"zipCode": "01000"}},
                "versions": [{"versionNumber": 1, "specialTerms": null}, {"versionNumber": 2}],
                "tags": ["keep_me", 3, true]
            })
        );
    }

    #[test]
    fn camel_case_round_trip() {
        let ui = json!({
            "landlordId": "l1",
            "referenceIds": ["r1", "r2"],
            "currentVersion": {"startDate": "2024-01-01", "rent": 1200.5},
            "aBC": 1
        });
        assert_eq!(keys_to_ui(keys_to_wire(ui.clone())), ui);
    }

    #[test]
    fn colliding_keys_collapse_on_the_wire() {
        let ui = json!({"aB": 1, "a_b": 2});
        let wire = keys_to_wire(ui);
        assert_eq!(wire.as_object().map(|m| m.len()), Some(1));
        assert!(wire.get("a_b").is_some());
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(keys_to_wire(json!("someString")), json!("someString"));
        assert_eq!(keys_to_ui(json!(null)), json!(null));
        assert_eq!(keys_to_ui(json!([1, 2.5, false])), json!([1, 2.5, false]));
    }
}
