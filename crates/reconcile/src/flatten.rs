//! Canonical flattening of nested snapshots
//!
//! A snapshot is any JSON-shaped value. Flattening turns it into one
//! `dotted.path=value` line per leaf and sorts the lines, so two snapshots
//! that differ only in map key order or array order flatten identically.
//!
//! Array elements that are objects with a string `name` field get that name
//! pushed onto the path. This lets named members (manifests in a manifest
//! list, instance groups, jobs) line up across snapshots by name instead of
//! by position. Other array elements share their parent's path, so a list of
//! scalars becomes repeated lines under the same key.

use serde_json::Value;

/// Flatten a snapshot into sorted `path=value` lines (without newlines)
///
/// Empty objects and arrays contribute no lines.
pub fn flatten_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let mut path = Vec::new();
    walk(value, &mut path, &mut lines);
    lines.sort_unstable();
    lines
}

/// Flatten a snapshot into a single string, one newline-terminated line per leaf
pub fn flatten(value: &Value) -> String {
    flatten_lines(value)
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}

fn walk(value: &Value, path: &mut Vec<String>, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk(child, path, lines);
                path.pop();
            }
        }
        Value::Array(items) => {
            for item in items {
                let label = name_label(item);
                let pushed = label.is_some();
                if let Some(label) = label {
                    path.push(label);
                }
                walk(item, path, lines);
                if pushed {
                    path.pop();
                }
            }
        }
        scalar => lines.push(format!("{}={}", path.join("."), scalar_text(scalar))),
    }
}

/// The `name` of an array element, if it is an object exposing one as a string
fn name_label(item: &Value) -> Option<String> {
    item.as_object()?
        .get("name")?
        .as_str()
        .map(ToString::to_string)
}

/// Literal text of a scalar; embedded newlines are dropped
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.replace('\n', ""),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(_) | Value::Array(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[test]
    fn test_flatten_simple() {
        let data = json!({ "a": { "field": "value1" } });
        assert_eq!(flatten(&data), "a.field=value1\n");
    }

    #[test]
    fn test_flatten_ignores_key_order() {
        let a: Value =
            serde_json::from_str(r#"{"z": 1, "a": {"y": true, "b": "x"}, "m": [1, 2]}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"m": [2, 1], "a": {"b": "x", "y": true}, "z": 1}"#).unwrap();
        assert_eq!(flatten_lines(&a), flatten_lines(&b));
    }

    #[test]
    fn test_flatten_promotes_array_names() {
        let forward = json!([
            { "name": "a", "field": "x" },
            { "name": "b", "field": "y" }
        ]);
        let reversed = json!([
            { "name": "b", "field": "y" },
            { "name": "a", "field": "x" }
        ]);

        let lines = flatten_lines(&forward);
        assert_eq!(lines, vec!["a.field=x", "a.name=a", "b.field=y", "b.name=b"]);
        assert_eq!(lines, flatten_lines(&reversed));
    }

    #[test]
    fn test_flatten_non_string_name_is_not_promoted() {
        let data = json!({ "items": [{ "name": 7, "field": "x" }] });
        assert_eq!(flatten_lines(&data), vec!["items.field=x", "items.name=7"]);
    }

    #[test]
    fn test_flatten_scalar_array_repeats_path() {
        let data = json!({ "properties": { "fun": ["TOM", "JAMES", "GARIMA"] } });
        assert_eq!(
            flatten(&data),
            "properties.fun=GARIMA\nproperties.fun=JAMES\nproperties.fun=TOM\n"
        );
    }

    #[test]
    fn test_flatten_scalar_types() {
        let data = json!({
            "properties": {
                "port": 13322,
                "height": 133.222,
                "fun": true,
                "semver": "1.0.14",
                "unset": null
            }
        });
        assert_eq!(
            flatten_lines(&data),
            vec![
                "properties.fun=true",
                "properties.height=133.222",
                "properties.port=13322",
                "properties.semver=1.0.14",
                "properties.unset=null",
            ]
        );
    }

    #[test]
    fn test_flatten_strips_newlines() {
        let data = json!({
            "forwarder": { "ca_cert": "-----BEGIN CERTIFICATE-----\nMIIC+zCC\nMA4GA1UE" }
        });
        assert_eq!(
            flatten(&data),
            "forwarder.ca_cert=-----BEGIN CERTIFICATE-----MIIC+zCCMA4GA1UE\n"
        );
    }

    #[test]
    fn test_flatten_empty_collections_are_invisible() {
        let data = json!({ "a": {}, "b": [], "c": { "d": [] } });
        assert!(flatten_lines(&data).is_empty());
        assert_eq!(flatten(&data), "");
    }

    #[test]
    fn test_flatten_struct_uses_wire_names() {
        #[derive(Serialize)]
        struct Inner {
            #[serde(rename = "Name")]
            name: String,
            #[serde(rename = "Phone")]
            phone: String,
        }

        #[derive(Serialize)]
        struct Outer {
            #[serde(rename = "Person")]
            person: Vec<Inner>,
            #[serde(rename = "Birthday")]
            birthday: String,
        }

        let data = Outer {
            person: vec![
                Inner {
                    name: "james".to_string(),
                    phone: "whatevs".to_string(),
                },
                Inner {
                    name: "Tom".to_string(),
                    phone: "yokey".to_string(),
                },
            ],
            birthday: "whenevs".to_string(),
        };

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            flatten(&value),
            "Birthday=whenevs\n\
             Person.Name=Tom\n\
             Person.Name=james\n\
             Person.Phone=whatevs\n\
             Person.Phone=yokey\n"
        );
    }
}
