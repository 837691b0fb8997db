//! Conversion between condition trees and JSON values.
//!
//! Groups become objects, leaves become row-major arrays of rows. Key
//! order inside a JSON object is not guaranteed by every consumer, so
//! loading rebuilds the tree from the serialized `__order` list and pack
//! order survives a round trip.

use crate::{ResultsError, ResultsResult};
use am_mission::{Conditions, Node};
use nalgebra::DMatrix;
use serde_json::{json, Map, Value};

/// Serialize a condition tree to JSON.
pub fn conditions_to_json(conditions: &Conditions) -> Value {
    let mut object = Map::new();
    let mut order = Vec::new();

    for (name, node) in conditions.entries() {
        order.push(Value::String(name.to_string()));
        let value = match node {
            Node::Group(group) => conditions_to_json(group),
            Node::Field(matrix) => {
                let rows: Vec<Value> = (0..matrix.nrows())
                    .map(|i| {
                        Value::Array(
                            (0..matrix.ncols())
                                .map(|j| json!(matrix[(i, j)]))
                                .collect(),
                        )
                    })
                    .collect();
                Value::Array(rows)
            }
        };
        object.insert(name.to_string(), value);
    }

    object.insert("__order".to_string(), Value::Array(order));
    Value::Object(object)
}

/// Rebuild a condition tree from JSON produced by `conditions_to_json`.
pub fn conditions_from_json(value: &Value) -> ResultsResult<Conditions> {
    let object = value.as_object().ok_or_else(|| malformed("not an object"))?;
    let order = object
        .get("__order")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("missing __order"))?;

    let mut conditions = Conditions::new();
    for key in order {
        let name = key.as_str().ok_or_else(|| malformed("non-string key"))?;
        let entry = object
            .get(name)
            .ok_or_else(|| malformed("ordered key missing from object"))?;

        match entry {
            Value::Object(_) => {
                let group = conditions_from_json(entry)?;
                graft_group(&mut conditions, name, group)?;
            }
            Value::Array(rows) => {
                let matrix = rows_to_matrix(rows)?;
                conditions
                    .set_field(&[name], matrix)
                    .map_err(|e| malformed(&e.to_string()))?;
            }
            _ => return Err(malformed("entry is neither group nor field")),
        }
    }
    Ok(conditions)
}

fn graft_group(parent: &mut Conditions, name: &str, group: Conditions) -> ResultsResult<()> {
    let slot = parent
        .group_mut(name)
        .map_err(|e| malformed(&e.to_string()))?;
    *slot = group;
    Ok(())
}

fn rows_to_matrix(rows: &[Value]) -> ResultsResult<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows
        .first()
        .and_then(|r| r.as_array())
        .map(|r| r.len())
        .unwrap_or(0);

    let mut matrix = DMatrix::zeros(nrows, ncols);
    for (i, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or_else(|| malformed("row not an array"))?;
        if cells.len() != ncols {
            return Err(malformed("ragged field rows"));
        }
        for (j, cell) in cells.iter().enumerate() {
            matrix[(i, j)] = cell
                .as_f64()
                .ok_or_else(|| malformed("non-numeric cell"))?;
        }
    }
    Ok(matrix)
}

fn malformed(message: &str) -> ResultsError {
    ResultsError::MalformedSnapshot {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Conditions {
        let mut c = Conditions::new();
        c.set_field(
            &["frames", "inertial", "velocity_vector"],
            DMatrix::from_fn(3, 3, |i, j| (i * 3 + j) as f64),
        )
        .unwrap();
        c.set_field(&["freestream", "altitude"], DMatrix::from_element(3, 1, 1524.0))
            .unwrap();
        c
    }

    #[test]
    fn json_round_trip_preserves_tree_and_order() {
        let original = sample();
        let value = conditions_to_json(&original);
        let rebuilt = conditions_from_json(&value).unwrap();
        assert_eq!(original, rebuilt);
        assert_eq!(original.leaves(), rebuilt.leaves());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let err = conditions_from_json(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ResultsError::MalformedSnapshot { .. }));
    }
}
