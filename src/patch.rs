use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PatchError, PatchErrorKind};
use crate::ops;
use crate::pointer::Pointer;
use crate::resolve::evaluate_mut;

/// `add` operation: set (or overwrite) the value at `path`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AddOperation {
    /// Location to add the value at.
    pub path: Pointer,
    /// Value to add.
    pub value: Value,
}

/// `remove` operation: delete the value at `path`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RemoveOperation {
    /// Location to remove.
    pub path: Pointer,
}

/// `replace` operation: overwrite an existing value at `path`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReplaceOperation {
    /// Location to replace.
    pub path: Pointer,
    /// Replacement value.
    pub value: Value,
}

/// `move` operation: detach the value at `from` and add it at `path`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MoveOperation {
    /// Location to move the value from.
    pub from: Pointer,
    /// Location to move the value to.
    pub path: Pointer,
}

/// `copy` operation: deep-copy the value at `from` and add the copy at `path`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CopyOperation {
    /// Location to copy the value from.
    pub from: Pointer,
    /// Location to add the copy at.
    pub path: Pointer,
}

/// `test` operation: fail the patch unless the value at `path` structurally equals `value`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TestOperation {
    /// Location to test.
    pub path: Pointer,
    /// Expected value.
    pub value: Value,
}

/// A single RFC 6902 patch operation.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "op")]
#[serde(rename_all = "lowercase")]
pub enum PatchOperation {
    /// `add`
    Add(AddOperation),
    /// `remove`
    Remove(RemoveOperation),
    /// `replace`
    Replace(ReplaceOperation),
    /// `move`
    Move(MoveOperation),
    /// `copy`
    Copy(CopyOperation),
    /// `test`
    Test(TestOperation),
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
        } else {
            write!(f, "{}", serde_json::to_string(self).map_err(|_| fmt::Error)?)
        }
    }
}

/// An ordered sequence of [`PatchOperation`]s, as described by RFC 6902.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Patch(pub Vec<PatchOperation>);

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?)
        } else {
            write!(f, "{}", serde_json::to_string(self).map_err(|_| fmt::Error)?)
        }
    }
}

impl Patch {
    /// Parses a patch from an already-decoded JSON value (the top-level array).
    ///
    /// Unlike a plain `serde_json` deserialization, failures carry the index of the
    /// offending operation and, where applicable, the name of the missing field.
    pub fn from_value(value: Value) -> Result<Patch, PatchError> {
        let elements = match value {
            Value::Array(elements) => elements,
            _ => return Err(PatchError::new(PatchErrorKind::InvalidPatchFormat)),
        };
        let mut operations = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            operations.push(parse_operation(index, element)?);
        }
        Ok(Patch(operations))
    }

    /// Parses a patch from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Patch, PatchError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|_| PatchError::new(PatchErrorKind::InvalidPatchFormat))?;
        Patch::from_value(value)
    }

    /// Serializes this patch back to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("a Patch built from valid operations always serializes")
    }

    /// Serializes this patch to JSON bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("a Patch built from valid operations always serializes")
    }

    /// The operations that make up this patch, in application order.
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }
}

fn parse_operation(index: usize, element: Value) -> Result<PatchOperation, PatchError> {
    let mut object = match element {
        Value::Object(object) => object,
        _ => return Err(PatchError::new(PatchErrorKind::InvalidPatchFormat)),
    };
    let op = match object.get("op") {
        Some(Value::String(op)) => op.clone(),
        _ => return Err(PatchError::new(PatchErrorKind::InvalidPatchFormat)),
    };

    match op.as_str() {
        "add" => Ok(PatchOperation::Add(AddOperation {
            path: require_pointer(&object, "path", "add", index)?,
            value: require_value(&mut object, "value", "add", index)?,
        })),
        "remove" => Ok(PatchOperation::Remove(RemoveOperation {
            path: require_pointer(&object, "path", "remove", index)?,
        })),
        "replace" => Ok(PatchOperation::Replace(ReplaceOperation {
            path: require_pointer(&object, "path", "replace", index)?,
            value: require_value(&mut object, "value", "replace", index)?,
        })),
        "move" => Ok(PatchOperation::Move(MoveOperation {
            from: require_pointer(&object, "from", "move", index)?,
            path: require_pointer(&object, "path", "move", index)?,
        })),
        "copy" => Ok(PatchOperation::Copy(CopyOperation {
            from: require_pointer(&object, "from", "copy", index)?,
            path: require_pointer(&object, "path", "copy", index)?,
        })),
        "test" => Ok(PatchOperation::Test(TestOperation {
            path: require_pointer(&object, "path", "test", index)?,
            value: require_value(&mut object, "value", "test", index)?,
        })),
        other => Err(PatchError::at(
            index,
            PatchErrorKind::UnknownOperation(other.to_string()),
        )),
    }
}

fn require_string<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    op: &'static str,
    index: usize,
) -> Result<&'a str, PatchError> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.as_str()),
        _ => Err(PatchError::at(
            index,
            PatchErrorKind::MissingPatchField { op, index, field },
        )),
    }
}

fn require_pointer(
    object: &Map<String, Value>,
    field: &'static str,
    op: &'static str,
    index: usize,
) -> Result<Pointer, PatchError> {
    let raw = require_string(object, field, op, index)?;
    Pointer::parse(raw).map_err(|kind| PatchError::at(index, kind))
}

fn require_value(
    object: &mut Map<String, Value>,
    field: &'static str,
    op: &'static str,
    index: usize,
) -> Result<Value, PatchError> {
    object
        .remove(field)
        .ok_or(PatchError::at(
            index,
            PatchErrorKind::MissingPatchField { op, index, field },
        ))
}

/// Options controlling a single [`apply_patch`] call.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    apply_on_copy: bool,
    ignore_nonexistent: bool,
    relative_to: Option<Pointer>,
}

impl ApplyOptions {
    /// Default options: in-place application, `NonexistentValue` aborts the patch, operations
    /// are relative to the document root.
    pub fn new() -> Self {
        Self::default()
    }

    /// If set, the target document is cloned before any operation runs; on failure the
    /// caller's document is left untouched.
    pub fn apply_on_copy(mut self, value: bool) -> Self {
        self.apply_on_copy = value;
        self
    }

    /// If set, a `NonexistentValue` failure from any single operation is treated as a
    /// successful skip of that operation rather than aborting the patch.
    pub fn ignore_nonexistent(mut self, value: bool) -> Self {
        self.ignore_nonexistent = value;
        self
    }

    /// Resolves `pointer` once against the document and runs every operation against that
    /// sub-value instead of the document root.
    pub fn relative_to(mut self, pointer: Pointer) -> Self {
        self.relative_to = Some(pointer);
        self
    }
}

/// Applies `patch` to `doc` in place, honoring `options`.
///
/// On success, `doc` reflects every operation. On failure, `doc` is byte-identical to its
/// pre-call state if `options.apply_on_copy()` was set; otherwise it may be left partially
/// mutated up to (not including) the failing operation.
pub fn apply_patch(doc: &mut Value, patch: &Patch, options: &ApplyOptions) -> Result<(), PatchError> {
    if options.apply_on_copy {
        let mut working = doc.clone();
        apply_in_place(&mut working, patch, options)?;
        *doc = working;
        Ok(())
    } else {
        apply_in_place(doc, patch, options)
    }
}

fn apply_in_place(doc: &mut Value, patch: &Patch, options: &ApplyOptions) -> Result<(), PatchError> {
    let root: &mut Value = match &options.relative_to {
        Some(pointer) => evaluate_mut(doc, pointer).map_err(PatchError::new)?,
        None => doc,
    };

    for (index, operation) in patch.0.iter().enumerate() {
        match apply_one(root, operation) {
            Ok(()) => {}
            Err(PatchErrorKind::NonexistentValue) if options.ignore_nonexistent => {}
            Err(kind) => return Err(PatchError::at(index, kind)),
        }
    }
    Ok(())
}

fn apply_one(doc: &mut Value, operation: &PatchOperation) -> Result<(), PatchErrorKind> {
    match operation {
        PatchOperation::Add(op) => ops::add(doc, &op.path, op.value.clone()),
        PatchOperation::Remove(op) => ops::remove(doc, &op.path).map(|_| ()),
        PatchOperation::Replace(op) => ops::replace(doc, &op.path, op.value.clone()).map(|_| ()),
        PatchOperation::Move(op) => ops::mov(doc, &op.from, &op.path),
        PatchOperation::Copy(op) => ops::copy(doc, &op.from, &op.path),
        PatchOperation::Test(op) => ops::test(doc, &op.path, &op.value),
    }
}

/// Decodes `doc` and applies `patch` to it, re-encoding the result.
pub fn apply_bytes(doc: &[u8], patch: &Patch, options: &ApplyOptions) -> Result<Vec<u8>, PatchError> {
    let mut value: Value = serde_json::from_slice(doc)
        .map_err(|_| PatchError::new(PatchErrorKind::InvalidPatchFormat))?;
    apply_patch(&mut value, patch, options)?;
    Ok(serde_json::to_vec(&value).expect("serde_json::Value always serializes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ptr(s: &str) -> Pointer {
        Pointer::parse(s).unwrap()
    }

    #[test]
    fn parse_from_value() {
        let json = json!([
            {"op": "add", "path": "/a/b", "value": 1},
            {"op": "remove", "path": "/c"},
        ]);
        let patch = Patch::from_value(json).unwrap();
        assert_eq!(
            patch,
            Patch(vec![
                PatchOperation::Add(AddOperation {
                    path: ptr("/a/b"),
                    value: json!(1),
                }),
                PatchOperation::Remove(RemoveOperation { path: ptr("/c") }),
            ])
        );
    }

    #[test]
    fn parse_rejects_non_array() {
        let err = Patch::from_value(json!({"op": "add"})).unwrap_err();
        assert_eq!(err.kind, PatchErrorKind::InvalidPatchFormat);
    }

    #[test]
    fn parse_rejects_unknown_op() {
        let err = Patch::from_value(json!([{"op": "frobnicate", "path": "/a"}])).unwrap_err();
        assert_eq!(err.index, Some(0));
        assert_eq!(err.kind, PatchErrorKind::UnknownOperation("frobnicate".into()));
    }

    #[test]
    fn parse_reports_missing_field_with_op_and_index() {
        let err = Patch::from_value(json!([
            {"op": "add", "path": "/a"},
        ]))
        .unwrap_err();
        assert_eq!(
            err.kind,
            PatchErrorKind::MissingPatchField {
                op: "add",
                index: 0,
                field: "value"
            }
        );
    }

    #[test]
    fn parse_keeps_explicit_null_value() {
        let patch = Patch::from_value(json!([{"op": "add", "path": "/a", "value": null}])).unwrap();
        assert_eq!(
            patch.0[0],
            PatchOperation::Add(AddOperation {
                path: ptr("/a"),
                value: Value::Null
            })
        );
    }

    #[test]
    fn serialize_round_trip_field_order() {
        let s = r#"[{"op":"add","path":"/a/b","value":1},{"op":"remove","path":"/c"}]"#;
        let patch = Patch::from_slice(s.as_bytes()).unwrap();
        assert_eq!(serde_json::to_string(&patch).unwrap(), s);
    }

    #[test]
    fn display_add_operation() {
        let op = PatchOperation::Add(AddOperation {
            path: ptr("/a/b/c"),
            value: json!(["hello", "bye"]),
        });
        assert_eq!(op.to_string(), r#"{"op":"add","path":"/a/b/c","value":["hello","bye"]}"#);
    }

    #[test]
    fn scenario_replace_existing() {
        let mut doc = json!({"age": 99});
        let patch = Patch::from_value(json!([{"op": "replace", "path": "/age", "value": 100}])).unwrap();
        apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap();
        assert_eq!(doc, json!({"age": 100}));
    }

    #[test]
    fn scenario_replace_nonexistent_without_ignore() {
        let mut doc = json!({"prop1": "V1"});
        let patch = Patch::from_value(json!([{"op": "replace", "path": "/prop3", "value": "V3"}])).unwrap();
        let err = apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap_err();
        assert_eq!(err.kind, PatchErrorKind::NonexistentValue);
    }

    #[test]
    fn scenario_replace_nonexistent_with_ignore() {
        let mut doc = json!({"prop1": "V1"});
        let original = doc.clone();
        let patch = Patch::from_value(json!([{"op": "replace", "path": "/prop3", "value": "V3"}])).unwrap();
        apply_patch(&mut doc, &patch, &ApplyOptions::new().ignore_nonexistent(true)).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn scenario_root_replacement_of_a_fragment() {
        let mut doc = json!(3);
        let patch = Patch::from_value(json!([{"op": "replace", "path": "", "value": false}])).unwrap();
        apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap();
        assert_eq!(doc, json!(false));
    }

    #[test]
    fn scenario_relative_root() {
        let mut doc = json!({"a": {}});
        let patch = Patch::from_value(json!([{"op": "add", "path": "/b", "value": "qux"}])).unwrap();
        apply_patch(
            &mut doc,
            &patch,
            &ApplyOptions::new().relative_to(ptr("/a")),
        )
        .unwrap();
        assert_eq!(doc, json!({"a": {"b": "qux"}}));
    }

    #[test]
    fn scenario_invalid_move() {
        let mut doc = json!({"a": {"b": 1}});
        let patch = Patch::from_value(json!([{"op": "move", "from": "/a", "path": "/a/b"}])).unwrap();
        let err = apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap_err();
        assert_eq!(err.kind, PatchErrorKind::InvalidMove);
    }

    #[test]
    fn atomicity_under_apply_on_copy() {
        let mut doc = json!({"a": 1});
        let original = doc.clone();
        let patch = Patch::from_value(json!([
            {"op": "add", "path": "/b", "value": 2},
            {"op": "replace", "path": "/missing", "value": 3},
        ]))
        .unwrap();
        let err = apply_patch(&mut doc, &patch, &ApplyOptions::new().apply_on_copy(true)).unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(doc, original);
    }

    #[test]
    fn without_apply_on_copy_partial_mutation_is_visible() {
        let mut doc = json!({"a": 1});
        let patch = Patch::from_value(json!([
            {"op": "add", "path": "/b", "value": 2},
            {"op": "replace", "path": "/missing", "value": 3},
        ]))
        .unwrap();
        apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap_err();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_append_equivalence() {
        let mut doc = json!({"arr": [1, 2, 3]});
        let patch = Patch::from_value(json!([{"op": "add", "path": "/arr/-", "value": 4}])).unwrap();
        apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap();
        assert_eq!(doc["arr"], json!([1, 2, 3, 4]));
    }

    #[test]
    fn apply_bytes_round_trips() {
        let patch = Patch::from_value(json!([{"op": "add", "path": "/x", "value": 1}])).unwrap();
        let out = apply_bytes(br#"{"a":1}"#, &patch, &ApplyOptions::new()).unwrap();
        let out: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(out, json!({"a": 1, "x": 1}));
    }
}
