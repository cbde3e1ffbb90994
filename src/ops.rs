use serde_json::Value;

use crate::equality::values_eq;
use crate::error::PatchErrorKind;
use crate::pointer::Pointer;
use crate::resolve::{evaluate, locate_mut, Locator};

/// `add` — see RFC 6902 §4.1.
pub fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchErrorKind> {
    match locate_mut(doc, path)? {
        Locator::Root => {
            *doc = value;
            Ok(())
        }
        Locator::Child { parent, token } => add_child(parent, token, value),
    }
}

fn add_child(parent: &mut Value, token: &str, value: Value) -> Result<(), PatchErrorKind> {
    match parent {
        Value::Object(map) => {
            map.insert(token.to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if token == "-" {
                arr.push(value);
                return Ok(());
            }
            let idx = crate::resolve::parse_index_grammar(token)?;
            if idx > arr.len() {
                return Err(PatchErrorKind::IndexOutOfBounds);
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(PatchErrorKind::TypeMismatch),
    }
}

/// `remove` — see RFC 6902 §4.2.
pub fn remove(doc: &mut Value, path: &Pointer) -> Result<Value, PatchErrorKind> {
    if path.is_root() {
        return Err(PatchErrorKind::CannotRemoveRoot);
    }
    match locate_mut(doc, path)? {
        Locator::Root => unreachable!("is_root() already handled"),
        Locator::Child { parent, token } => remove_child(parent, token),
    }
}

fn remove_child(parent: &mut Value, token: &str) -> Result<Value, PatchErrorKind> {
    match parent {
        Value::Object(map) => map
            .remove(token)
            .ok_or(PatchErrorKind::NonexistentValue),
        Value::Array(arr) => {
            if token == "-" {
                return Err(PatchErrorKind::IndexError);
            }
            let idx = crate::resolve::parse_index_grammar(token)?;
            if idx >= arr.len() {
                return Err(PatchErrorKind::IndexOutOfBounds);
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchErrorKind::TypeMismatch),
    }
}

/// `replace` — see RFC 6902 §4.3. Implemented directly (rather than as `remove` then `add`)
/// so an array replacement does not shift any indices.
pub fn replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<Value, PatchErrorKind> {
    if path.is_root() {
        return Ok(std::mem::replace(doc, value));
    }
    match locate_mut(doc, path)? {
        Locator::Root => unreachable!("is_root() already handled"),
        Locator::Child { parent, token } => replace_child(parent, token, value),
    }
}

fn replace_child(parent: &mut Value, token: &str, value: Value) -> Result<Value, PatchErrorKind> {
    match parent {
        Value::Object(map) => {
            let slot = map.get_mut(token).ok_or(PatchErrorKind::NonexistentValue)?;
            Ok(std::mem::replace(slot, value))
        }
        Value::Array(arr) => {
            if token == "-" {
                return Err(PatchErrorKind::IndexError);
            }
            let idx = crate::resolve::parse_index_grammar(token)?;
            let slot = arr.get_mut(idx).ok_or(PatchErrorKind::IndexOutOfBounds)?;
            Ok(std::mem::replace(slot, value))
        }
        _ => Err(PatchErrorKind::TypeMismatch),
    }
}

/// `move` — see RFC 6902 §4.4.
pub fn mov(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PatchErrorKind> {
    if from == path {
        // The RFC is silent on this case; a no-op is the only sensible reading.
        return Ok(());
    }
    if from.is_proper_prefix_of(path) {
        return Err(PatchErrorKind::InvalidMove);
    }
    let value = remove(doc, from)?;
    add(doc, path, value)
}

/// `copy` — see RFC 6902 §4.5.
pub fn copy(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PatchErrorKind> {
    let value = evaluate(doc, from)?.clone();
    add(doc, path, value)
}

/// `test` — see RFC 6902 §4.6. Never mutates `doc`.
pub fn test(doc: &Value, path: &Pointer, expected: &Value) -> Result<(), PatchErrorKind> {
    let actual = evaluate(doc, path)?;
    if values_eq(actual, expected) {
        Ok(())
    } else {
        Err(PatchErrorKind::TestFailed)
    }
}
