use serde_json::Value;

use crate::error::PatchErrorKind;
use crate::pointer::Pointer;

/// The site of a mutation: either the document root, or a parent container plus the
/// terminal reference token addressing a child of it.
///
/// The terminal token is deliberately left uninterpreted here — whether it names an object
/// key to overwrite, an array index to insert/remove at, or the `-` append marker is up to
/// the calling operation (see `ops`).
pub enum Locator<'a> {
    /// The pointer was empty; the document itself is the target.
    Root,
    /// `parent` is the container the terminal token lives in.
    Child { parent: &'a mut Value, token: &'a str },
}

/// Reads the value addressed by `pointer` within `doc`.
pub fn evaluate<'a>(doc: &'a Value, pointer: &Pointer) -> Result<&'a Value, PatchErrorKind> {
    let mut current = doc;
    for token in pointer.tokens() {
        current = step(current, token)?;
    }
    Ok(current)
}

/// Mutably reaches the value addressed by `pointer` within `doc`. Used for `relative_to`,
/// where the whole pointer (not all-but-last) is resolved.
pub fn evaluate_mut<'a>(
    doc: &'a mut Value,
    pointer: &Pointer,
) -> Result<&'a mut Value, PatchErrorKind> {
    let mut current = doc;
    for token in pointer.tokens() {
        current = step_mut(current, token)?;
    }
    Ok(current)
}

/// Resolves `pointer` to a [`Locator`] suitable for a mutating operation.
pub fn locate_mut<'a>(
    doc: &'a mut Value,
    pointer: &'a Pointer,
) -> Result<Locator<'a>, PatchErrorKind> {
    let Some((parent_tokens, last)) = pointer.split_last() else {
        return Ok(Locator::Root);
    };
    let mut current = doc;
    for token in parent_tokens {
        current = step_mut(current, token)?;
    }
    Ok(Locator::Child {
        parent: current,
        token: last,
    })
}

fn step<'a>(current: &'a Value, token: &str) -> Result<&'a Value, PatchErrorKind> {
    match current {
        Value::Object(map) => map.get(token).ok_or(PatchErrorKind::NonexistentValue),
        Value::Array(arr) => {
            let idx = parse_strict_index(token, arr.len())?;
            Ok(&arr[idx])
        }
        _ => Err(PatchErrorKind::TypeMismatch),
    }
}

fn step_mut<'a>(current: &'a mut Value, token: &str) -> Result<&'a mut Value, PatchErrorKind> {
    match current {
        Value::Object(map) => map.get_mut(token).ok_or(PatchErrorKind::NonexistentValue),
        Value::Array(arr) => {
            let idx = parse_strict_index(token, arr.len())?;
            Ok(&mut arr[idx])
        }
        _ => Err(PatchErrorKind::TypeMismatch),
    }
}

/// Parses a non-terminal array reference token: non-negative decimal, no leading zeros
/// except the literal `0`, and strictly less than `len`. `-` is never valid here.
fn parse_strict_index(token: &str, len: usize) -> Result<usize, PatchErrorKind> {
    let idx = parse_index_grammar(token)?;
    if idx < len {
        Ok(idx)
    } else {
        Err(PatchErrorKind::IndexOutOfBounds)
    }
}

/// Parses the grammar of a (non-`-`) array reference token without bounds-checking it.
/// Shared by the resolver (non-terminal tokens) and by `ops` (terminal tokens, which have
/// their own bounds rules per operation).
pub(crate) fn parse_index_grammar(token: &str) -> Result<usize, PatchErrorKind> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PatchErrorKind::IndexError);
    }
    if token.len() > 1 && token.starts_with('0') {
        return Err(PatchErrorKind::IndexError);
    }
    token.parse::<usize>().map_err(|_| PatchErrorKind::IndexError)
}
