use std::fmt;

/// The kind of failure produced while parsing a [`Pointer`](crate::Pointer), parsing a
/// [`Patch`](crate::Patch), or applying one to a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchErrorKind {
    /// The top-level JSON patch document was not an array, or one of its elements was not
    /// an object.
    #[error("patch document must be a JSON array of operation objects")]
    InvalidPatchFormat,

    /// The `op` field of a patch operation is not one of the six RFC 6902 operations.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// A required field was missing (or had the wrong JSON type) for the given operation.
    #[error("operation `{op}` at index {index} is missing required field `{field}`")]
    MissingPatchField {
        /// The `op` string of the operation that is missing a field.
        op: &'static str,
        /// Index of the operation within the patch array.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A pointer string violates RFC 6901 syntax or escape rules.
    #[error("invalid JSON pointer: {0}")]
    InvalidPointer(String),

    /// The pointer refers to a location that is not present in the document.
    #[error("no value exists at the given path")]
    NonexistentValue,

    /// An array reference token is not a valid non-negative integer, or is `-` where that is
    /// not permitted.
    #[error("invalid array index token")]
    IndexError,

    /// A well-formed array index is out of the permitted range for the operation.
    #[error("array index out of bounds")]
    IndexOutOfBounds,

    /// `remove` (or an equivalent) targeted the document root.
    #[error("cannot remove the document root")]
    CannotRemoveRoot,

    /// `move` whose `from` is a proper prefix of `path`.
    #[error("cannot move a value into one of its own descendants")]
    InvalidMove,

    /// `test` operation mismatched.
    #[error("test operation failed: value did not match")]
    TestFailed,

    /// A scalar value was indexed into as though it were a container.
    #[error("expected an array or object")]
    TypeMismatch,
}

/// Error produced while parsing or applying a [`Patch`](crate::Patch).
///
/// Carries the index of the operation that failed, when the failure happened while applying
/// an already-parsed patch. `index` is `None` for failures that occur before any operation is
/// run (parsing the patch document itself, or resolving `ApplyOptions::relative_to`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchError {
    /// Index of the failing operation within the patch, if applicable.
    pub index: Option<usize>,
    /// The underlying failure.
    pub kind: PatchErrorKind,
}

impl PatchError {
    pub(crate) fn new(kind: PatchErrorKind) -> Self {
        PatchError { index: None, kind }
    }

    pub(crate) fn at(index: usize, kind: PatchErrorKind) -> Self {
        PatchError {
            index: Some(index),
            kind,
        }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "operation {index}: {}", self.kind),
            None => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
