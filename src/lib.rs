//! An [RFC 6902 JSON Patch](https://tools.ietf.org/html/rfc6902) evaluator, addressed via
//! [RFC 6901 JSON Pointer](https://tools.ietf.org/html/rfc6901).
//!
//! This crate is the evaluator only: it does not parse or serialize raw JSON bytes itself
//! beyond delegating to `serde_json`, and it does not compute a patch from a pair of
//! documents (a diff algorithm is a separate concern).
//!
//! # Usage
//!
//! Add this to your *Cargo.toml*:
//! ```toml
//! [dependencies]
//! jsonpatch = "0.1"
//! ```
//!
//! # Example
//!
//! ```rust
//! use jsonpatch::{apply_patch, ApplyOptions, Patch};
//! use serde_json::json;
//!
//! let mut doc = json!([
//!     { "name": "Andrew" },
//!     { "name": "Maxim" }
//! ]);
//!
//! let patch = Patch::from_value(json!([
//!     { "op": "test", "path": "/0/name", "value": "Andrew" },
//!     { "op": "add", "path": "/0/happy", "value": true }
//! ])).unwrap();
//!
//! apply_patch(&mut doc, &patch, &ApplyOptions::new()).unwrap();
//! assert_eq!(doc, json!([
//!     { "name": "Andrew", "happy": true },
//!     { "name": "Maxim" }
//! ]));
//! ```
#![deny(warnings)]
#![warn(missing_docs)]

mod equality;
mod error;
mod ops;
mod patch;
mod pointer;
mod resolve;

pub use error::{PatchError, PatchErrorKind};
pub use patch::{
    apply_bytes, apply_patch, AddOperation, ApplyOptions, CopyOperation, MoveOperation, Patch,
    PatchOperation, RemoveOperation, ReplaceOperation, TestOperation,
};
pub use pointer::Pointer;

/// The media type registered for JSON Patch documents, informational only.
pub const MEDIA_TYPE: &str = "application/json-patch+json";
