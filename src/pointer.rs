use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::PatchErrorKind;

/// A parsed [RFC 6901](https://tools.ietf.org/html/rfc6901) JSON Pointer.
///
/// Accepts both the standard form (`/a/b`) and the URI-fragment form (`#/a/b`) on parse;
/// [`Display`](fmt::Display) always renders the standard form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    /// The pointer that addresses the document root.
    pub fn root() -> Self {
        Pointer { tokens: Vec::new() }
    }

    /// Builds a pointer directly from already-decoded tokens, bypassing parsing.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pointer {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a pointer in standard or URI-fragment form.
    pub fn parse(raw: &str) -> Result<Self, PatchErrorKind> {
        let body = if let Some(rest) = raw.strip_prefix('#') {
            percent_decode_str(rest)
                .decode_utf8()
                .map_err(|_| PatchErrorKind::InvalidPointer(raw.to_string()))?
                .into_owned()
        } else {
            raw.to_string()
        };

        if body.is_empty() {
            return Ok(Pointer::root());
        }
        if !body.starts_with('/') {
            return Err(PatchErrorKind::InvalidPointer(raw.to_string()));
        }

        let mut tokens = Vec::new();
        for raw_token in body[1..].split('/') {
            tokens.push(decode_token(raw_token).map_err(|()| {
                PatchErrorKind::InvalidPointer(raw.to_string())
            })?);
        }
        Ok(Pointer { tokens })
    }

    /// Whether this pointer addresses the document root.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The decoded reference tokens, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Splits into the tokens of the parent container and the terminal token, or `None` if
    /// this pointer is the root.
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.tokens.split_last().map(|(last, init)| (init, last.as_str()))
    }

    /// Returns a new pointer addressing `token` within the value this pointer addresses.
    pub fn child(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Pointer { tokens }
    }

    /// True iff `other` is a proper prefix of `self` — `other`'s tokens are an initial
    /// segment of `self`'s, and `self` has at least one more token.
    pub fn is_proper_prefix_of(&self, other: &Pointer) -> bool {
        self.tokens.len() < other.tokens.len() && other.tokens[..self.tokens.len()] == self.tokens[..]
    }

    fn push_encoded(&self, out: &mut String) {
        for token in &self.tokens {
            out.push('/');
            for ch in token.chars() {
                match ch {
                    '~' => out.push_str("~0"),
                    '/' => out.push_str("~1"),
                    other => out.push(other),
                }
            }
        }
    }
}

fn decode_token(raw: &str) -> Result<String, ()> {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => decoded.push('~'),
            Some('1') => decoded.push('/'),
            _ => return Err(()),
        }
    }
    Ok(decoded)
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.push_encoded(&mut out);
        f.write_str(&out)
    }
}

impl std::str::FromStr for Pointer {
    type Err = PatchErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl serde::Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Pointer::parse(&raw).map_err(serde::de::Error::custom)
    }
}
