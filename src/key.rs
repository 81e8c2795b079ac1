//! Composite Key Module
//!
//! Reduces an ordered sequence of identifier fragments to one storage key.
//!
//! Fragments are joined with [`KEY_DELIMITER`] without escaping, so a
//! fragment that itself contains the delimiter makes the key ambiguous:
//! `["a:b", "c"]` and `["a", "b:c"]` both compose to `a:b:c`. Such keys are
//! kept as-is and flagged by [`CompositeKey::is_ambiguous`].

use std::fmt;

use crate::error::{CacheError, Result};

/// Separator placed between fragments.
pub const KEY_DELIMITER: char = ':';

// == Key Fragment ==
/// One identifier fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyFragment {
    Text(String),
    Int(i64),
}

impl KeyFragment {
    fn contains_delimiter(&self) -> bool {
        match self {
            KeyFragment::Text(text) => text.contains(KEY_DELIMITER),
            KeyFragment::Int(_) => false,
        }
    }
}

impl fmt::Display for KeyFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFragment::Text(text) => f.write_str(text),
            KeyFragment::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for KeyFragment {
    fn from(value: &str) -> Self {
        KeyFragment::Text(value.to_string())
    }
}

impl From<String> for KeyFragment {
    fn from(value: String) -> Self {
        KeyFragment::Text(value)
    }
}

impl From<&String> for KeyFragment {
    fn from(value: &String) -> Self {
        KeyFragment::Text(value.clone())
    }
}

impl From<i64> for KeyFragment {
    fn from(value: i64) -> Self {
        KeyFragment::Int(value)
    }
}

// == Composite Key ==
/// Storage key built from identifier fragments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    key: String,
    ambiguous: bool,
}

impl CompositeKey {
    // == Compose ==
    /// Joins `fragments` in order with `:`.
    ///
    /// The accumulator starts empty; each fragment is appended after a
    /// delimiter when the accumulator is non-empty and otherwise becomes the
    /// accumulator, so leading empty text fragments are absorbed.
    ///
    /// Fails with a key error for an empty sequence or a sequence that
    /// composes to the empty string.
    pub fn compose(fragments: &[KeyFragment]) -> Result<Self> {
        if fragments.is_empty() {
            return Err(CacheError::Key(
                "identifier fragment sequence is empty".to_string(),
            ));
        }

        let mut key = String::new();
        for fragment in fragments {
            if !key.is_empty() {
                key.push(KEY_DELIMITER);
            }
            key.push_str(&fragment.to_string());
        }

        if key.is_empty() {
            return Err(CacheError::Key(
                "identifier fragments compose to an empty key".to_string(),
            ));
        }

        Ok(Self {
            key,
            ambiguous: fragments.iter().any(KeyFragment::contains_delimiter),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Returns true if a fragment contained the delimiter, meaning another
    /// fragment sequence may compose to the same key.
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
