//! Error types.
//!
//! Lookups and removals of absent keys are not errors; they report through
//! `Option`/`bool`. The types here cover the few conditions a caller can
//! actually get wrong.

use core::str::Utf8Error;

/// A key was rejected by [`OrderedMap::try_set`](crate::OrderedMap::try_set).
///
/// The map is left untouched whenever this is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidKeyError {
    /// No key was supplied.
    #[error("key is missing")]
    Missing,

    /// The key bytes are not a valid UTF-8 string.
    #[error("key is not a valid string: {0}")]
    NotUtf8(#[from] Utf8Error),
}

/// A map could not be configured as requested.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("load factor must be a finite number no smaller than 1/1024, got {0}")]
    LoadFactor(f64),
}

/// A [`Cursor`](crate::Cursor) was advanced after the map changed shape, or
/// against a map other than the one it was taken from.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    #[error("map was modified during traversal (cursor version {expected}, map version {found})")]
    Modified { expected: u64, found: u64 },

    #[error("cursor belongs to a different map")]
    ForeignMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: UTF-8 failures convert into `InvalidKeyError` via `?`.
    #[test]
    fn utf8_error_converts() {
        fn check(bytes: &[u8]) -> Result<&str, InvalidKeyError> {
            Ok(core::str::from_utf8(bytes)?)
        }
        assert_eq!(check(b"ok"), Ok("ok"));
        assert!(matches!(check(&[0xff, 0xfe]), Err(InvalidKeyError::NotUtf8(_))));
    }

    #[test]
    fn messages() {
        assert_eq!(InvalidKeyError::Missing.to_string(), "key is missing");
        assert_eq!(
            ConfigError::LoadFactor(-1.0).to_string(),
            "load factor must be a finite number no smaller than 1/1024, got -1"
        );
        let e = CursorError::Modified {
            expected: 1,
            found: 3,
        };
        assert!(e.to_string().contains("cursor version 1"));
        assert_eq!(
            CursorError::ForeignMap.to_string(),
            "cursor belongs to a different map"
        );
    }
}
