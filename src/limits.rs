//! Tunable caps on message and value sizes.
//!
//! Defaults come from the wire format's own limits. Callers that need to
//! accept larger (or more tightly bounded) input can build a custom
//! [`Limits`] and hand it to [`crate::Writer::with_limits`] or
//! [`crate::Reader::with_limits`].

use crate::header::{MAX_ARRAY, MAX_DEPTH, MAX_MESSAGE, MAX_STRING};

/// Caps enforced while encoding or decoding a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum byte length of a `STRING` value.
    pub max_string: usize,
    /// Maximum element/entry count of an `ARRAY`, `MAP`, or byte length of a
    /// `BYTES` value.
    pub max_array: usize,
    /// Maximum container nesting depth.
    pub max_depth: usize,
    /// Maximum total message size, header through trailer.
    pub max_message: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string: MAX_STRING,
            max_array: MAX_ARRAY,
            max_depth: MAX_DEPTH,
            max_message: MAX_MESSAGE,
        }
    }
}

impl Limits {
    /// Equivalent to [`Limits::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum `STRING` length.
    pub fn with_max_string(mut self, max_string: usize) -> Self {
        self.max_string = max_string;
        self
    }

    /// Sets the maximum `ARRAY`/`MAP`/`BYTES` element count or length.
    pub fn with_max_array(mut self, max_array: usize) -> Self {
        self.max_array = max_array;
        self
    }

    /// Sets the maximum container nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum total message size.
    pub fn with_max_message(mut self, max_message: usize) -> Self {
        self.max_message = max_message;
        self
    }
}
