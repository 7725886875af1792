//! Typed-key buffer echoed on the bottom line

use core::fmt::Write;

use heapless::String;

use crate::messages::{Key, Text};

/// Keys kept in the buffer before it wraps
pub const INPUT_BUFFER_LEN: usize = 16;

/// Keys typed since the last recognized one
#[derive(Debug)]
pub struct InputBuffer {
    keys: String<INPUT_BUFFER_LEN>,
    last_key_ms: u64,
    timeout_ms: u64,
}

impl InputBuffer {
    /// Create an empty buffer that expires `timeout_ms` after the last key
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            keys: String::new(),
            last_key_ms: 0,
            timeout_ms: timeout_ms as u64,
        }
    }

    /// Append a key, starting over when full
    pub fn push(&mut self, key: Key, now_ms: u64) {
        if self.keys.push(key.as_char()).is_err() {
            self.keys.clear();
            let _ = self.keys.push(key.as_char());
        }
        self.last_key_ms = now_ms;
    }

    /// Drop the typed keys
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Typed keys
    pub fn as_str(&self) -> &str {
        &self.keys
    }

    /// When the buffer expires, if it holds anything
    pub fn deadline(&self) -> Option<u64> {
        if self.keys.is_empty() {
            None
        } else {
            Some(self.last_key_ms + self.timeout_ms)
        }
    }

    /// Check if the buffer has been idle for the whole timeout
    pub fn expired(&self, now_ms: u64) -> bool {
        self.deadline().is_some_and(|d| now_ms >= d)
    }

    /// Bottom-line echo text
    pub fn echo(&self) -> Text {
        let mut out = Text::new();
        let _ = write!(out, "Typed: {}", self.keys);
        out
    }
}
