//! Additional methods for libstd.

use std::ffi::OsString;

/// Adds the `into_string_lossy` method to `OsString` and `Vec<u8>`.
pub trait IntoStringLossy {
    /// Consumes the ownership and converts the string-like object into a real string. Unconvertible characters are
    /// replaced by U+FFFD.
    fn into_string_lossy(self) -> String;
}

impl IntoStringLossy for OsString {
    fn into_string_lossy(self) -> String {
        self.into_string().unwrap_or_else(|s| s.to_string_lossy().into_owned())
    }
}

impl IntoStringLossy for Vec<u8> {
    fn into_string_lossy(self) -> String {
        String::from_utf8(self).unwrap_or_else(|e| String::from_utf8_lossy(&e.into_bytes()).into_owned())
    }
}

