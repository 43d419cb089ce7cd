//! Errors related to the `linecov` crate.
//!
//! Please see documentation of the [`error-chain` crate](https://docs.rs/error-chain/0.12.0/error_chain/) for detailed
//! usage.

use std::io;
use std::num::ParseIntError;

error_chain! {
    foreign_links {
        Io(io::Error) /** Wrapper of standard I/O error. */;
        ParseInt(ParseIntError) /** Wrapper of integer parse error. */;
        Json(::serde_json::Error) /** Wrapper of JSON error. */;
    }

    errors {
        /// A `*.gcov` record has a count field which is neither a number nor one of the known markers.
        UnknownCount(line: usize, count: String) {
            description("unknown execution count")
            display("line {} of *.gcov has an unrecognized execution count {:?}", line, count)
        }

        /// A `*.gcov` record has a line number which does not fit in `usize`.
        InvalidLineNumber(line: usize) {
            description("invalid line number")
            display("line {} of *.gcov has an out of range line number", line)
        }
    }
}

impl ErrorKind {
    /// Creates an [`UnknownCount`] error for the given 0-based index into the `*.gcov` file.
    ///
    /// [`UnknownCount`]: ./enum.ErrorKind.html#variant.UnknownCount
    pub(crate) fn unknown_count(index: usize, count: &str) -> ErrorKind {
        ErrorKind::UnknownCount(index + 1, count.to_owned())
    }

    /// Creates an [`InvalidLineNumber`] error for the given 0-based index into the `*.gcov` file.
    ///
    /// [`InvalidLineNumber`]: ./enum.ErrorKind.html#variant.InvalidLineNumber
    pub(crate) fn invalid_line_number(index: usize) -> ErrorKind {
        ErrorKind::InvalidLineNumber(index + 1)
    }
}
