//! Per-line coverage tables built from `gcov` annotated output.
//!
//! The crate covers the format-independent half of a coverage upload: finding `*.gcda`/`*.gcno` pairs and source
//! files ([`discover`]), reading the `*.gcov` text written by `gcov` ([`gcov`]), merging the line counts of every
//! translation unit a source file was compiled into ([`coverage`]), and shaping the result as a Coveralls job
//! ([`report`]).
//!
//! [`discover`]: ./discover/index.html
//! [`gcov`]: ./gcov/index.html
//! [`coverage`]: ./coverage/index.html
//! [`report`]: ./report/index.html

#![recursion_limit="128"] // needed for error_chain.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate md5;
#[macro_use]
extern crate serde_json;

mod utils;
pub mod error;
pub mod coverage;
pub mod discover;
pub mod gcov;
pub mod report;

pub use coverage::Coverage;
pub use discover::{Pair, PairTable, SourceTable};
pub use error::{ErrorKind, Result};
pub use report::{Job, SourceFile};
pub use utils::IntoStringLossy;
