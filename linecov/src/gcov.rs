//! Reader of the `*.gcov` annotated source format.
//!
//! `gcov` writes one `<source name>.gcov` file per source file touched by a translation unit. Every line of the source
//! file appears as a record of three colon-separated fields:
//!
//! ```text
//!         -:    0:Source:foo.c
//!         -:    1:#include <stdio.h>
//!         3:    2:int add(int a, int b) {
//!     #####:    3:    abort();
//!        1*:    4:    if (a) return b;
//! ```
//!
//! The first field is the execution count. `-` means the line has no code, `#####` (or `=====` for lines reachable
//! only through exceptions) means the line was never executed, and a trailing `*` only flags unexecuted blocks
//! inside an executed line. Records for line 0 are headers. Everything else in the file (function and branch
//! summaries, `------` separators, template instantiation names) is not a record and is skipped.

use coverage::{Coverage, LineCount};
use error::*;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens and parses a `*.gcov` file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Coverage> {
    let path = path.as_ref();
    debug!("open gcov output {:?}", path);
    let file = File::open(path).chain_err(|| format!("Cannot open `{}`", path.display()))?;
    parse(BufReader::new(file)).chain_err(|| format!("Cannot parse `{}`", path.display()))
}

/// Parses `*.gcov` content into a line coverage table.
///
/// The table contains one entry per source line. Per-instantiation sections repeat lines that were already listed,
/// and those repeats are ignored. If the records skip ahead, the missing lines are treated as non-executable.
///
/// # Errors
///
/// * Returns [`UnknownCount`] if a record's count field cannot be interpreted.
/// * Returns [`InvalidLineNumber`] if a record's line number overflows.
/// * Returns [`Io`] on I/O failure.
///
/// [`UnknownCount`]: ../error/enum.ErrorKind.html#variant.UnknownCount
/// [`InvalidLineNumber`]: ../error/enum.ErrorKind.html#variant.InvalidLineNumber
/// [`Io`]: ../error/enum.ErrorKind.html#variant.Io
pub fn parse<R: BufRead>(reader: R) -> Result<Coverage> {
    let mut coverage = Coverage::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let record = split_record(&line).chain_err(|| ErrorKind::invalid_line_number(index))?;
        let (count, line_number) = match record {
            Some(record) => record,
            None => continue,
        };
        if line_number <= coverage.len() {
            continue;
        }
        let count = parse_count(count).ok_or_else(|| ErrorKind::unknown_count(index, count))?;
        while coverage.len() + 1 < line_number {
            coverage.push(None);
        }
        coverage.push(count);
    }
    trace!("parsed {} lines", coverage.len());
    Ok(coverage)
}

/// Splits a record into the raw count field and the line number. Returns `None` if `line` is not a record.
fn split_record(line: &str) -> Result<Option<(&str, usize)>> {
    let mut fields = line.splitn(3, ':');
    let count = fields.next().unwrap_or("").trim();
    let line_number = match fields.next() {
        Some(n) => n.trim(),
        None => return Ok(None),
    };
    if fields.next().is_none() || count.is_empty() || line_number.is_empty() || !line_number.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    Ok(Some((count, line_number.parse()?)))
}

/// Interprets the count field of a record.
fn parse_count(count: &str) -> Option<LineCount> {
    match count {
        "-" => Some(None),
        "#####" | "=====" => Some(Some(0)),
        _ => count.trim_end_matches('*').parse().ok().map(Some),
    }
}

#[test]
fn test_parse_count() {
    assert_eq!(parse_count("-"), Some(None));
    assert_eq!(parse_count("#####"), Some(Some(0)));
    assert_eq!(parse_count("====="), Some(Some(0)));
    assert_eq!(parse_count("12"), Some(Some(12)));
    assert_eq!(parse_count("7*"), Some(Some(7)));
    assert_eq!(parse_count("abc"), None);
}

#[test]
fn test_split_record() {
    assert_eq!(split_record("        -:    0:Source:foo.c").unwrap(), Some(("-", 0)));
    assert_eq!(split_record("        3:   12:    x = a ? b : c;").unwrap(), Some(("3", 12)));
    assert_eq!(split_record("function main called 1 returned 100% blocks executed 80%").unwrap(), None);
    assert_eq!(split_record("------------------").unwrap(), None);
    assert_eq!(split_record("_Z3maxIiET_S0_S0_:").unwrap(), None);
    assert_eq!(split_record("branch  0 taken 1 (fallthrough)").unwrap(), None);
}

#[test]
fn test_parse_skips_headers_and_summaries() {
    let text = "\
        -:    0:Source:foo.c
        -:    0:Graph:foo.gcno
        -:    0:Data:foo.gcda
        -:    0:Runs:1
        -:    1:#include <stdlib.h>
        -:    2:
function main called 1 returned 100% blocks executed 75%
        1:    3:int main(int argc, char** argv) {
        1:    4:    if (argc > 5)
    #####:    5:        abort();
        1:    6:    return 0;
        -:    7:}
";
    let coverage = parse(text.as_bytes()).unwrap();
    assert_eq!(Vec::from(coverage), vec![None, None, Some(1), Some(1), Some(0), Some(1), None]);
}

#[test]
fn test_parse_ignores_instantiation_repeats() {
    let text = "\
        -:    1:template <typename T>
        5:    2:T max(T a, T b) {
        5:    3:    return a > b ? a : b;
------------------
_Z3maxIiET_S0_S0_:
        3:    2:T max(T a, T b) {
        3:    3:    return a > b ? a : b;
------------------
_Z3maxIdET_S0_S0_:
        2:    2:T max(T a, T b) {
        2:    3:    return a > b ? a : b;
------------------
        -:    4:}
";
    let coverage = parse(text.as_bytes()).unwrap();
    assert_eq!(Vec::from(coverage), vec![None, Some(5), Some(5), None]);
}

#[test]
fn test_parse_pads_gaps() {
    let text = "        2:    1:a();\n        4:    4:b();\n";
    let coverage = parse(text.as_bytes()).unwrap();
    assert_eq!(Vec::from(coverage), vec![Some(2), None, None, Some(4)]);
}

#[test]
fn test_parse_rejects_unknown_count() {
    let text = "        -:    1:x\n      ???:    2:y\n";
    match *parse(text.as_bytes()).unwrap_err().kind() {
        ErrorKind::UnknownCount(line, ref count) => {
            assert_eq!(line, 2);
            assert_eq!(count, "???");
        },
        ref e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn test_parse_rejects_overflowing_line_number() {
    let text = "        -:    1:x\n        1:    18446744073709551616:y\n";
    let error = parse(text.as_bytes()).unwrap_err();
    match *error.kind() {
        ErrorKind::InvalidLineNumber(line) => assert_eq!(line, 2),
        ref e => panic!("unexpected error {:?}", e),
    }
    assert!(error.iter().nth(1).map_or(false, |cause| cause.to_string().contains("too large")), "{}", error);
}

#[test]
fn test_open_sample() {
    let coverage = open("test-data/sample.c.gcov").unwrap();
    assert_eq!(coverage.len(), 14);
    assert_eq!(coverage[0], None);
    assert_eq!(coverage[4], Some(4));
    assert_eq!(coverage[8], Some(0));
    assert_eq!(coverage.lines_count(), 7);
    assert_eq!(coverage.lines_covered(), 5);
}
