//! Discovery of coverage inputs on the file system.
//!
//! An object directory contains a `*.gcno` (notes) file for every instrumented translation unit, written by the
//! compiler, and a `*.gcda` (counters) file once the program has run. Both are needed to produce any line counts, so
//! [`PairTable::complete()`] only yields base names having both.
//!
//! [`PairTable::complete()`]: ./struct.PairTable.html#method.complete

use coverage::Coverage;
use error::{Result, ResultExt};
use utils::IntoStringLossy;

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::read_dir;
use std::path::Path;

/// Extension of counter files.
pub const GCDA_EXTENSION: &str = "gcda";

/// Extension of notes files.
pub const GCNO_EXTENSION: &str = "gcno";

/// Extensions of the source files tracked by default.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "m"];

/// Which of the two auxiliary files exist for a base name.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pair {
    /// Whether `«base».gcda` exists.
    pub gcda: bool,
    /// Whether `«base».gcno` exists.
    pub gcno: bool,
}

impl Pair {
    /// Whether both files exist.
    pub fn is_complete(&self) -> bool {
        self.gcda && self.gcno
    }
}

/// Auxiliary files found in an object directory, keyed and sorted by base name.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PairTable {
    pairs: BTreeMap<String, Pair>,
}

impl PairTable {
    /// Creates an empty table.
    pub fn new() -> PairTable {
        PairTable::default()
    }

    /// Records a file name. Returns whether the file is a counter or notes file.
    pub fn insert<S: AsRef<OsStr>>(&mut self, file_name: S) -> bool {
        let path = Path::new(file_name.as_ref());
        let extension = path.extension().and_then(OsStr::to_str);
        let stem = match path.file_stem() {
            Some(stem) => stem.to_os_string().into_string_lossy(),
            None => return false,
        };
        let pair = match extension {
            Some(GCDA_EXTENSION) => &mut self.pairs.entry(stem).or_insert_with(Pair::default).gcda,
            Some(GCNO_EXTENSION) => &mut self.pairs.entry(stem).or_insert_with(Pair::default).gcno,
            _ => return false,
        };
        *pair = true;
        true
    }

    /// Looks up the pair of a base name.
    pub fn get(&self, base_name: &str) -> Option<Pair> {
        self.pairs.get(base_name).cloned()
    }

    /// Iterates over base names having both a counter and a notes file, in sorted order.
    pub fn complete<'a>(&'a self) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter().filter(|&(_, pair)| pair.is_complete()).map(|(name, _)| &**name)
    }

    /// Number of base names seen.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Source files to report, keyed and sorted by file name, each with its accumulated coverage.
pub type SourceTable = BTreeMap<String, Coverage>;

/// Lists the object directory and pairs up its `*.gcda` and `*.gcno` files by base name.
///
/// # Errors
///
/// Returns [`Io`] if the directory cannot be listed.
///
/// [`Io`]: ../error/enum.ErrorKind.html#variant.Io
pub fn scan_objects(dir: &Path) -> Result<PairTable> {
    let mut table = PairTable::new();
    let entries = read_dir(dir).chain_err(|| format!("Cannot read object directory `{}`", dir.display()))?;
    for entry in entries {
        let file_name = entry?.file_name();
        if table.insert(&file_name) {
            trace!("found {:?}", file_name);
        }
    }
    debug!("{} base names in {:?}", table.len(), dir);
    Ok(table)
}

/// Lists the source directory and seeds an empty coverage table for every file having one of the `extensions`.
///
/// # Errors
///
/// Returns [`Io`] if the directory cannot be listed.
///
/// [`Io`]: ../error/enum.ErrorKind.html#variant.Io
pub fn scan_sources<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<SourceTable> {
    let mut table = SourceTable::new();
    let entries = read_dir(dir).chain_err(|| format!("Cannot read source directory `{}`", dir.display()))?;
    for entry in entries {
        let file_name = entry?.file_name();
        if is_tracked_source(&file_name, extensions) {
            table.insert(file_name.into_string_lossy(), Coverage::new());
        }
    }
    debug!("{} source files in {:?}", table.len(), dir);
    Ok(table)
}

/// Checks whether the file name has one of the `extensions`.
pub fn is_tracked_source<S: AsRef<str>>(file_name: &OsStr, extensions: &[S]) -> bool {
    match Path::new(file_name).extension().and_then(OsStr::to_str) {
        Some(ext) => extensions.iter().any(|e| e.as_ref() == ext),
        None => false,
    }
}

#[test]
fn test_pair_insert() {
    let mut table = PairTable::new();
    assert!(table.insert("foo.gcda"));
    assert!(table.insert("foo.gcno"));
    assert!(table.insert("bar.gcno"));
    assert!(!table.insert("foo.o"));
    assert!(!table.insert("Makefile"));

    assert_eq!(table.len(), 2);
    assert_eq!(table.get("foo"), Some(Pair { gcda: true, gcno: true }));
    assert_eq!(table.get("bar"), Some(Pair { gcda: false, gcno: true }));
    assert_eq!(table.get("Makefile"), None);
}

#[test]
fn test_pair_complete_only() {
    let mut table = PairTable::new();
    for name in &["zeta.gcno", "zeta.gcda", "alpha.gcda", "beta.gcno", "beta.gcda", "gamma.gcno"] {
        table.insert(name);
    }
    assert_eq!(table.complete().collect::<Vec<_>>(), vec!["beta", "zeta"]);
}

#[test]
fn test_pair_uses_last_extension() {
    let mut table = PairTable::new();
    table.insert("foo.c.gcno");
    table.insert("foo.c.gcda");
    assert_eq!(table.complete().collect::<Vec<_>>(), vec!["foo.c"]);
}

#[test]
fn test_is_tracked_source() {
    let extensions = SOURCE_EXTENSIONS;
    assert!(is_tracked_source(OsStr::new("foo.c"), extensions));
    assert!(is_tracked_source(OsStr::new("view.m"), extensions));
    assert!(!is_tracked_source(OsStr::new("foo.h"), extensions));
    assert!(!is_tracked_source(OsStr::new("readme.txt"), extensions));
    assert!(!is_tracked_source(OsStr::new("c"), extensions));
    assert!(is_tracked_source(OsStr::new("foo.cpp"), &["cpp"][..]));
}
