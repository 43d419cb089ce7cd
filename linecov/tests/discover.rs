extern crate linecov;
extern crate tempfile;

use linecov::discover::{SOURCE_EXTENSIONS, scan_objects, scan_sources};
use linecov::report::collect_source_files;
use linecov::{Coverage, Pair, gcov};

use tempfile::TempDir;

use std::fs::{File, create_dir};
use std::io::Write;
use std::path::Path;

fn touch(dir: &Path, name: &str, content: &str) {
    let mut file = File::create(dir.join(name)).expect("create");
    file.write_all(content.as_bytes()).expect("write");
}

/// Object directory with `foo.gcno` + `foo.gcda` and a lone `bar.gcno`; source directory with `foo.c`, `bar.c` and
/// `readme.txt`.
fn build_tree() -> TempDir {
    let root = TempDir::new().expect("tempdir");
    let objects = root.path().join("obj");
    let sources = root.path().join("src");
    create_dir(&objects).expect("obj");
    create_dir(&sources).expect("src");

    touch(&objects, "foo.gcno", "notes");
    touch(&objects, "foo.gcda", "counters");
    touch(&objects, "bar.gcno", "notes");
    touch(&objects, "foo.o", "object");

    touch(&sources, "foo.c", "int foo(void) {\n    return 1;\n}\n");
    touch(&sources, "bar.c", "int bar(void) {\n    return 2;\n}\n");
    touch(&sources, "readme.txt", "not a source\n");
    root
}

#[test]
fn only_complete_pairs_are_extracted() {
    let root = build_tree();
    let pairs = scan_objects(&root.path().join("obj")).unwrap();

    assert_eq!(pairs.get("foo"), Some(Pair { gcda: true, gcno: true }));
    assert_eq!(pairs.get("bar"), Some(Pair { gcda: false, gcno: true }));
    assert_eq!(pairs.complete().collect::<Vec<_>>(), vec!["foo"]);
}

#[test]
fn only_tracked_extensions_are_reported() {
    let root = build_tree();
    let source_dir = root.path().join("src");
    let mut sources = scan_sources(&source_dir, SOURCE_EXTENSIONS).unwrap();
    assert_eq!(sources.keys().collect::<Vec<_>>(), vec!["bar.c", "foo.c"]);

    let foo_gcov = "\
        -:    0:Source:foo.c
        3:    1:int foo(void) {
        3:    2:    return 1;
        -:    3:}
";
    let report = gcov::parse(foo_gcov.as_bytes()).unwrap();
    sources.get_mut("foo.c").unwrap().merge(&report);

    let files = collect_source_files(&source_dir, sources).unwrap();
    let names = files.iter().map(|f| Path::new(&f.name).file_name().unwrap().to_str().unwrap()).collect::<Vec<_>>();
    assert_eq!(names, vec!["bar.c", "foo.c"]);

    assert!(files[0].coverage.is_empty());
    assert_eq!(files[1].coverage, Coverage::from(vec![Some(3), Some(3), None]));
    assert_eq!(files[1].source_digest.len(), 32);
    assert_ne!(files[0].source_digest, files[1].source_digest);
}

#[test]
fn missing_directory_is_an_error() {
    let root = TempDir::new().expect("tempdir");
    let missing = root.path().join("does-not-exist");
    let error = scan_objects(&missing).unwrap_err();
    assert!(error.to_string().contains("does-not-exist"));
    assert!(scan_sources(&missing, SOURCE_EXTENSIONS).is_err());
}
