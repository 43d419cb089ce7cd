//! Running `gcov` and merging its output.
//!
//! For every translation unit with both a `*.gcda` and a `*.gcno`, the coverage-dump tool is run as
//!
//! ```sh
//! gcov -gcda=$OBJDIR/«base».gcda -gcno=$OBJDIR/«base».gcno $SRCDIR
//! ```
//!
//! inside the work directory. The tool writes one `«source name».gcov` file for each source file the unit touched,
//! including headers. Files named after a tracked source are merged into that source's coverage. Every `*.gcov` file
//! found is deleted afterwards, so the next unit starts from a clean directory.

use config::Config;
use error::{ErrorKind, Result, ResultExt};

use linecov::discover::{PairTable, SourceTable};
use linecov::{IntoStringLossy, gcov};

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs::{read_dir, remove_file};
use std::path::{Path, PathBuf};
use std::process::Command;

/// The coverage-dump tool, possibly with leading arguments (e.g. `llvm-cov gcov`).
#[derive(Clone, Debug)]
pub struct GcovCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl GcovCommand {
    /// Splits a command line on whitespace.
    pub fn parse(command: &str) -> Result<GcovCommand> {
        let mut words = command.split_whitespace().map(OsString::from);
        let program = words.next().ok_or(ErrorKind::EmptyGcovCommand)?;
        Ok(GcovCommand {
            program,
            args: words.collect(),
        })
    }

    /// The executable to run.
    pub fn program(&self) -> &OsStr {
        &self.program
    }
}

/// Runs the coverage-dump tool for each translation unit and accumulates line coverage.
#[derive(Debug)]
pub struct Extractor<'a> {
    gcov: &'a GcovCommand,
    /// Absolute path to the object directory.
    object_dir: PathBuf,
    /// Absolute path to the source directory.
    source_dir: PathBuf,
    work_dir: &'a Path,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor from the configuration.
    ///
    /// The object and source directories are made absolute, since the tool runs inside the work directory.
    pub fn new(config: &'a Config) -> Result<Extractor<'a>> {
        let current_dir = env::current_dir()?;
        Ok(Extractor {
            gcov: &config.gcov,
            object_dir: current_dir.join(&config.object_dir),
            source_dir: current_dir.join(&config.source_dir),
            work_dir: &config.work_dir,
        })
    }

    /// Extracts every complete pair in `pairs`, in order, merging the results into `sources`.
    ///
    /// Returns the number of translation units processed.
    pub fn extract_all(&self, pairs: &PairTable, sources: &mut SourceTable) -> Result<usize> {
        let mut units = 0;
        for base_name in pairs.complete() {
            progress!("Extracting", "{}", base_name);
            self.run_gcov(base_name)?;
            let merged = self.collect_outputs(sources).chain_err(|| format!("Cannot collect gcov output of `{}`", base_name))?;
            debug!("{} contributed to {} source files", base_name, merged);
            units += 1;
        }
        Ok(units)
    }

    /// Runs the tool on one translation unit.
    ///
    /// A non-zero exit status is only a warning; whatever output the tool managed to write is still collected.
    fn run_gcov(&self, base_name: &str) -> Result<()> {
        let mut cmd = self.command(base_name);
        debug!("running {:?}", cmd);
        let output = cmd.output().chain_err(|| format!("Cannot run `{}`", self.gcov.program.to_string_lossy()))?;
        let status = output.status;
        trace!("gcov stdout: {}", output.stdout.into_string_lossy());
        if !status.success() {
            warning!("gcov exited with {} on `{}`", status, base_name);
            let stderr = output.stderr.into_string_lossy();
            if !stderr.is_empty() {
                warn!("gcov stderr: {}", stderr.trim_end());
            }
        }
        Ok(())
    }

    /// Builds the command line for one translation unit.
    fn command(&self, base_name: &str) -> Command {
        let mut gcda = OsString::from("-gcda=");
        gcda.push(self.object_dir.join(format!("{}.gcda", base_name)));
        let mut gcno = OsString::from("-gcno=");
        gcno.push(self.object_dir.join(format!("{}.gcno", base_name)));

        let mut cmd = Command::new(&self.gcov.program);
        cmd.args(&self.gcov.args)
            .arg(gcda)
            .arg(gcno)
            .arg(&self.source_dir)
            .current_dir(self.work_dir);
        cmd
    }

    /// Merges the `*.gcov` files in the work directory into `sources`, then deletes them.
    ///
    /// The files are deleted even if one of them cannot be parsed, so a failed unit leaves nothing behind for the
    /// next one. Returns the number of files merged.
    fn collect_outputs(&self, sources: &mut SourceTable) -> Result<usize> {
        let mut outputs = Vec::new();
        for entry in read_dir(self.work_dir)? {
            let path = entry?.path();
            if path.extension() == Some(OsStr::new("gcov")) {
                outputs.push(path);
            }
        }
        outputs.sort();

        let merged = merge_outputs(&outputs, sources);
        for path in &outputs {
            remove_file(path).chain_err(|| format!("Cannot remove `{}`", path.display()))?;
        }
        merged
    }
}

/// Merges every `*.gcov` file named after a tracked source into that source's coverage.
fn merge_outputs(outputs: &[PathBuf], sources: &mut SourceTable) -> Result<usize> {
    let mut merged = 0;
    for path in outputs {
        let source_name = match path.file_stem() {
            Some(stem) => stem.to_os_string().into_string_lossy(),
            None => continue,
        };
        match sources.get_mut(&source_name) {
            Some(coverage) => {
                coverage.merge(&gcov::open(path)?);
                merged += 1;
            },
            None => trace!("ignoring untracked {:?}", path),
        }
    }
    Ok(merged)
}

#[test]
fn test_parse_gcov_command() {
    let cmd = GcovCommand::parse("gcov").unwrap();
    assert_eq!(cmd.program(), "gcov");
    assert!(cmd.args.is_empty());

    let cmd = GcovCommand::parse("  xcrun   llvm-cov gcov ").unwrap();
    assert_eq!(cmd.program(), "xcrun");
    assert_eq!(cmd.args, vec![OsString::from("llvm-cov"), OsString::from("gcov")]);

    match *GcovCommand::parse("   ").unwrap_err().kind() {
        ErrorKind::EmptyGcovCommand => {},
        ref e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn test_command_line() {
    let gcov = GcovCommand::parse("llvm-cov gcov").unwrap();
    let extractor = Extractor {
        gcov: &gcov,
        object_dir: PathBuf::from("/build/obj"),
        source_dir: PathBuf::from("/build/source"),
        work_dir: Path::new("/tmp"),
    };
    let rendered = format!("{:?}", extractor.command("foo"));
    assert!(rendered.contains("\"llvm-cov\" \"gcov\""), "{}", rendered);
    assert!(rendered.contains("\"-gcda=/build/obj/foo.gcda\" \"-gcno=/build/obj/foo.gcno\" \"/build/source\""), "{}", rendered);
}

#[cfg(unix)]
#[test]
fn test_extract_all_with_fake_gcov() {
    extern crate tempfile;

    use linecov::discover::scan_sources;
    use linecov::Coverage;
    use std::fs::{File, create_dir};
    use std::io::{Read, Write};

    const FAKE_GCOV: &str = r#"
printf '%s\n' "$1" >> calls.log
case "$1" in
    *foo.gcda)
        printf '        -:    0:Source:foo.c\n        2:    1:int foo(void) {\n        2:    2:    return 1;\n        -:    3:}\n' > foo.c.gcov
        printf '        -:    1:#pragma once\n        2:    2:static int one(void) { return 1; }\n' > common.h.gcov
        ;;
    *bar.gcda)
        printf '        -:    0:Source:bar.c\n    #####:    1:int bar(void) {\n' > bar.c.gcov
        printf '        -:    1:int foo(void) {\n        3:    2:    return 1;\n' > foo.c.gcov
        exit 1
        ;;
esac
"#;

    let root = tempfile::TempDir::new().expect("tempdir");
    let object_dir = root.path().join("obj");
    let source_dir = root.path().join("src");
    let work_dir = root.path().join("work");
    for dir in &[&object_dir, &source_dir, &work_dir] {
        create_dir(dir).expect("mkdir");
    }
    for name in &["foo.gcda", "foo.gcno", "bar.gcda", "bar.gcno", "baz.gcno"] {
        File::create(object_dir.join(name)).expect("touch");
    }
    for name in &["foo.c", "bar.c", "readme.txt"] {
        File::create(source_dir.join(name)).expect("touch");
    }
    let script_path = root.path().join("fake-gcov.sh");
    File::create(&script_path).and_then(|mut f| f.write_all(FAKE_GCOV.as_bytes())).expect("script");

    let gcov = GcovCommand::parse(&format!("sh {}", script_path.display())).unwrap();
    let extractor = Extractor {
        gcov: &gcov,
        object_dir: object_dir.clone(),
        source_dir: source_dir.clone(),
        work_dir: &work_dir,
    };

    let pairs = ::linecov::discover::scan_objects(&object_dir).unwrap();
    let mut sources = scan_sources(&source_dir, &["c"][..]).unwrap();
    assert_eq!(extractor.extract_all(&pairs, &mut sources).unwrap(), 2);

    assert_eq!(sources.len(), 2);
    assert_eq!(sources["bar.c"], Coverage::from(vec![Some(0)]));
    assert_eq!(sources["foo.c"], Coverage::from(vec![Some(2), Some(5), None]));

    let mut calls = String::new();
    File::open(work_dir.join("calls.log")).and_then(|mut f| f.read_to_string(&mut calls)).expect("log");
    let expected_calls = format!("-gcda={0}/bar.gcda\n-gcda={0}/foo.gcda\n", object_dir.display());
    assert_eq!(calls, expected_calls);

    let leftovers = read_dir(&work_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string_lossy())
        .filter(|name| name.ends_with(".gcov"))
        .collect::<Vec<_>>();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}

#[cfg(unix)]
#[test]
fn test_unparsable_output_is_still_removed() {
    extern crate tempfile;

    use linecov::discover::{scan_objects, scan_sources};
    use linecov::Coverage;
    use std::fs::{File, create_dir};
    use std::io::Write;

    const BROKEN_GCOV: &str = r#"
printf '        1:    1:int a;\n' > a.c.gcov
printf '      ???:    1:int b;\n' > b.c.gcov
printf '        1:    1:int c;\n' > c.c.gcov
"#;

    let root = tempfile::TempDir::new().expect("tempdir");
    let object_dir = root.path().join("obj");
    let source_dir = root.path().join("src");
    let work_dir = root.path().join("work");
    for dir in &[&object_dir, &source_dir, &work_dir] {
        create_dir(dir).expect("mkdir");
    }
    for name in &["unit.gcda", "unit.gcno"] {
        File::create(object_dir.join(name)).expect("touch");
    }
    for name in &["a.c", "b.c", "c.c"] {
        File::create(source_dir.join(name)).expect("touch");
    }
    let script_path = root.path().join("broken-gcov.sh");
    File::create(&script_path).and_then(|mut f| f.write_all(BROKEN_GCOV.as_bytes())).expect("script");

    let gcov = GcovCommand::parse(&format!("sh {}", script_path.display())).unwrap();
    let extractor = Extractor {
        gcov: &gcov,
        object_dir: object_dir.clone(),
        source_dir: source_dir.clone(),
        work_dir: &work_dir,
    };

    let pairs = scan_objects(&object_dir).unwrap();
    let mut sources = scan_sources(&source_dir, &["c"][..]).unwrap();
    let error = extractor.extract_all(&pairs, &mut sources).unwrap_err();
    assert!(error.iter().any(|e| e.to_string().contains("b.c.gcov")), "{}", error);
    assert_eq!(sources["a.c"], Coverage::from(vec![Some(1)]));
    assert!(sources["c.c"].is_empty());

    let leftovers = read_dir(&work_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string_lossy())
        .filter(|name| name.ends_with(".gcov"))
        .collect::<Vec<_>>();
    assert!(leftovers.is_empty(), "{:?}", leftovers);
}
