//! `coveralls-gcov` collects the line coverage of a C/Objective-C build from its `*.gcda`/`*.gcno` files and submits
//! it to [Coveralls](https://coveralls.io).
//!
//! The run has three stages:
//!
//! 1. Discovery: pair up `*.gcda` and `*.gcno` in the object directory, list the sources in the source directory.
//! 2. Extraction: run `gcov` on every pair and merge the per-line counts of each source file.
//! 3. Submission: POST the job to Coveralls and print the response.
//!
//! The repository token is read from `--token` or `COVERALLS_REPO_TOKEN`.

#![recursion_limit = "128"] // needed for error_chain.

#[macro_use]
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_json;
extern crate env_logger;
extern crate linecov;
extern crate reqwest;
extern crate termcolor;

#[macro_use]
mod ui;
mod config;
mod error;
mod extract;
mod submit;

use config::{Config, app};
use error::Result;
use extract::Extractor;

use linecov::discover::{scan_objects, scan_sources};
use linecov::report::collect_source_files;
use linecov::Job;
use serde_json::Value;

use std::io::{Write, stdout};
use std::process::exit;

/// Program entry. Calls [`run()`] and prints any error returned to `stderr`.
///
/// [`run()`]: ./fn.run.html
fn main() {
    if let Err(error) = run() {
        ui::print_error(&error).expect("error while printing error 🤷");
        exit(1);
    }
}

/// Runs the `coveralls-gcov` program.
fn run() -> Result<()> {
    let matches = app().get_matches();
    env_logger::init();

    let config = Config::parse(&matches)?;
    debug!("gcov = {:?}, work_dir = {:?}, extensions = {:?}", config.gcov, config.work_dir, config.extensions);

    progress!("Scanning", "{}", config.object_dir.display());
    let pairs = scan_objects(&config.object_dir)?;
    let mut sources = scan_sources(&config.source_dir, &config.extensions)?;
    if sources.is_empty() {
        warning!("no source file with extension {} in `{}`", config.extensions.join(", "), config.source_dir.display());
    }

    let units = Extractor::new(&config)?.extract_all(&pairs, &mut sources)?;
    if units == 0 {
        warning!("no *.gcda/*.gcno pair in `{}`", config.object_dir.display());
    }

    let source_files = collect_source_files(&config.source_dir, sources)?;
    for file in &source_files {
        ui::print_file_summary(&file.name, file.coverage.lines_covered(), file.coverage.lines_count())?;
    }

    let result = if config.dry_run {
        serde_json::to_value(&source_files)?
    } else {
        let job = Job::new(config.repo_token.clone(), source_files).with_service(config.service_name.clone(), config.service_job_id.clone());
        progress!("Submitting", "{} source files to {}", job.source_files.len(), config.endpoint);
        let client = submit::client(&config)?;
        submit::submit(&client, &config.endpoint, &job)?
    };
    print_result(&result)
}

/// Prints the response (or the dry-run output) to `stdout`.
fn print_result(result: &Value) -> Result<()> {
    let stdout = stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, result)?;
    writeln!(lock)?;
    Ok(())
}
