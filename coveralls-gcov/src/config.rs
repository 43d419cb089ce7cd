//! Command line arguments and environment configuration.

use error::{ErrorKind, Result};
use extract::GcovCommand;

use clap::{App, ArgMatches};
use linecov::discover::SOURCE_EXTENSIONS;

use std::path::PathBuf;
use std::time::Duration;

/// The Coveralls endpoint receiving jobs.
pub const DEFAULT_ENDPOINT: &str = "https://coveralls.io/api/v1/jobs";

/// Seconds to wait for the Coveralls response.
const DEFAULT_TIMEOUT_SECS: &str = "60";

/// Everything a run needs, collected once from the command line and environment.
#[derive(Debug)]
pub struct Config {
    /// Directory containing `*.gcda` and `*.gcno`.
    pub object_dir: PathBuf,
    /// Directory containing the source files to report.
    pub source_dir: PathBuf,
    /// Extensions of tracked source files.
    pub extensions: Vec<String>,
    /// The coverage-dump tool.
    pub gcov: GcovCommand,
    /// Directory where the tool writes its `*.gcov` output.
    pub work_dir: PathBuf,
    /// Secret token of the repository.
    pub repo_token: String,
    /// Where to POST the job.
    pub endpoint: String,
    /// CI service name, e.g. `travis-ci`.
    pub service_name: Option<String>,
    /// CI job identifier.
    pub service_job_id: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Print the source files instead of submitting.
    pub dry_run: bool,
}

/// Describes the command line interface using `clap`.
#[allow(dangerous_implicit_autorefs)] // triggered inside clap 2.x `crate_authors!`.
pub fn app() -> App<'static, 'static> {
    clap_app!(coveralls_gcov =>
        (bin_name: "coveralls-gcov")
        (author: crate_authors!(", "))
        (about: crate_description!())
        (version: crate_version!())
        (@setting DeriveDisplayOrder)
        (@setting UnifiedHelpMessage)
        (@arg objectdir: -o --objectdir <DIR> "Directory containing the *.gcda and *.gcno files")
        (@arg sourcedir: -s --sourcedir <DIR> "Directory containing the source files to report")
        (@arg extension: --extension [EXT]... +use_delimiter "Extension of tracked source files, default to `c` and `m`")
        (@arg gcov: --gcov [CMD] env("GCOV") "The gcov command, e.g. `llvm-cov gcov`, default to `gcov`")
        (@arg workdir: --workdir [DIR] "Directory where gcov writes its *.gcov output, default to the current directory")
        (@arg token: --token [TOKEN] env("COVERALLS_REPO_TOKEN") hide_env_values(true) "Repository token")
        (@arg endpoint: --endpoint [URL] env("COVERALLS_ENDPOINT") "Where to submit the job, default to the Coveralls API")
        (@arg service_name: --("service-name") [NAME] env("COVERALLS_SERVICE_NAME") "Name of the CI service")
        (@arg service_job_id: --("service-job-id") [ID] env("TRAVIS_JOB_ID") "Job identifier assigned by the CI service")
        (@arg timeout: --timeout [SECS] "Seconds to wait for the response, default to 60")
        (@arg dry_run: --("dry-run") "Print the collected coverage instead of submitting it")
    )
}

impl Config {
    /// Reads the configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// * Returns [`MissingRepoToken`] if neither `--token` nor `COVERALLS_REPO_TOKEN` is provided, unless this is a
    ///   dry run.
    /// * Returns [`InvalidTimeout`] if `--timeout` is not a number.
    /// * Returns [`EmptyGcovCommand`] if `--gcov` is blank.
    ///
    /// [`MissingRepoToken`]: ../error/enum.ErrorKind.html#variant.MissingRepoToken
    /// [`InvalidTimeout`]: ../error/enum.ErrorKind.html#variant.InvalidTimeout
    /// [`EmptyGcovCommand`]: ../error/enum.ErrorKind.html#variant.EmptyGcovCommand
    pub fn parse(matches: &ArgMatches) -> Result<Config> {
        let dry_run = matches.is_present("dry_run");
        let repo_token = match matches.value_of("token").filter(|t| !t.is_empty()) {
            Some(token) => token.to_owned(),
            None if dry_run => String::new(),
            None => bail!(ErrorKind::MissingRepoToken),
        };

        let timeout = matches.value_of("timeout").unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = timeout.parse().map_err(|_| ErrorKind::InvalidTimeout(timeout.to_owned()))?;

        let extensions = match matches.values_of("extension") {
            Some(values) => values.map(|e| e.trim_start_matches('.').to_owned()).collect(),
            None => SOURCE_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
        };

        Ok(Config {
            object_dir: matches.value_of_os("objectdir").expect("required").into(),
            source_dir: matches.value_of_os("sourcedir").expect("required").into(),
            extensions,
            gcov: GcovCommand::parse(matches.value_of("gcov").unwrap_or("gcov"))?,
            work_dir: matches.value_of_os("workdir").unwrap_or_else(|| ".".as_ref()).into(),
            repo_token,
            endpoint: matches.value_of("endpoint").unwrap_or(DEFAULT_ENDPOINT).to_owned(),
            service_name: matches.value_of("service_name").map(str::to_owned),
            service_job_id: matches.value_of("service_job_id").map(str::to_owned),
            timeout: Duration::from_secs(timeout),
            dry_run,
        })
    }
}

#[cfg(test)]
fn parse_from(args: &[&str]) -> Result<Config> {
    let matches = app().get_matches_from_safe(args).expect("valid arguments");
    Config::parse(&matches)
}

#[test]
fn test_parse_minimal() {
    let config = parse_from(&["coveralls-gcov", "-o", "build/obj", "-s", "source", "--token", "abc"]).unwrap();
    assert_eq!(config.object_dir, PathBuf::from("build/obj"));
    assert_eq!(config.source_dir, PathBuf::from("source"));
    assert_eq!(config.repo_token, "abc");
    assert_eq!(config.extensions, vec!["c", "m"]);
    assert_eq!(config.work_dir, PathBuf::from("."));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert!(!config.dry_run);
}

#[test]
fn test_parse_everything() {
    let config = parse_from(&[
        "coveralls-gcov",
        "--objectdir",
        "obj",
        "--sourcedir",
        "src",
        "--token",
        "abc",
        "--extension",
        "c,.cpp",
        "--gcov",
        "llvm-cov gcov",
        "--workdir",
        "/tmp/gcov",
        "--endpoint",
        "http://localhost:8080/jobs",
        "--service-name",
        "travis-ci",
        "--service-job-id",
        "1234",
        "--timeout",
        "5",
        "--dry-run",
    ]).unwrap();
    assert_eq!(config.extensions, vec!["c", "cpp"]);
    assert_eq!(config.gcov.program(), "llvm-cov");
    assert_eq!(config.work_dir, PathBuf::from("/tmp/gcov"));
    assert_eq!(config.endpoint, "http://localhost:8080/jobs");
    assert_eq!(config.service_name.as_ref().map(|s| &**s), Some("travis-ci"));
    assert_eq!(config.service_job_id.as_ref().map(|s| &**s), Some("1234"));
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert!(config.dry_run);
}

#[test]
fn test_parse_invalid_timeout() {
    let error = parse_from(&["coveralls-gcov", "-o", "o", "-s", "s", "--token", "abc", "--timeout", "soon"]).unwrap_err();
    match *error.kind() {
        ErrorKind::InvalidTimeout(ref value) => assert_eq!(value, "soon"),
        ref e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn test_parse_missing_token() {
    if ::std::env::var_os("COVERALLS_REPO_TOKEN").is_some() {
        return;
    }
    let error = parse_from(&["coveralls-gcov", "-o", "o", "-s", "s"]).unwrap_err();
    match *error.kind() {
        ErrorKind::MissingRepoToken => {},
        ref e => panic!("unexpected error {:?}", e),
    }
}

#[test]
fn test_dry_run_needs_no_token() {
    if ::std::env::var_os("COVERALLS_REPO_TOKEN").is_some() {
        return;
    }
    let config = parse_from(&["coveralls-gcov", "-o", "o", "-s", "s", "--dry-run"]).unwrap();
    assert!(config.dry_run);
    assert_eq!(config.repo_token, "");
}

#[test]
fn test_required_directories() {
    assert!(app().get_matches_from_safe(&["coveralls-gcov", "-o", "obj", "--token", "abc"]).is_err());
    assert!(app().get_matches_from_safe(&["coveralls-gcov", "-s", "src", "--token", "abc"]).is_err());
}
