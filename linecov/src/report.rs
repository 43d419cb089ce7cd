//! Coveralls job.
//!
//! The [`Job`] structure is the JSON document accepted by the Coveralls `POST /api/v1/jobs` endpoint:
//!
//! ```json
//! {
//!     "repo_token": "...",
//!     "service_name": "travis-ci",
//!     "service_job_id": "1234567",
//!     "source_files": [
//!         {
//!             "name": "source/foo.c",
//!             "source_digest": "8d777f385d3dfec8815d20f7496026dc",
//!             "coverage": [null, 1, 0, null, 4]
//!         }
//!     ]
//! }
//! ```
//!
//! `service_name` and `service_job_id` are omitted when unknown.
//!
//! [`Job`]: ./struct.Job.html

use coverage::Coverage;
use discover::SourceTable;
use error::{Result, ResultExt};

use md5;
use serde_json;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Coverage of one source file, as submitted.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SourceFile {
    /// Path of the source file.
    pub name: String,

    /// Lowercase hexadecimal MD5 of the file content.
    pub source_digest: String,

    /// Line coverage.
    pub coverage: Coverage,
}

impl SourceFile {
    /// Reads the source file at `path` to compute its digest.
    pub fn read<P: AsRef<Path>>(path: P, coverage: Coverage) -> Result<SourceFile> {
        let path = path.as_ref();
        let mut content = Vec::new();
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut content))
            .chain_err(|| format!("Cannot read source file `{}`", path.display()))?;
        Ok(SourceFile {
            name: path.to_string_lossy().into_owned(),
            source_digest: digest(&content),
            coverage,
        })
    }
}

/// Computes the digest of a source file's content.
pub fn digest(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// A complete submission.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Job {
    /// Secret token of the repository.
    pub repo_token: String,

    /// Name of the CI service, e.g. `travis-ci`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// Job identifier assigned by the CI service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_job_id: Option<String>,

    /// Coverage of every source file.
    pub source_files: Vec<SourceFile>,
}

impl Job {
    /// Creates a job without CI service information.
    pub fn new(repo_token: String, source_files: Vec<SourceFile>) -> Job {
        Job {
            repo_token,
            service_name: None,
            service_job_id: None,
            source_files,
        }
    }

    /// Attaches CI service information.
    pub fn with_service(mut self, service_name: Option<String>, service_job_id: Option<String>) -> Job {
        self.service_name = service_name;
        self.service_job_id = service_job_id;
        self
    }

    /// Serializes the job as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Creates the report entry of every source file in the table, in the table's order. `source_dir` is joined in
/// front of each file name.
pub fn collect_source_files(source_dir: &Path, table: SourceTable) -> Result<Vec<SourceFile>> {
    table.into_iter().map(|(name, coverage)| SourceFile::read(source_dir.join(name), coverage)).collect()
}

#[test]
fn test_digest() {
    assert_eq!(digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
}

#[test]
fn test_job_json() {
    let job = Job::new(
        "t0k3n".to_owned(),
        vec![
            SourceFile {
                name: "src/a.c".to_owned(),
                source_digest: "00".to_owned(),
                coverage: Coverage::from(vec![None, Some(1), Some(0)]),
            },
        ],
    );
    let value: serde_json::Value = serde_json::from_str(&job.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "repo_token": "t0k3n",
            "source_files": [
                {"name": "src/a.c", "source_digest": "00", "coverage": [null, 1, 0]},
            ],
        })
    );

    let job = job.with_service(Some("travis-ci".to_owned()), Some("42".to_owned()));
    let value: serde_json::Value = serde_json::from_str(&job.to_json().unwrap()).unwrap();
    assert_eq!(value["service_name"], "travis-ci");
    assert_eq!(value["service_job_id"], "42");
}
