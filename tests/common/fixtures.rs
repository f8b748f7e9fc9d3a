//! Transcript fixtures for tests.
//!
//! Fixtures are kept inline and written to a fresh temporary directory per
//! test, so tests never share files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create, increment and delete one counter, then delete it again.
pub const LIFECYCLE_JSONL: &str = r#"{"method":"/provider.ResourceProvider/Create","request":{"urn":"urn:c1","properties":{"start":5}},"response":{"id":"*","properties":{"value":5}}}
{"method":"/provider.ResourceProvider/Update","request":{"id":"counter-1","urn":"urn:c1","news":{"step":2}},"response":{"properties":{"value":7}}}
{"method":"/provider.ResourceProvider/Read","request":{"id":"counter-1","urn":"urn:c1"},"response":{"id":"counter-1","properties":{"value":7}}}
{"method":"/provider.ResourceProvider/Delete","request":{"id":"counter-1","urn":"urn:c1"},"response":{}}
{"method":"/provider.ResourceProvider/Delete","request":{"id":"counter-1","urn":"urn:c1"},"errors":["*"]}
"#;

/// Check and Diff pairs for two counters, as a JSON array.
pub const UPGRADE_JSON: &str = r#"[
  {"method":"/provider.ResourceProvider/Check","request":{"urn":"urn:c1","news":{"start":"5"}},"response":{"inputs":{"start":"5"}}},
  {"method":"/provider.ResourceProvider/Diff","request":{"id":"counter-1","urn":"urn:c1","olds":{"start":"5"},"news":{"start":"5"}},"response":{"changes":"DIFF_NONE"}},
  {"method":"/provider.ResourceProvider/Check","request":{"urn":"urn:c2","news":{"start":1}},"response":{"inputs":{"start":1}}},
  {"method":"/provider.ResourceProvider/Diff","request":{"id":"counter-2","urn":"urn:c2","olds":{"start":1},"news":{"start":1}},"response":{"changes":"DIFF_NONE"}}
]"#;

/// A transcript file in its own temporary directory.
pub struct TranscriptFixture {
    dir: TempDir,
    pub path: PathBuf,
}

impl TranscriptFixture {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Write `contents` to `<tempdir>/<name>`.
///
/// # Panics
///
/// Panics if the temporary directory or file cannot be created.
pub fn write_transcript(name: &str, contents: &str) -> TranscriptFixture {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write transcript fixture");
    TranscriptFixture { dir, path }
}
