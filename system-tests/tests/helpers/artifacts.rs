// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact directories and summary reporting for system tests.
// Purpose: Give every test a durable evidence trail for post-run audit.
// Dependencies: armada-client, armada-remote, serde, serde_jcs, system-tests
// ============================================================================

//! ## Overview
//! Each test owns one artifact directory under the configured run root and
//! records a canonical `summary.json` plus a human-readable `summary.md` on
//! completion. Command and query transcripts are written as JSON so a failed
//! run can be replayed from evidence alone. A reporter dropped during a
//! panic records a `panic` summary on a best-effort basis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use armada_client::QueryRecord;
use armada_remote::CommandRecord;
use serde::Serialize;
use system_tests::config::SystemTestConfig;
use system_tests::config::SystemTestEnv;

// ============================================================================
// SECTION: Summary Document
// ============================================================================

/// Machine-readable record of one test outcome.
#[derive(Debug, Clone, Serialize)]
struct TestSummary {
    /// Test name, matching the artifact directory name.
    test_name: String,
    /// Outcome label: `pass`, `fail`, `skip`, or `panic`.
    status: String,
    /// Wall-clock start in milliseconds since the Unix epoch.
    started_at_ms: u128,
    /// Wall-clock end in milliseconds since the Unix epoch.
    ended_at_ms: u128,
    /// Elapsed duration in milliseconds.
    duration_ms: u128,
    /// Free-form notes recorded by the test.
    notes: Vec<String>,
    /// Relative names of artifact files the test produced.
    artifacts: Vec<String>,
}

/// Returns milliseconds since the Unix epoch, zero when the clock is skewed.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

/// Returns the default run root for a test when none is configured.
fn default_run_root(test_name: &str) -> PathBuf {
    PathBuf::from("target")
        .join("system-tests")
        .join(format!("run_{}", now_millis()))
        .join(test_name)
}

// ============================================================================
// SECTION: Artifact Directory
// ============================================================================

/// Artifact directory for a single test.
#[derive(Debug)]
pub struct TestArtifacts {
    /// Directory all artifact files land in.
    root: PathBuf,
}

impl TestArtifacts {
    /// Creates the artifact directory for a test.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration loading fails, when the directory
    /// already exists and reuse is not allowed, or on filesystem failure.
    pub fn new(test_name: &str) -> Result<Self, String> {
        let config = SystemTestConfig::load()?;
        let root = config
            .run_root
            .clone()
            .map_or_else(|| default_run_root(test_name), |base| base.join(test_name));
        if root.exists() && !config.allow_overwrite {
            return Err(format!(
                "artifact root {} already exists; set {}=1 to reuse it",
                root.display(),
                SystemTestEnv::AllowOverwrite.as_str()
            ));
        }
        fs::create_dir_all(&root)
            .map_err(|err| format!("cannot create artifact root {}: {err}", root.display()))?;
        Ok(Self { root })
    }

    /// Returns the artifact directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a text artifact and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error on filesystem failure.
    pub fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf, String> {
        let path = self.root.join(name);
        fs::write(&path, contents)
            .map_err(|err| format!("cannot write artifact {}: {err}", path.display()))?;
        Ok(path)
    }

    /// Writes a canonical JSON artifact and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the filesystem write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, String> {
        let canonical = serde_jcs::to_string(value)
            .map_err(|err| format!("cannot serialize artifact {name}: {err}"))?;
        self.write_text(name, &canonical)
    }

    /// Writes a command transcript artifact and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the filesystem write fails.
    pub fn write_command_transcript(
        &self,
        name: &str,
        records: &[CommandRecord],
    ) -> Result<PathBuf, String> {
        self.write_json(name, &records)
    }

    /// Writes a query transcript artifact and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the filesystem write fails.
    pub fn write_query_transcript(
        &self,
        name: &str,
        records: &[QueryRecord],
    ) -> Result<PathBuf, String> {
        self.write_json(name, &records)
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Records one test outcome with timing, notes, and artifact names.
#[derive(Debug)]
pub struct TestReporter {
    /// Test name, matching the artifact directory name.
    test_name: String,
    /// Wall-clock start in milliseconds since the Unix epoch.
    started_at_ms: u128,
    /// Artifact directory for this test.
    artifacts: TestArtifacts,
    /// Set once a summary has been written.
    finished: bool,
}

impl TestReporter {
    /// Creates a reporter and its artifact directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the artifact directory cannot be created.
    pub fn new(test_name: &str) -> Result<Self, String> {
        let artifacts = TestArtifacts::new(test_name)?;
        Ok(Self {
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            artifacts,
            finished: false,
        })
    }

    /// Returns the artifact directory for supplementary files.
    #[must_use]
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the summary documents and marks the reporter finished.
    ///
    /// # Errors
    ///
    /// Returns an error when the summary files cannot be written.
    pub fn finish(
        &mut self,
        status: &str,
        notes: Vec<String>,
        artifact_names: Vec<String>,
    ) -> Result<(), String> {
        self.write_summary(status, &notes, &artifact_names)?;
        self.finished = true;
        Ok(())
    }

    /// Renders and writes `summary.json` and `summary.md`.
    fn write_summary(
        &self,
        status: &str,
        notes: &[String],
        artifact_names: &[String],
    ) -> Result<(), String> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes: notes.to_vec(),
            artifacts: artifact_names.to_vec(),
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &render_markdown(&summary))?;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.finished && std::thread::panicking() {
            let note = format!("{} panicked before finishing", self.test_name);
            let _ = self.write_summary("panic", &[note], &[]);
        }
    }
}

/// Renders the human-readable summary document.
fn render_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", summary.test_name));
    out.push_str(&format!("- Status: {}\n", summary.status));
    out.push_str(&format!("- Started (ms since epoch): {}\n", summary.started_at_ms));
    out.push_str(&format!("- Duration (ms): {}\n\n", summary.duration_ms));
    out.push_str("## Notes\n");
    if summary.notes.is_empty() {
        out.push_str("- (none)\n");
    } else {
        for note in &summary.notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    out.push_str("\n## Artifacts\n");
    if summary.artifacts.is_empty() {
        out.push_str("- (none)\n");
    } else {
        for artifact in &summary.artifacts {
            out.push_str(&format!("- {artifact}\n"));
        }
    }
    out
}
