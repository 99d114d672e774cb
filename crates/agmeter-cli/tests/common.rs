//! Common test utilities shared across integration tests.
//!
//! Note: Clippy cannot track usage across integration test files,
//! hence the `allow(dead_code)` annotation. This is a standard pattern
//! for Rust integration test fixtures.
#![cfg(test)]
#![allow(dead_code)]

use assert_cmd::Command;
use chrono::{Duration, SecondsFormat, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// An isolated home directory for one test invocation. Log roots, the
/// config file, and the database all live under it, so the binary under
/// test never touches the real user environment.
pub struct TestFixture {
    _temp_dir: TempDir,
    home: PathBuf,
    config_path: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        fs::create_dir_all(&home).expect("Failed to create home dir");

        // Manual sync by default so each test controls when scanning happens.
        let config_path = home.join("config.toml");
        fs::write(&config_path, "autosync = false\n").expect("Failed to write config");

        Self {
            _temp_dir: temp_dir,
            home,
            config_path,
        }
    }

    pub fn home(&self) -> &PathBuf {
        &self.home
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join(".agmeter").join("usage.db")
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(&self.config_path, contents).expect("Failed to write config");
    }

    pub fn codex_log_dir(&self) -> PathBuf {
        let dir = self.home.join(".codex").join("sessions");
        fs::create_dir_all(&dir).expect("Failed to create codex log dir");
        dir
    }

    pub fn claude_log_dir(&self) -> PathBuf {
        let dir = self.home.join(".claude").join("projects");
        fs::create_dir_all(&dir).expect("Failed to create claude log dir");
        dir
    }

    /// A minimal Codex rollout a half hour in the past, so it always
    /// falls inside the "day" query window.
    pub fn write_codex_session(&self, name: &str, id: &str) {
        let started = stamp(35);
        let ended = stamp(30);
        let lines = [
            format!(
                r#"{{"type":"session_meta","timestamp":"{started}","payload":{{"id":"{id}","cwd":"/work/demo","model_provider":"openai"}}}}"#
            ),
            format!(
                r#"{{"type":"turn_context","timestamp":"{started}","payload":{{"model":"gpt-5"}}}}"#
            ),
            format!(
                r#"{{"type":"response_item","timestamp":"{started}","payload":{{"type":"message","role":"user","content":[{{"type":"input_text","text":"hello"}}]}}}}"#
            ),
            format!(
                r#"{{"type":"event_msg","timestamp":"{ended}","payload":{{"type":"token_count","info":{{"total_token_usage":{{"input_tokens":100,"output_tokens":40,"total_tokens":140}}}}}}}}"#
            ),
        ];
        fs::write(self.codex_log_dir().join(name), lines.join("\n"))
            .expect("Failed to write codex session");
    }

    /// A minimal Claude session under an encoded project directory.
    pub fn write_claude_session(&self, name: &str, id: &str) {
        let started = stamp(35);
        let ended = stamp(30);
        let lines = [
            format!(
                r#"{{"type":"user","timestamp":"{started}","sessionId":"{id}","cwd":"/work/demo","message":{{"role":"user","content":"hello"}}}}"#
            ),
            format!(
                r#"{{"type":"assistant","timestamp":"{ended}","sessionId":"{id}","message":{{"model":"claude-sonnet-4","role":"assistant","content":"hi","usage":{{"input_tokens":200,"output_tokens":80}}}}}}"#
            ),
        ];
        let project_dir = self.claude_log_dir().join("-work-demo");
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        fs::write(project_dir.join(name), lines.join("\n"))
            .expect("Failed to write claude session");
    }

    pub fn command(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("agmeter");
        cmd.env("HOME", &self.home)
            .arg("-c")
            .arg(&self.config_path);
        cmd
    }
}

fn stamp(minutes_ago: i64) -> String {
    (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339_opts(SecondsFormat::Secs, true)
}
