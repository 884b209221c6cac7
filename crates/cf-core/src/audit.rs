//! Append-only JSONL audit log of obfuscation runs.
//!
//! One JSON object per line: what went in, what came out, which modifiers
//! ran, and the seed needed to reproduce it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use cf_engine::ObfuscateResult;

/// Context shared by every record of one run.
pub struct RunInfo<'a> {
    pub executable: &'a str,
    pub platform: &'a str,
    pub seed: u64,
}

pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
}

impl AuditLogger {
    /// Open `path` for appending, creating parent directories.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            session_id: generate_session_id(),
        })
    }

    /// A logger that discards everything.
    pub fn noop() -> Self {
        Self {
            writer: None,
            session_id: generate_session_id(),
        }
    }

    /// Open the log at `path` when `enabled`, else a no-op. Open failures
    /// are reported on stderr and degrade to a no-op.
    pub fn open_or_noop(enabled: bool, path: &Path, tag: &str) -> Self {
        if !enabled {
            return Self::noop();
        }
        Self::new(path).unwrap_or_else(|e| {
            eprintln!("[cf:{tag}] warning: audit log {}: {e}", path.display());
            Self::noop()
        })
    }

    pub fn log_obfuscated(&mut self, run: &RunInfo<'_>, input: &str, result: &ObfuscateResult) {
        let errors = errors_json(result);
        self.write_event(serde_json::json!({
            "ts": epoch_secs(),
            "session": self.session_id,
            "type": "obfuscated",
            "executable": run.executable,
            "platform": run.platform,
            "seed": run.seed,
            "input": input,
            "output": result.output,
            "applied": result.applied,
            "skipped": result.skipped,
            "errors": errors,
        }));
    }

    pub fn log_failed(&mut self, run: &RunInfo<'_>, input: &str, reason: &str) {
        self.write_event(serde_json::json!({
            "ts": epoch_secs(),
            "session": self.session_id,
            "type": "failed",
            "executable": run.executable,
            "platform": run.platform,
            "seed": run.seed,
            "input": input,
            "reason": reason,
        }));
    }

    fn write_event(&mut self, value: serde_json::Value) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(line) = serde_json::to_string(&value) {
                let _ = writeln!(writer, "{line}");
                let _ = writer.flush();
            }
        }
    }
}

/// Modifier name -> error message.
pub fn errors_json(result: &ObfuscateResult) -> serde_json::Map<String, serde_json::Value> {
    result
        .errors
        .iter()
        .map(|(name, err)| (name.clone(), serde_json::Value::String(err.to_string())))
        .collect()
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn generate_session_id() -> String {
    let pid = std::process::id();
    let ts = epoch_secs();
    format!("s{:x}", pid ^ (ts as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_engine::ModifierError;

    fn read_log_lines(path: &Path) -> Vec<serde_json::Value> {
        let content = std::fs::read_to_string(path).unwrap();
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn run_info() -> RunInfo<'static> {
        RunInfo {
            executable: "certutil",
            platform: "windows",
            seed: 42,
        }
    }

    fn result() -> ObfuscateResult {
        let mut res = ObfuscateResult {
            output: "certutil -URLCACHE".to_string(),
            applied: vec!["RandomCase".to_string()],
            skipped: vec!["Pending".to_string()],
            ..Default::default()
        };
        res.errors
            .insert("CharacterInsertion".to_string(), ModifierError::EmptyPool("Characters"));
        res
    }

    #[test]
    fn new_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("audit.jsonl");
        let _logger = AuditLogger::new(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn noop_logger_discards() {
        let mut logger = AuditLogger::noop();
        logger.log_obfuscated(&run_info(), "certutil -urlcache", &result());
    }

    #[test]
    fn disabled_open_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut logger = AuditLogger::open_or_noop(false, &path, "test");
        logger.log_failed(&run_info(), "", "empty");
        assert!(!path.exists());
    }

    #[test]
    fn obfuscated_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut logger = AuditLogger::new(&path).unwrap();

        logger.log_obfuscated(&run_info(), "certutil -urlcache", &result());

        let lines = read_log_lines(&path);
        assert_eq!(lines.len(), 1);
        let rec = &lines[0];
        assert_eq!(rec["type"], "obfuscated");
        assert_eq!(rec["executable"], "certutil");
        assert_eq!(rec["platform"], "windows");
        assert_eq!(rec["seed"], 42);
        assert_eq!(rec["input"], "certutil -urlcache");
        assert_eq!(rec["output"], "certutil -URLCACHE");
        assert_eq!(rec["applied"][0], "RandomCase");
        assert_eq!(rec["skipped"][0], "Pending");
        assert!(rec["errors"]["CharacterInsertion"]
            .as_str()
            .unwrap()
            .contains("Characters"));
        assert!(rec["ts"].as_u64().unwrap() > 0);
    }

    #[test]
    fn entries_append_with_one_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut logger = AuditLogger::new(&path).unwrap();

        logger.log_obfuscated(&run_info(), "certutil -urlcache", &result());
        logger.log_failed(&run_info(), "   ", "empty command");

        let lines = read_log_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["type"], "failed");
        assert_eq!(lines[1]["reason"], "empty command");
        assert_eq!(lines[0]["session"], lines[1]["session"]);
    }
}
