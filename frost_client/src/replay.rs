//! Recorded server sessions.
//!
//! A replay is newline-delimited JSON, one envelope per line, stamped with
//! the time (seconds from start) it was received:
//!
//! ```text
//! # comment
//! {"at": 0.0, "session": 1, "message": {"event": "room_joined", "data": {...}}}
//! ```

use std::path::Path;

use anyhow::Context;
use frost_shared::net::{Envelope, ServerEvent, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLine {
    /// Seconds since the start of the recording.
    pub at: f64,
    pub session: SessionId,
    pub message: ServerEvent,
}

impl ReplayLine {
    pub fn into_envelope(self) -> Envelope {
        Envelope::new(self.session, self.message)
    }
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ReplayLine>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let parsed: ReplayLine = serde_json::from_str(line).context("decode replay line")?;
    Ok(Some(parsed))
}

/// Parses a whole replay, skipping lines that do not decode.
pub fn parse(text: &str) -> Vec<ReplayLine> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(entry)) => out.push(entry),
            Ok(None) => {}
            Err(e) => warn!(line = idx + 1, error = %format!("{e:#}"), "Skipping replay line"),
        }
    }
    out
}

/// Reads and parses a replay file.
pub async fn load(path: &Path) -> anyhow::Result<Vec<ReplayLine>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read replay {}", path.display()))?;
    let lines = parse(&text);
    debug!(path = %path.display(), messages = lines.len(), "Loaded replay");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_comment_and_bad_lines() {
        let text = r#"
# recorded locally
{"at": 0.0, "session": 1, "message": {"event": "server_error", "data": {"message": "x"}}}
{"at": 0.1, "session": 1, "message": {"event": "no_such_event", "data": {}}}
not json at all

{"at": 0.2, "session": 1, "message": {"event": "room_update", "data": {"room": {}}}}
"#;
        let lines = parse(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].message.name(), "server_error");
        assert_eq!(lines[1].at, 0.2);
        assert_eq!(lines[1].clone().into_envelope().session, SessionId(1));
    }

    #[test]
    fn bad_line_error_has_context() {
        let err = parse_line("{").unwrap_err();
        assert!(format!("{err:#}").contains("decode replay line"));
        assert!(parse_line("   # note").unwrap().is_none());
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let err = load(Path::new("/no/such/replay.jsonl")).await.unwrap_err();
        assert!(err.to_string().contains("read replay"));
    }
}
