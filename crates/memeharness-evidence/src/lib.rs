//! Test evidence recording for memeharness.
//!
//! Recorders accept named attachments (response bodies, parsed JSON) from
//! the request executor and persist them for the audit trail. Recording is
//! a pure side channel: it never affects control flow or return values, and
//! a recorder that fails to write only logs the problem.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Attachment payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Plain text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl AttachmentKind {
    /// File extension used when persisting to disk.
    pub fn extension(self) -> &'static str {
        match self {
            AttachmentKind::Text => "txt",
            AttachmentKind::Json => "json",
        }
    }
}

/// A named piece of test evidence.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Human-readable attachment name.
    pub name: String,
    /// Payload format.
    pub kind: AttachmentKind,
    /// Payload content.
    pub content: String,
}

impl Attachment {
    /// Create a text attachment.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttachmentKind::Text,
            content: content.into(),
        }
    }

    /// Create a JSON attachment from a structured value.
    pub fn json(name: impl Into<String>, value: &serde_json::Value) -> Self {
        let content = serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string());
        Self {
            name: name.into(),
            kind: AttachmentKind::Json,
            content,
        }
    }
}

/// Sink for test evidence.
pub trait Recorder: Send + Sync {
    /// Persist an attachment for the current test context.
    fn attach(&self, attachment: Attachment);
}

/// Recorder that discards all evidence.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn attach(&self, _attachment: Attachment) {}
}

/// Recorder that writes numbered attachment files into a directory.
///
/// Files are named `NNN-<slug>.<ext>` so evidence reads back in the order
/// it was recorded.
#[derive(Debug)]
pub struct FileRecorder {
    dir: PathBuf,
    counter: AtomicUsize,
}

impl FileRecorder {
    /// Create a recorder rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            counter: AtomicUsize::new(0),
        })
    }

    /// Directory attachments are written into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slug(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect()
    }
}

impl Recorder for FileRecorder {
    fn attach(&self, attachment: Attachment) {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        let file = self.dir.join(format!(
            "{seq:03}-{}.{}",
            Self::slug(&attachment.name),
            attachment.kind.extension()
        ));
        let stamped = format!(
            "recorded-at: {}\n\n{}",
            chrono::Utc::now().to_rfc3339(),
            attachment.content
        );
        if let Err(e) = std::fs::write(&file, stamped) {
            tracing::warn!("failed to write evidence file {}: {}", file.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_attachment_pretty_prints() {
        let value = serde_json::json!({"token": "abc"});
        let attachment = Attachment::json("Response JSON", &value);
        assert_eq!(attachment.kind, AttachmentKind::Json);
        assert!(attachment.content.contains("\"token\": \"abc\""));
    }

    #[test]
    fn file_recorder_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FileRecorder::new(dir.path()).unwrap();

        recorder.attach(Attachment::text("Response", "Status code: 200"));
        recorder.attach(Attachment::json("Response JSON", &serde_json::json!({"id": 1})));

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["000-response.txt", "001-response-json.json"]);

        let text = std::fs::read_to_string(dir.path().join("000-response.txt")).unwrap();
        assert!(text.contains("Status code: 200"));
    }

    #[test]
    fn null_recorder_is_silent() {
        NullRecorder.attach(Attachment::text("anything", "goes"));
    }
}
