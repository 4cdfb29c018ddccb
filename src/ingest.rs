//! Folding local text files into the next outgoing message.
//!
//! Uploaded files are never sent on their own.  Their contents are appended
//! to the input buffer between two markers so the user can review the
//! message, add a question, and then send it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::observability::{INGEST_BYTES, INGEST_FILES, INGEST_REJECTED};

/// Marker written before the file contents.
pub const FILE_START_MARKER: &str = "--- INICIO DEL ARCHIVO ---";

/// Marker written after the file contents.
pub const FILE_END_MARKER: &str = "--- FIN DEL ARCHIVO ---";

/// Extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "log", "conf", "text"];

/// A file the user picked for upload.
pub trait SelectedFile {
    /// File name shown in the message header.
    fn name(&self) -> &str;

    /// Declared media type, e.g. `text/plain`.
    fn media_type(&self) -> &str;

    /// Read the whole file.
    fn read(&self) -> std::io::Result<Vec<u8>>;
}

/// A file on the local filesystem whose media type is derived from its
/// extension.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    media_type: String,
}

impl LocalFile {
    /// Select the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for_path(&path).to_string();
        Self {
            path,
            name,
            media_type,
        }
    }

    /// Select the file at `path` the way the upload picker does: only
    /// paths with one of the [`ACCEPTED_EXTENSIONS`] can be picked.
    pub fn pick(path: impl Into<PathBuf>) -> Result<Self> {
        let file = Self::new(path);
        if !has_accepted_extension(&file.path) {
            INGEST_REJECTED.click();
            tracing::info!(path = %file.path.display(), "upload picker refused extension");
            return Err(Error::unsupported_file_type(&file.name, &file.media_type));
        }
        Ok(file)
    }

    /// Override the declared media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// The selected path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectedFile for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// An in-memory file, for front ends that already hold the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    /// File name.
    pub name: String,
    /// Declared media type.
    pub media_type: String,
    /// File contents.
    pub contents: Vec<u8>,
}

impl MemoryFile {
    /// Create an in-memory file.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            contents: contents.into(),
        }
    }
}

impl SelectedFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn read(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.contents.clone())
    }
}

/// Guess a media type from a path's extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("txt" | "log" | "conf" | "text" | "cfg" | "ini") => "text/plain",
        Some("csv") => "text/csv",
        Some("md") => "text/markdown",
        Some("yaml" | "yml") => "text/yaml",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        _ => "application/octet-stream",
    }
}

/// Returns true if `path` has one of the [`ACCEPTED_EXTENSIONS`].
pub fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Render the block appended to the input buffer for one file.
pub fn format_file_block(name: &str, content: &str) -> String {
    format!(
        "\n\nHe subido este archivo para tu análisis ({name}):\n{FILE_START_MARKER}\n{content}\n{FILE_END_MARKER}"
    )
}

/// Read `file` and append its contents to `buffer`.
///
/// The file is taken by value: once ingested the selection is gone, so the
/// same file can be picked again.  On error `buffer` is left untouched.
pub fn ingest<F: SelectedFile>(file: F, buffer: &mut String) -> Result<()> {
    if !file.media_type().starts_with("text/") {
        INGEST_REJECTED.click();
        tracing::info!(
            name = file.name(),
            media_type = file.media_type(),
            "rejected non-text upload"
        );
        return Err(Error::unsupported_file_type(file.name(), file.media_type()));
    }
    let bytes = file.read().map_err(|err| {
        INGEST_REJECTED.click();
        Error::file_read(file.name(), err)
    })?;
    let content = String::from_utf8_lossy(&bytes);
    buffer.push_str(&format_file_block(file.name(), &content));
    INGEST_FILES.click();
    INGEST_BYTES.count(bytes.len() as u64);
    tracing::info!(name = file.name(), bytes = bytes.len(), "file ingested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct UnreadableFile;

    impl SelectedFile for UnreadableFile {
        fn name(&self) -> &str {
            "secret.log"
        }

        fn media_type(&self) -> &str {
            "text/plain"
        }

        fn read(&self) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn picker_refuses_other_extensions() {
        let err = LocalFile::pick("/etc/netdoctor/notes.md").unwrap_err();
        assert!(err.is_unsupported_file_type());
        assert!(LocalFile::pick("/var/log/syslog.log").is_ok());
        assert!(LocalFile::pick("R1-running.CONF").is_ok());
        assert!(LocalFile::pick("capture").is_err());
    }

    #[test]
    fn text_file_is_appended_with_markers() {
        let mut buffer = "Mira esto:".to_string();
        ingest(MemoryFile::new("a.txt", "text/plain", "hello"), &mut buffer).unwrap();
        assert!(buffer.starts_with("Mira esto:"));
        assert!(buffer.contains("(a.txt)"));
        assert!(buffer.contains(FILE_START_MARKER));
        assert!(buffer.contains("hello"));
        assert!(buffer.ends_with(FILE_END_MARKER));
        assert_eq!(
            buffer,
            "Mira esto:\n\nHe subido este archivo para tu análisis (a.txt):\n--- INICIO DEL ARCHIVO ---\nhello\n--- FIN DEL ARCHIVO ---"
        );
    }

    #[test]
    fn image_is_rejected_and_buffer_untouched() {
        let mut buffer = "pending".to_string();
        let err = ingest(
            MemoryFile::new("diagram.png", "image/png", vec![0x89, b'P', b'N', b'G']),
            &mut buffer,
        )
        .unwrap_err();
        assert!(err.is_unsupported_file_type());
        assert_eq!(buffer, "pending");
    }

    #[test]
    fn read_failure_is_file_read_error() {
        let mut buffer = String::new();
        let err = ingest(UnreadableFile, &mut buffer).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn two_files_concatenate() {
        let mut buffer = String::new();
        ingest(MemoryFile::new("r1.conf", "text/plain", "hostname r1"), &mut buffer).unwrap();
        ingest(MemoryFile::new("r2.conf", "text/plain", "hostname r2"), &mut buffer).unwrap();
        let first = buffer.find("hostname r1").unwrap();
        let second = buffer.find("hostname r2").unwrap();
        assert!(first < second);
        assert_eq!(buffer.matches(FILE_START_MARKER).count(), 2);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut buffer = String::new();
        ingest(
            MemoryFile::new("dump.log", "text/plain", vec![b'o', b'k', 0xff]),
            &mut buffer,
        )
        .unwrap();
        assert!(buffer.contains("ok\u{fffd}"));
    }

    #[test]
    fn media_types_from_extensions() {
        assert_eq!(media_type_for_path(Path::new("a.txt")), "text/plain");
        assert_eq!(media_type_for_path(Path::new("syslog.LOG")), "text/plain");
        assert_eq!(media_type_for_path(Path::new("r1.conf")), "text/plain");
        assert_eq!(media_type_for_path(Path::new("a.png")), "image/png");
        assert_eq!(
            media_type_for_path(Path::new("Makefile")),
            "application/octet-stream"
        );
    }

    #[test]
    fn accepted_extensions() {
        assert!(has_accepted_extension(Path::new("/tmp/show_run.text")));
        assert!(has_accepted_extension(Path::new("x.CONF")));
        assert!(!has_accepted_extension(Path::new("x.png")));
        assert!(!has_accepted_extension(Path::new("README")));
    }

    #[test]
    fn local_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ping.log");
        fs::write(&path, "64 bytes from 8.8.8.8").unwrap();

        let file = LocalFile::new(&path);
        assert_eq!(file.name(), "ping.log");
        assert_eq!(file.media_type(), "text/plain");

        let mut buffer = String::new();
        ingest(file, &mut buffer).unwrap();
        assert!(buffer.contains("64 bytes from 8.8.8.8"));
    }

    #[test]
    fn missing_local_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = String::new();
        let err = ingest(LocalFile::new(dir.path().join("gone.txt")), &mut buffer).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn declared_media_type_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.txt");
        fs::write(&path, "x").unwrap();
        let mut buffer = String::new();
        let err = ingest(
            LocalFile::new(&path).with_media_type("application/vnd.tcpdump.pcap"),
            &mut buffer,
        )
        .unwrap_err();
        assert!(err.is_unsupported_file_type());
    }
}
