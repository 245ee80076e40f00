//! File intake: turns dropped or picked files into a validated [`ImageFile`].

use crate::error::IntakeRejection;
use image::ImageFormat;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_FILE_BYTES: u64 = 5_000_000;
pub const MAX_FILES: usize = 1;

/// Extensions offered by the file picker filter.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico",
];

/// Limits enforced on every intake event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_bytes: u64,
    pub max_files: usize,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_FILE_BYTES,
            max_files: MAX_FILES,
        }
    }
}

/// A validated image, ready for preview and upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file offered by a drop or the picker, before validation.
///
/// Platforms differ in what they report: native drops usually carry a path
/// and no bytes or MIME, web drops carry bytes and a MIME but no path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub mime: Option<String>,
    pub path: Option<PathBuf>,
    pub bytes: Option<Vec<u8>>,
}

impl Candidate {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path: Some(path),
            ..Self::default()
        }
    }

    pub fn from_bytes(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Display name, falling back to the path's file name.
    fn file_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    }

    fn declared_size(&self) -> Result<u64, IntakeRejection> {
        if let Some(bytes) = &self.bytes {
            return Ok(bytes.len() as u64);
        }
        let path = self.path.as_deref().ok_or_else(|| {
            IntakeRejection::Unreadable(format!("{} has no contents", self.file_name()))
        })?;
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| IntakeRejection::Unreadable(format!("{}: {e}", path.display())))
    }

    fn read_bytes(self) -> Result<Vec<u8>, IntakeRejection> {
        match (self.bytes, self.path) {
            (Some(bytes), _) => Ok(bytes),
            (None, Some(path)) => fs::read(&path)
                .map_err(|e| IntakeRejection::Unreadable(format!("{}: {e}", path.display()))),
            (None, None) => Err(IntakeRejection::Unreadable(format!(
                "{} has no contents",
                self.name
            ))),
        }
    }
}

/// What is known about a file while it is dragged over the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverCandidate {
    pub mime: Option<String>,
    pub path: Option<PathBuf>,
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// MIME from the reported value, then the file extension, then the content.
pub fn resolve_mime(reported: Option<&str>, name: &str, bytes: Option<&[u8]>) -> Option<String> {
    if let Some(mime) = reported.map(str::trim).filter(|m| !m.is_empty()) {
        return Some(mime.to_ascii_lowercase());
    }
    if let Ok(format) = ImageFormat::from_path(name) {
        return Some(format.to_mime_type().to_string());
    }
    bytes
        .and_then(|b| image::guess_format(b).ok())
        .map(|format| format.to_mime_type().to_string())
}

/// Whether a drag hovering with these files would be accepted.
///
/// Size is unknown until the drop; files whose type cannot be determined yet
/// are given the benefit of the doubt.
pub fn hover_acceptable(files: &[HoverCandidate], limits: &IntakeLimits) -> bool {
    if files.is_empty() || files.len() > limits.max_files {
        return false;
    }
    files.iter().all(|file| {
        let name = file
            .path
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        match resolve_mime(file.mime.as_deref(), &name, None) {
            Some(mime) => is_image_mime(&mime),
            None => true,
        }
    })
}

/// Validates one intake event: exactly one image within the size limit.
pub fn validate(
    candidates: Vec<Candidate>,
    limits: &IntakeLimits,
) -> Result<ImageFile, IntakeRejection> {
    if candidates.len() > limits.max_files {
        return Err(IntakeRejection::TooManyFiles {
            count: candidates.len(),
            max: limits.max_files,
        });
    }
    let Some(candidate) = candidates.into_iter().next() else {
        return Err(IntakeRejection::Empty);
    };

    let name = candidate.file_name();
    let mut mime = resolve_mime(candidate.mime.as_deref(), &name, candidate.bytes.as_deref());
    if let Some(m) = &mime
        && !is_image_mime(m)
    {
        return Err(IntakeRejection::NotAnImage { mime: m.clone() });
    }

    let size = candidate.declared_size()?;
    if size > limits.max_bytes {
        return Err(IntakeRejection::TooLarge {
            size,
            limit: limits.max_bytes,
        });
    }

    let bytes = candidate.read_bytes()?;
    if mime.is_none() {
        // Extensionless path: only the content can tell.
        mime = resolve_mime(None, "", Some(&bytes));
    }
    let mime = mime.ok_or_else(|| IntakeRejection::NotAnImage {
        mime: "unknown".to_string(),
    })?;

    Ok(ImageFile::new(name, mime, bytes))
}
