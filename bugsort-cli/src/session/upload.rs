//! Incoming files and the checks run before anything is decoded

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::SessionError;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

static EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("valid extension pattern"));

/// Accepted spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Office Open XML workbook
    Xlsx,
    /// Legacy BIFF workbook
    Xls,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim() {
            XLSX_MIME => Some(FileKind::Xlsx),
            XLS_MIME => Some(FileKind::Xls),
            _ => None,
        }
    }

    /// Kind implied by the text from the last `.` on, case-insensitively
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = name.rfind('.').map(|idx| &name[idx..]).unwrap_or(name);
        match extension.to_lowercase().as_str() {
            ".xlsx" => Some(FileKind::Xlsx),
            ".xls" => Some(FileKind::Xls),
            _ => None,
        }
    }
}

/// A file handed to the session
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, named after its final path component
    pub async fn from_path(path: &Path) -> Result<Self, SessionError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Type then size check; either failure means nothing gets decoded
    ///
    /// The declared MIME type wins over the extension when both are usable.
    pub fn check(&self, max_bytes: u64) -> Result<FileKind, SessionError> {
        let kind = self
            .mime_type
            .as_deref()
            .and_then(FileKind::from_mime)
            .or_else(|| FileKind::from_file_name(&self.file_name))
            .ok_or_else(|| SessionError::FileType {
                file_name: self.file_name.clone(),
                mime_type: self.mime_type.clone(),
            })?;

        if self.size() > max_bytes {
            return Err(SessionError::FileSize {
                size: self.size(),
                limit: max_bytes,
            });
        }

        Ok(kind)
    }
}

/// `report.xls` -> `report_sorted.xlsx`; output is always `.xlsx`
pub fn sorted_file_name(original: &str) -> String {
    format!("{}_sorted.xlsx", EXTENSION.replace(original, ""))
}
