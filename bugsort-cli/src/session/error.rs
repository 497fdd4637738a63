//! Everything a session can report back to the user

use crate::sorting::SchemaError;
use crate::workbook::CodecError;

/// A recoverable session failure
///
/// `Display` is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please upload a valid Excel file (.xlsx or .xls)")]
    FileType {
        file_name: String,
        mime_type: Option<String>,
    },

    #[error("File size exceeds {}MB. Please upload a smaller file.", mebibytes(.limit))]
    FileSize { size: u64, limit: u64 },

    #[error("Error reading Excel file: {0}. Run with --verbose for details.")]
    Codec(#[source] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Error sorting file: {0}")]
    Sort(String),

    #[error("Error saving sorted file: {0}")]
    Serialization(String),

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Please upload a file first.")]
    NotLoaded,

    #[error("No sorted file available. Please sort the file first.")]
    NotSorted,
}

fn mebibytes(bytes: &u64) -> u64 {
    bytes / (1024 * 1024)
}
