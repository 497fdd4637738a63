//! Spreadsheet codec capability used by the sort session

use super::document::Document;

/// Failure while turning bytes into a document or back
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),
}

/// Converts workbook bytes to a [`Document`] and back
///
/// Implementations must be usable from a blocking worker thread.
pub trait SpreadsheetCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Document, CodecError>;

    fn encode(&self, document: &Document) -> Result<Vec<u8>, CodecError>;
}
