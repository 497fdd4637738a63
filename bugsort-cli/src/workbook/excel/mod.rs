//! Excel codec backed by calamine (read) and rust_xlsxwriter (write)

mod reader;
mod writer;

use super::codec::{CodecError, SpreadsheetCodec};
use super::document::Document;

pub use reader::read_workbook;
pub use writer::write_workbook;

/// Reads `.xlsx` and legacy `.xls` bytes, always writes `.xlsx`
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelCodec;

impl SpreadsheetCodec for ExcelCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        read_workbook(bytes)
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>, CodecError> {
        write_workbook(document)
    }
}
