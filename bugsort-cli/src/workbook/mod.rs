//! Tabular document adapter: sheets, records and the spreadsheet codec

pub mod codec;
pub mod document;
pub mod excel;
pub mod record;

pub use codec::{CodecError, SpreadsheetCodec};
pub use document::{Cell, Document, PLACEHOLDER_HEADER, Sheet};
pub use excel::ExcelCodec;
pub use record::Record;
