//! Schema resolution, date extraction and the row ordering rule

pub mod dates;
pub mod schema;
pub mod sorter;

pub use dates::extract_date;
pub use schema::{
    ColumnBinding, ColumnSample, LogicalColumn, SchemaError, column_samples, find_target_sheet,
    resolve_columns,
};
pub use sorter::{SortColumns, SortKey, sort_records};
