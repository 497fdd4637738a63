//! Inspect command handler
//!
//! Shows what a sort would see: the sheets, the chosen sheet, every column
//! with its first value, and which columns the sort keys come from.

use anyhow::Result;
use colored::*;

use super::InspectCommands;
use crate::config::Config;
use crate::session::{SessionError, Upload};
use crate::sorting::{
    ColumnBinding, ColumnSample, SchemaError, SortColumns, column_samples, find_target_sheet,
    resolve_columns,
};
use crate::workbook::{Document, ExcelCodec, SpreadsheetCodec};

/// What a sort would resolve for a document
#[derive(Debug)]
pub struct Inspection {
    pub sheets: Vec<String>,
    pub target: String,
    pub row_count: usize,
    pub columns: Vec<ColumnSample>,
    pub binding: Result<ColumnBinding, SchemaError>,
    pub sort_columns: Option<SortColumns>,
}

pub async fn handle_inspect_command(args: InspectCommands, config: &Config) -> Result<()> {
    // Handle --no-color flag
    if args.no_color || !config.color {
        colored::control::set_override(false);
    }

    if !args.file.exists() {
        anyhow::bail!("File does not exist: {}", args.file.display());
    }

    let mut upload = Upload::from_path(&args.file).await?;
    if let Some(mime) = &args.mime {
        upload = upload.with_mime_type(mime.clone());
    }
    let kind = upload.check(config.session_config().max_upload_bytes)?;
    log::debug!("Inspecting {} as {:?}", upload.file_name, kind);

    let bytes = upload.bytes;
    let document = tokio::task::spawn_blocking(move || ExcelCodec.decode(&bytes))
        .await?
        .map_err(SessionError::Codec)?;

    println!("File: {}", upload.file_name.cyan());
    let inspection = inspect_document(&document)?;
    print_inspection(&inspection);

    inspection.binding.map(|_| ()).map_err(Into::into)
}

/// Resolve the target sheet and bindings the way a sort would
///
/// A missing sheet is an error; missing columns are reported in
/// [`Inspection::binding`] so the discovered columns can still be shown.
pub fn inspect_document(document: &Document) -> Result<Inspection, SchemaError> {
    let sheets: Vec<String> = document.sheet_names().iter().map(|s| s.to_string()).collect();
    let target = find_target_sheet(&sheets)?;

    let records = document.records(&target).unwrap_or_default();
    let first = records.first();
    let binding = resolve_columns(first);
    let sort_columns = binding
        .as_ref()
        .ok()
        .map(|binding| SortColumns::resolve(binding, first));

    Ok(Inspection {
        sheets,
        target,
        row_count: records.len(),
        columns: first.map(column_samples).unwrap_or_default(),
        binding,
        sort_columns,
    })
}

fn print_inspection(inspection: &Inspection) {
    println!("Sheets: {}", inspection.sheets.join(", "));
    println!(
        "Target sheet: {} ({} rows)",
        inspection.target.bright_green().bold(),
        inspection.row_count
    );

    if inspection.columns.is_empty() {
        println!("{}", "No data rows".dimmed());
    } else {
        println!();
        println!("Columns:");
        for (idx, column) in inspection.columns.iter().enumerate() {
            println!(
                "  {:>3}. {} {}",
                idx + 1,
                column.name.cyan(),
                format!("(sample: \"{}\")", column.sample).dimmed()
            );
        }
    }

    if let Some(columns) = &inspection.sort_columns {
        println!();
        println!("Sort keys:");
        print_binding("New/Existing", columns.new_existing.as_deref());
        print_binding("Priority", columns.priority.as_deref());
        print_binding("Bugs", columns.bugs.as_deref());
    }
}

fn print_binding(label: &str, column: Option<&str>) {
    match column {
        Some(column) => println!("  {:<13} <- {}", label, column.bright_green()),
        None => println!("  {:<13} <- {}", label, "not found (ignored)".yellow()),
    }
}
