//! `bugsort inspect`

mod handler;

pub use handler::handle_inspect_command;

use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct InspectCommands {
    /// Workbook to inspect (.xlsx or .xls)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Declared MIME type, checked before the file extension
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
