//! `bugsort sort`

mod handler;

pub use handler::handle_sort_command;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct SortCommands {
    /// Workbooks to sort (.xlsx or .xls)
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Declared MIME type, checked before the file extension
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,

    /// Directory for sorted files (default: next to each input)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Exact output path; only valid with a single input file
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Reference date for inferring report years (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
