//! Sort command handler

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::SortCommands;
use crate::cli::Reported;
use crate::cli::render::drain_events;
use crate::config::Config;
use crate::session::{FixedClock, Session, SessionEvent, Upload};
use crate::workbook::ExcelCodec;

/// Run each file through upload, validate, sort and save
///
/// One session is reused for all files and reset in between. A failing
/// file does not stop the rest.
pub async fn handle_sort_command(args: SortCommands, config: &Config) -> Result<()> {
    // Handle --no-color flag
    if args.no_color || !config.color {
        colored::control::set_override(false);
    }

    if args.output.is_some() && args.files.len() > 1 {
        anyhow::bail!("--output can only be used with a single input file");
    }

    let (tx, mut events) = mpsc::unbounded_channel();
    let mut session = Session::new(Arc::new(ExcelCodec), config.session_config()).with_events(tx);
    if let Some(today) = args.today {
        log::info!("Using reference date {}", today);
        session = session.with_clock(Arc::new(FixedClock(today)));
    }

    let total = args.files.len();
    let mut failed = 0;

    for (idx, path) in args.files.iter().enumerate() {
        if idx > 0 {
            session.reset();
            println!();
        }

        let start = Instant::now();
        let result = sort_file(&mut session, &mut events, path, &args, config).await;
        drain_events(&mut events);

        match result {
            Ok(saved) => {
                println!(
                    "Saved sorted file to: {}",
                    saved.display().to_string().bright_green()
                );
                log::info!("{} done in {:?}", path.display(), start.elapsed());
            }
            Err(err) => {
                failed += 1;
                // Session errors were already shown as a banner
                if err.downcast_ref::<Reported>().is_none() {
                    eprintln!("{} {:#}", "Error:".red().bold(), err);
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be sorted", failed, total);
    }

    Ok(())
}

async fn sort_file(
    session: &mut Session,
    events: &mut UnboundedReceiver<SessionEvent>,
    path: &Path,
    args: &SortCommands,
    config: &Config,
) -> Result<PathBuf> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    let mut upload = Upload::from_path(path).await?;
    if let Some(mime) = &args.mime {
        upload = upload.with_mime_type(mime.clone());
    }

    let outcome = session.upload(upload).await.map_err(Reported)?;
    drain_events(events);
    if let Some(column) = &outcome.renamed_column {
        println!(
            "Unlabeled column {} saved as {}",
            column.dimmed(),
            "New/Existing".cyan()
        );
    }

    let sorted = session.export().await.map_err(Reported)?;
    drain_events(events);

    let destination = output_path(args, config, path, &sorted.file_name);
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    tokio::fs::write(&destination, &sorted.bytes)
        .await
        .with_context(|| format!("Failed to write sorted file: {}", destination.display()))?;

    log::debug!("Session state after save: {}", session.state());
    Ok(destination)
}

/// `--output`, else `<dir>/<name>_sorted.xlsx` with dir from `--output-dir`,
/// the config file, or the input's own directory
fn output_path(args: &SortCommands, config: &Config, input: &Path, file_name: &str) -> PathBuf {
    if let Some(output) = &args.output {
        return output.clone();
    }

    args.output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{Document, SpreadsheetCodec};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;

    fn args(files: Vec<PathBuf>) -> SortCommands {
        SortCommands {
            files,
            mime: None,
            output_dir: None,
            output: None,
            today: NaiveDate::from_ymd_opt(2026, 2, 14),
            no_color: true,
        }
    }

    fn write_bugs_workbook(path: &Path) {
        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").unwrap();
        summary.write_string(0, 0, "Owner").unwrap();
        summary.write_string(1, 0, "QA").unwrap();

        let bugs = workbook.add_worksheet();
        bugs.set_name("Bugs Reported").unwrap();
        // Column B has no header
        bugs.write_string(0, 0, "ID").unwrap();
        bugs.write_string(0, 2, "Priority").unwrap();
        bugs.write_string(0, 3, "Bugs").unwrap();
        let rows = [
            ["1", "Existing", "Major", "05/01 crash"],
            ["2", "New", "Blocker", "reported 10/01"],
            ["3", "New", "Critical", "09/01"],
            ["4", "New", "Blocker", "no date yet"],
        ];
        for (idx, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                bugs.write_string(idx as u32 + 1, col as u16, *value).unwrap();
            }
        }

        workbook.save(path).unwrap();
    }

    fn read_document(path: &Path) -> Document {
        ExcelCodec.decode(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_sort_writes_sorted_workbook_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Bugs Q1.xlsx");
        write_bugs_workbook(&input);

        handle_sort_command(args(vec![input.clone()]), &Config::default())
            .await
            .unwrap();

        let output = dir.path().join("Bugs Q1_sorted.xlsx");
        let document = read_document(&output);
        assert_eq!(document.sheet_names(), vec!["Summary", "Bugs Reported"]);

        let records = document.records("Bugs Reported").unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.get("ID").unwrap()).collect();
        assert_eq!(ids, vec!["2", "4", "3", "1"]);

        let columns: Vec<_> = records[0].column_names().collect();
        assert_eq!(columns, vec!["ID", "New/Existing", "Priority", "Bugs"]);

        let summary = document.records("Summary").unwrap();
        assert_eq!(summary[0].get("Owner"), Some("QA"));
    }

    #[tokio::test]
    async fn test_sort_honors_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bugs.xlsx");
        write_bugs_workbook(&input);
        let out_dir = dir.path().join("sorted");

        let mut sort_args = args(vec![input]);
        sort_args.output_dir = Some(out_dir.clone());
        handle_sort_command(sort_args, &Config::default()).await.unwrap();

        assert!(out_dir.join("bugs_sorted.xlsx").exists());
    }

    #[tokio::test]
    async fn test_failing_file_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("notes.csv");
        std::fs::write(&bad, "a,b\n1,2\n").unwrap();
        let good = dir.path().join("bugs.xlsx");
        write_bugs_workbook(&good);

        let err = handle_sort_command(args(vec![bad, good]), &Config::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "1 of 2 files could not be sorted");
        assert!(!dir.path().join("notes_sorted.xlsx").exists());
        assert!(dir.path().join("bugs_sorted.xlsx").exists());
    }

    #[tokio::test]
    async fn test_output_requires_single_file() {
        let mut sort_args = args(vec![PathBuf::from("a.xlsx"), PathBuf::from("b.xlsx")]);
        sort_args.output = Some(PathBuf::from("out.xlsx"));

        assert!(handle_sort_command(sort_args, &Config::default()).await.is_err());
    }

    #[test]
    fn test_output_path_precedence() {
        let input = Path::new("/data/in/bugs.xlsx");
        let mut config = Config::default();

        let sort_args = args(vec![input.to_path_buf()]);
        assert_eq!(
            output_path(&sort_args, &config, input, "bugs_sorted.xlsx"),
            PathBuf::from("/data/in/bugs_sorted.xlsx")
        );

        config.output_dir = Some(PathBuf::from("/data/config"));
        assert_eq!(
            output_path(&sort_args, &config, input, "bugs_sorted.xlsx"),
            PathBuf::from("/data/config/bugs_sorted.xlsx")
        );

        let mut sort_args = sort_args;
        sort_args.output_dir = Some(PathBuf::from("/data/flag"));
        assert_eq!(
            output_path(&sort_args, &config, input, "bugs_sorted.xlsx"),
            PathBuf::from("/data/flag/bugs_sorted.xlsx")
        );

        sort_args.output = Some(PathBuf::from("/data/exact.xlsx"));
        assert_eq!(
            output_path(&sort_args, &config, input, "bugs_sorted.xlsx"),
            PathBuf::from("/data/exact.xlsx")
        );
    }
}
