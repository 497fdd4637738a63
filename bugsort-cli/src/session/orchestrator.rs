//! Sort session state machine
//!
//! A [`Session`] owns the uploaded document and the sorted copy built from
//! it. Every transition takes `&mut self`, so at most one decode, sort or
//! serialization runs against a session at a time. The heavy work runs on
//! tokio's blocking pool and is awaited; there is no cancellation.
//!
//! Errors never escape as panics: every failure is turned into a
//! [`SessionError`], shown as an error banner and returned to the caller,
//! and the session stays usable.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinError;

use crate::sorting::{
    ColumnBinding, LogicalColumn, SortColumns, find_target_sheet, resolve_columns, sort_records,
};
use crate::workbook::{CodecError, Document, SpreadsheetCodec};

use super::clock::{Clock, SystemClock};
use super::config::SessionConfig;
use super::error::SessionError;
use super::events::{Banner, SessionEvent, StatusLabel};
use super::state::SessionState;
use super::upload::{FileKind, Upload, sorted_file_name};

/// The sheet chosen for sorting and its resolved columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSheet {
    pub sheet_name: String,
    pub binding: ColumnBinding,
    pub row_count: usize,
}

/// An uploaded, decoded file
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file_name: String,
    pub kind: FileKind,
    pub document: Arc<Document>,
    /// Set once validation succeeds
    pub target: Option<TargetSheet>,
}

/// Result of a successful sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub sheet_name: String,
    pub row_count: usize,
    /// Placeholder column renamed to `New/Existing`, if any
    pub renamed_column: Option<String>,
}

/// Serialized sorted workbook ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct Session {
    codec: Arc<dyn SpreadsheetCodec>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    events: Option<UnboundedSender<SessionEvent>>,

    state: SessionState,
    busy: bool,
    status: Option<StatusLabel>,
    banner: Option<Banner>,

    loaded: Option<LoadedFile>,
    sorted: Option<Arc<Document>>,
}

impl Session {
    pub fn new(codec: Arc<dyn SpreadsheetCodec>, config: SessionConfig) -> Self {
        Self {
            codec,
            clock: Arc::new(SystemClock),
            config,
            events: None,
            state: SessionState::Empty,
            busy: false,
            status: None,
            banner: None,
            loaded: None,
            sorted: None,
        }
    }

    /// Use a different source for "today" in the report-date heuristic
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send every state change to `events` as well
    pub fn with_events(mut self, events: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn status(&self) -> Option<StatusLabel> {
        self.status
    }

    /// Current banner, unless dismissed or expired
    pub fn banner(&self) -> Option<&Banner> {
        let now = Instant::now();
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    pub fn loaded(&self) -> Option<&LoadedFile> {
        self.loaded.as_ref()
    }

    pub fn source_document(&self) -> Option<&Arc<Document>> {
        self.loaded.as_ref().map(|l| &l.document)
    }

    pub fn sorted_document(&self) -> Option<&Arc<Document>> {
        self.sorted.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        if self.banner.take().is_some() {
            self.emit(SessionEvent::BannerDismissed);
        }
    }

    /// Empty -> Loaded -> Validated, then sorts right away
    ///
    /// Type and size are checked before anything else; a rejected upload
    /// leaves the session exactly as it was apart from the error banner.
    pub async fn upload(&mut self, upload: Upload) -> Result<SortOutcome, SessionError> {
        let kind = match upload.check(self.config.max_upload_bytes) {
            Ok(kind) => kind,
            Err(err) => return Err(self.reject(err)),
        };

        // Each upload starts from a fresh document
        self.clear_documents();
        self.set_busy(true);
        self.dismiss_banner();

        let Upload {
            file_name, bytes, ..
        } = upload;
        log::info!("Decoding {} ({:?}, {} bytes)", file_name, kind, bytes.len());

        let started = Instant::now();
        let codec = Arc::clone(&self.codec);
        let decoded = tokio::task::spawn_blocking(move || codec.decode(&bytes)).await;

        let document = match decoded {
            Ok(Ok(document)) => document,
            Ok(Err(err)) => return Err(self.fail(SessionError::Codec(err))),
            Err(err) => {
                let err = CodecError::Decode(join_error_message(err));
                return Err(self.fail(SessionError::Codec(err)));
            }
        };
        log::debug!(
            "Decoded {} sheets in {:?}: {:?}",
            document.len(),
            started.elapsed(),
            document.sheet_names()
        );

        self.loaded = Some(LoadedFile {
            file_name,
            kind,
            document: Arc::new(document),
            target: None,
        });
        self.state = SessionState::Loaded;

        self.validate()?;
        self.sort().await
    }

    /// Loaded -> Validated
    fn validate(&mut self) -> Result<TargetSheet, SessionError> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Err(self.reject(SessionError::NotLoaded));
        };
        let document = Arc::clone(&loaded.document);
        let file_name = loaded.file_name.clone();

        let resolved = find_target_sheet(&document.sheet_names()).and_then(|sheet_name| {
            log::info!("Using sheet: {}", sheet_name);
            let records = document.records(&sheet_name).unwrap_or_default();
            let binding = resolve_columns(records.first())?;
            Ok(TargetSheet {
                sheet_name,
                binding,
                row_count: records.len(),
            })
        });

        let target = match resolved {
            Ok(target) => target,
            Err(err) => return Err(self.fail(err.into())),
        };
        log::debug!("Resolved columns: {:?}", target.binding);

        if let Some(loaded) = self.loaded.as_mut() {
            loaded.target = Some(target.clone());
        }
        self.state = SessionState::Validated;
        self.set_busy(false);
        self.set_status(StatusLabel::ReadyToSort);
        self.emit(SessionEvent::FileDetails {
            file_name,
            row_count: target.row_count,
        });

        Ok(target)
    }

    /// Validated -> Sorted
    ///
    /// Always re-reads the target sheet from the untouched uploaded
    /// document, so a failed sort can simply be retried.
    pub async fn sort(&mut self) -> Result<SortOutcome, SessionError> {
        let Some(loaded) = self.loaded.as_ref() else {
            return Err(self.reject(SessionError::NotLoaded));
        };
        let document = Arc::clone(&loaded.document);
        let validated = loaded.target.clone();

        let target = match validated {
            Some(target) => target,
            None => self.validate()?,
        };

        self.set_busy(true);
        self.dismiss_banner();

        let clock = Arc::clone(&self.clock);
        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            build_sorted_document(&document, &target, clock.today())
        })
        .await;

        let (sorted, outcome) = match result {
            Ok(Ok(done)) => done,
            Ok(Err(err)) => return Err(self.fail(err)),
            Err(err) => return Err(self.fail(SessionError::Sort(join_error_message(err)))),
        };
        log::info!(
            "Sorted {} rows of '{}' in {:?}",
            outcome.row_count,
            outcome.sheet_name,
            started.elapsed()
        );

        self.sorted = Some(Arc::new(sorted));
        self.state = SessionState::Sorted;
        self.set_busy(false);
        self.set_status(StatusLabel::SortedSuccessfully);
        self.show_banner(Banner::success(
            "File sorted successfully! Save it to get your sorted file.",
            self.config.success_banner_ttl,
        ));

        Ok(outcome)
    }

    /// Sorted -> Ready
    ///
    /// Can be repeated from Ready, or retried after a failed attempt.
    pub async fn export(&mut self) -> Result<SortedFile, SessionError> {
        let Some(sorted) = self.sorted.clone() else {
            return Err(self.reject(SessionError::NotSorted));
        };
        let Some(file_name) = self.loaded.as_ref().map(|l| sorted_file_name(&l.file_name)) else {
            return Err(self.reject(SessionError::NotSorted));
        };

        self.set_busy(true);

        let codec = Arc::clone(&self.codec);
        let encoded = tokio::task::spawn_blocking(move || codec.encode(&sorted)).await;

        let bytes = match encoded {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => return Err(self.fail(SessionError::Serialization(err.to_string()))),
            Err(err) => return Err(self.fail(SessionError::Serialization(join_error_message(err)))),
        };
        log::info!("Serialized {} ({} bytes)", file_name, bytes.len());

        self.state = SessionState::Ready;
        self.set_busy(false);
        self.show_banner(Banner::success(
            format!("Sorted file ready: {}", file_name),
            self.config.success_banner_ttl,
        ));

        Ok(SortedFile { file_name, bytes })
    }

    /// Any state -> Empty
    pub fn reset(&mut self) {
        self.clear_documents();
        self.state = SessionState::Empty;
        self.busy = false;
        self.status = None;
        self.banner = None;
        self.emit(SessionEvent::Reset);
        log::debug!("Session reset");
    }

    fn clear_documents(&mut self) {
        self.loaded = None;
        self.sorted = None;
        self.status = None;
    }

    /// Report an error that does not change the session state
    fn reject(&mut self, err: SessionError) -> SessionError {
        log::warn!("{}", err);
        self.show_banner(Banner::error(err.to_string()));
        err
    }

    /// Report a processing error and move to the Error state
    ///
    /// Documents are kept so the failed step can be retried.
    fn fail(&mut self, err: SessionError) -> SessionError {
        log::error!("{}", err);
        self.state = SessionState::Error;
        self.set_busy(false);
        self.show_banner(Banner::error(err.to_string()));
        err
    }

    fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.emit(SessionEvent::Busy(busy));
        }
    }

    fn set_status(&mut self, status: StatusLabel) {
        self.status = Some(status);
        self.emit(SessionEvent::Status(status));
    }

    fn show_banner(&mut self, banner: Banner) {
        self.banner = Some(banner.clone());
        self.emit(SessionEvent::Banner(banner));
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver just means nobody is rendering
            let _ = events.send(event);
        }
    }
}

/// Sort the target sheet of `document` into a new document
///
/// Sheets other than the target are shared, not copied. A sheet without
/// data rows is left as it is.
fn build_sorted_document(
    document: &Document,
    target: &TargetSheet,
    today: NaiveDate,
) -> Result<(Document, SortOutcome), SessionError> {
    let records = document.records(&target.sheet_name).ok_or_else(|| {
        SessionError::Sort(format!("sheet '{}' not found in workbook", target.sheet_name))
    })?;

    if records.is_empty() {
        return Ok((
            document.clone(),
            SortOutcome {
                sheet_name: target.sheet_name.clone(),
                row_count: 0,
                renamed_column: None,
            },
        ));
    }

    let columns = SortColumns::resolve(&target.binding, records.first());
    let mut sorted = sort_records(records, &columns, today);

    let renamed_column = match target.binding.new_existing.as_deref() {
        Some(column) if target.binding.new_existing_is_placeholder() => {
            log::info!("Renaming column: {} -> {}", column, LogicalColumn::NewExisting.label());
            sorted = sorted
                .iter()
                .map(|record| record.with_column_renamed(column, LogicalColumn::NewExisting.label()))
                .collect();
            Some(column.to_string())
        }
        _ => None,
    };

    let rebuilt = document
        .with_records_replaced(&target.sheet_name, &sorted)
        .ok_or_else(|| {
            SessionError::Sort(format!("sheet '{}' not found in workbook", target.sheet_name))
        })?;

    Ok((
        rebuilt,
        SortOutcome {
            sheet_name: target.sheet_name.clone(),
            row_count: sorted.len(),
            renamed_column,
        },
    ))
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::clock::FixedClock;
    use crate::session::events::BannerKind;
    use crate::workbook::codec::memory::MemoryCodec;
    use crate::workbook::{Cell, Sheet};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    const BYTES: &[u8] = b"bugs-workbook";

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn bug_rows(header: [&str; 4], rows: &[[&str; 4]]) -> Vec<Vec<Cell>> {
        let mut grid = vec![header.iter().map(|h| text(h)).collect::<Vec<_>>()];
        for row in rows {
            grid.push(row.iter().map(|c| text(c)).collect());
        }
        grid
    }

    fn example_document() -> Document {
        Document::new(vec![
            Sheet::new("Summary", vec![vec![text("Total")], vec![Cell::Number(4.0)]]),
            Sheet::new(
                "Bugs Reported",
                bug_rows(
                    ["ID", "New/Existing", "Priority", "Bugs"],
                    &[
                        ["1", "New", "Blocker", "login fails 10/01"],
                        ["2", "Existing", "Major", "05/01 crash"],
                        ["3", "New", "Critical", "09/01"],
                        ["4", "New", "Blocker", "no date yet"],
                    ],
                ),
            ),
        ])
    }

    fn session_with(document: Document) -> (Session, Arc<MemoryCodec>) {
        let codec = Arc::new(MemoryCodec::new());
        codec.register(BYTES, document);
        let session = Session::new(codec.clone(), SessionConfig::default())
            .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 2, 14).unwrap())));
        (session, codec)
    }

    fn upload() -> Upload {
        Upload::new("Bugs.xlsx", BYTES.to_vec())
    }

    fn sorted_ids(session: &Session) -> Vec<String> {
        session
            .sorted_document()
            .unwrap()
            .records("Bugs Reported")
            .unwrap()
            .iter()
            .map(|r| r.get("ID").unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_upload_validates_and_sorts() {
        let (mut session, _codec) = session_with(example_document());

        let outcome = session.upload(upload()).await.unwrap();

        assert_eq!(
            outcome,
            SortOutcome {
                sheet_name: "Bugs Reported".to_string(),
                row_count: 4,
                renamed_column: None,
            }
        );
        assert_eq!(session.state(), SessionState::Sorted);
        assert_eq!(session.status(), Some(StatusLabel::SortedSuccessfully));
        assert!(!session.is_busy());
        assert_eq!(sorted_ids(&session), vec!["1", "4", "3", "2"]);

        // Uploaded document is untouched
        let original: Vec<_> = session
            .source_document()
            .unwrap()
            .records("Bugs Reported")
            .unwrap()
            .iter()
            .map(|r| r.get("ID").unwrap().to_string())
            .collect();
        assert_eq!(original, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_export_names_file_and_shares_other_sheets() {
        let (mut session, codec) = session_with(example_document());
        session.upload(upload()).await.unwrap();

        let file = session.export().await.unwrap();

        assert_eq!(file.file_name, "Bugs_sorted.xlsx");
        assert_eq!(file.bytes, b"encoded:1".to_vec());
        assert_eq!(session.state(), SessionState::Ready);

        let encoded = codec.encoded();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0].sheet_names(), vec!["Summary", "Bugs Reported"]);
        assert!(Arc::ptr_eq(
            encoded[0].sheet("Summary").unwrap(),
            session.source_document().unwrap().sheet("Summary").unwrap()
        ));
    }

    #[tokio::test]
    async fn test_events_follow_the_flow() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (session, _codec) = session_with(example_document());
        let mut session = session.with_events(tx);

        session.upload(upload()).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(events[0], SessionEvent::Busy(true));
        assert!(events.contains(&SessionEvent::Status(StatusLabel::ReadyToSort)));
        assert!(events.contains(&SessionEvent::FileDetails {
            file_name: "Bugs.xlsx".to_string(),
            row_count: 4,
        }));
        assert!(events.contains(&SessionEvent::Status(StatusLabel::SortedSuccessfully)));
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Banner(Banner { kind: BannerKind::Success, .. }))
        ));
        let busy: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Busy(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(busy, vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_wrong_type_rejected_before_decode() {
        let (mut session, _codec) = session_with(example_document());

        let err = session
            .upload(Upload::new("Bugs.csv", BYTES.to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::FileType { .. }));
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.loaded().is_none());
        assert_eq!(session.banner().unwrap().kind, BannerKind::Error);
    }

    #[tokio::test]
    async fn test_oversized_rejected_without_touching_loaded_file() {
        let (mut session, _codec) = session_with(example_document());
        session.upload(upload()).await.unwrap();

        let big = Upload::new("Huge.xlsx", vec![0; 10 * 1024 * 1024 + 1]);
        let err = session.upload(big).await.unwrap_err();

        assert!(matches!(err, SessionError::FileSize { .. }));
        assert_eq!(session.state(), SessionState::Sorted);
        assert_eq!(session.loaded().unwrap().file_name, "Bugs.xlsx");
        assert!(session.sorted_document().is_some());
    }

    #[tokio::test]
    async fn test_lowered_limit_applies() {
        let codec = Arc::new(MemoryCodec::new());
        codec.register(BYTES, example_document());
        let config = SessionConfig::builder().max_upload_bytes(8).build();
        let mut session = Session::new(codec, config);

        let err = session.upload(upload()).await.unwrap_err();

        assert!(matches!(err, SessionError::FileSize { .. }));
        assert!(session.loaded().is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_is_codec_error() {
        let (mut session, _codec) = session_with(example_document());

        let err = session
            .upload(Upload::new("Other.xlsx", b"garbage".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Codec(_)));
        assert!(err.to_string().contains("Unsupported file format"));
        assert_eq!(session.state(), SessionState::Error);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_sheet_not_found_keeps_loaded_document() {
        let document = Document::new(vec![
            Sheet::new("Summary", Vec::new()),
            Sheet::new("Bugs", Vec::new()),
        ]);
        let (mut session, _codec) = session_with(document);

        let err = session.upload(upload()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Excel file must contain a sheet named \"Bugs Reported\". Found sheets: Summary, Bugs"
        );
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.loaded().is_some());
        assert!(session.sorted_document().is_none());
    }

    #[tokio::test]
    async fn test_missing_columns_reported_with_samples() {
        let document = Document::new(vec![Sheet::new(
            "bugs reported",
            vec![
                vec![text("ID"), text("Kind")],
                vec![text("1"), text("New")],
            ],
        )]);
        let (mut session, _codec) = session_with(document);

        let err = session.upload(upload()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing columns: \"New/Existing\", \"Priority\". Debug info: \
             Column 1: \"ID\" (sample: \"1\"), Column 2: \"Kind\" (sample: \"New\")"
        );
        assert_eq!(session.banner().unwrap().text, err.to_string());

        // Retrying the sort re-validates and reports the same problem
        let retry = session.sort().await.unwrap_err();
        assert!(matches!(retry, SessionError::Schema(_)));
    }

    #[tokio::test]
    async fn test_placeholder_column_is_renamed_in_output_only() {
        let document = Document::new(vec![Sheet::new(
            "Bugs Reported",
            vec![
                vec![text("ID"), Cell::Empty, text("Priority")],
                vec![text("1"), text("Existing"), text("Major")],
                vec![text("2"), text("New"), text("Major")],
            ],
        )]);
        let (mut session, _codec) = session_with(document);

        let outcome = session.upload(upload()).await.unwrap();

        assert_eq!(outcome.renamed_column.as_deref(), Some("__EMPTY"));
        let sorted = session.sorted_document().unwrap().records("Bugs Reported").unwrap();
        let columns: Vec<_> = sorted[0].column_names().collect();
        assert_eq!(columns, vec!["ID", "New/Existing", "Priority"]);
        assert_eq!(sorted[0].get("ID"), Some("2"));

        let source = session.source_document().unwrap().records("Bugs Reported").unwrap();
        assert!(source[0].contains("__EMPTY"));
    }

    #[tokio::test]
    async fn test_sheet_without_rows_is_left_alone() {
        let document = Document::new(vec![Sheet::new(
            "Bugs Reported",
            vec![vec![text("ID"), text("Priority")]],
        )]);
        let (mut session, _codec) = session_with(document);

        let outcome = session.upload(upload()).await.unwrap();

        assert_eq!(outcome.row_count, 0);
        assert!(Arc::ptr_eq(
            session.sorted_document().unwrap().sheet("Bugs Reported").unwrap(),
            session.source_document().unwrap().sheet("Bugs Reported").unwrap()
        ));
    }

    #[tokio::test]
    async fn test_actions_out_of_order() {
        let (mut session, _codec) = session_with(example_document());

        assert!(matches!(session.sort().await, Err(SessionError::NotLoaded)));
        assert_eq!(session.banner().unwrap().text, "Please upload a file first.");
        assert!(matches!(session.export().await, Err(SessionError::NotSorted)));
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[tokio::test]
    async fn test_serialization_failure_can_be_retried() {
        let codec = Arc::new(MemoryCodec::failing_encode());
        codec.register(BYTES, example_document());
        let mut session = Session::new(codec, SessionConfig::default());
        session.upload(upload()).await.unwrap();

        let err = session.export().await.unwrap_err();

        assert_eq!(err.to_string(), "Error saving sorted file: disk quota exceeded");
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.sorted_document().is_some());
        assert!(matches!(session.export().await, Err(SessionError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_resort_reads_from_source() {
        let (mut session, _codec) = session_with(example_document());
        session.upload(upload()).await.unwrap();
        let first = sorted_ids(&session);

        session.sort().await.unwrap();

        assert_eq!(sorted_ids(&session), first);
    }

    #[tokio::test]
    async fn test_reset_then_upload_matches_first_upload() {
        let (mut session, _codec) = session_with(example_document());
        let first = session.upload(upload()).await.unwrap();
        let first_ids = sorted_ids(&session);
        session.export().await.unwrap();

        session.reset();

        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.loaded().is_none());
        assert!(session.sorted_document().is_none());
        assert!(session.status().is_none());
        assert!(session.banner().is_none());

        let second = session.upload(upload()).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(sorted_ids(&session), first_ids);
    }

    #[tokio::test]
    async fn test_dismiss_banner() {
        let (mut session, _codec) = session_with(example_document());
        session.upload(upload()).await.unwrap();
        assert!(session.banner().is_some());

        session.dismiss_banner();

        assert!(session.banner().is_none());
    }

    struct PanickingClock;

    impl Clock for PanickingClock {
        fn today(&self) -> NaiveDate {
            panic!("clock unavailable")
        }
    }

    #[tokio::test]
    async fn test_sort_panic_becomes_error_banner() {
        let codec = Arc::new(MemoryCodec::new());
        codec.register(BYTES, example_document());
        let mut session =
            Session::new(codec, SessionConfig::default()).with_clock(Arc::new(PanickingClock));
        let before = example_document().records("Bugs Reported").unwrap();

        let err = session.upload(upload()).await.unwrap_err();

        assert!(matches!(err, SessionError::Sort(_)));
        assert!(err.to_string().contains("clock unavailable"));
        assert_eq!(session.state(), SessionState::Error);
        assert!(!session.is_busy());
        assert!(session.sorted_document().is_none());
        assert_eq!(session.banner().unwrap().kind, BannerKind::Error);

        let source = session.source_document().unwrap();
        assert_eq!(source.records("Bugs Reported").unwrap(), before);
    }

    #[test]
    fn test_missing_target_sheet_is_sort_error() {
        let target = TargetSheet {
            sheet_name: "Gone".to_string(),
            binding: ColumnBinding::default(),
            row_count: 0,
        };
        let today = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();

        let err = build_sorted_document(&example_document(), &target, today).unwrap_err();

        assert!(matches!(err, SessionError::Sort(ref message) if message.contains("'Gone'")));
    }

    #[tokio::test]
    async fn test_join_error_message_reads_panic_payload() {
        let err = tokio::task::spawn_blocking(|| panic!("row {} unreadable", 7))
            .await
            .unwrap_err();
        assert_eq!(join_error_message(err), "row 7 unreadable");

        let err = tokio::task::spawn_blocking(|| std::panic::panic_any(42u8))
            .await
            .unwrap_err();
        assert_eq!(join_error_message(err), "worker panicked");
    }
}
