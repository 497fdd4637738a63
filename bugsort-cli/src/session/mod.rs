//! Upload, validate, sort and serialize flow around a single workbook

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod state;
pub mod upload;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::SessionError;
pub use events::{Banner, BannerKind, SessionEvent, StatusLabel};
pub use orchestrator::{LoadedFile, Session, SortOutcome, SortedFile, TargetSheet};
pub use state::SessionState;
pub use upload::{FileKind, Upload, XLS_MIME, XLSX_MIME, sorted_file_name};
