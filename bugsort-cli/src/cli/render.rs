//! Terminal rendering of session events

use colored::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::session::{BannerKind, SessionEvent};

/// Print every event queued so far, in order
///
/// Error banners go to stderr, everything else to stdout.
pub fn drain_events(events: &mut UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        let Some(line) = format_event(&event) else {
            continue;
        };
        match event {
            SessionEvent::Banner(banner) if banner.kind == BannerKind::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// One display line per event, or `None` for events with nothing to show
pub fn format_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Busy(true) => Some(format!("{}", "Processing...".dimmed())),
        SessionEvent::Busy(false) => None,
        SessionEvent::FileDetails {
            file_name,
            row_count,
        } => Some(format!(
            "File: {} ({} rows)",
            file_name.cyan(),
            row_count.to_string().bold()
        )),
        SessionEvent::Status(status) => Some(format!("Status: {}", status.to_string().yellow())),
        SessionEvent::Banner(banner) => Some(match banner.kind {
            BannerKind::Success => format!("{} {}", "✓".bright_green(), banner.text.bright_green()),
            BannerKind::Error => format!("{} {}", "✗".red().bold(), banner.text.red()),
        }),
        SessionEvent::BannerDismissed | SessionEvent::Reset => None,
    }
}
