use serde::Serialize;

use crate::analysis::{AnalysisStatus, Category};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Notifications pushed to the UI while a scan runs.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScanEvent {
    Started {
        generation: u64,
        category: Category,
    },
    Progress {
        generation: u64,
        percent: f64,
    },
    Settling {
        generation: u64,
    },
    Completed {
        generation: u64,
        status: AnalysisStatus,
        confidence: u8,
    },
    Reset {
        generation: u64,
    },
}

pub trait ScanEventSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

/// Default sink: writes events to the log.
pub struct LogEventSink;

impl ScanEventSink for LogEventSink {
    fn emit(&self, event: ScanEvent) {
        match event {
            ScanEvent::Started {
                generation,
                category,
            } => log_info!("scan {generation} started ({})", category.as_str()),
            ScanEvent::Progress {
                generation,
                percent,
            } => log_debug!("scan {generation} at {percent:.1}%"),
            ScanEvent::Settling { generation } => log_debug!("scan {generation} settling"),
            ScanEvent::Completed {
                generation,
                status,
                confidence,
            } => log_info!(
                "scan {generation} completed: {} ({confidence}% confidence)",
                status.as_str()
            ),
            ScanEvent::Reset { generation } => log_info!("scan reset (generation {generation})"),
        }
    }
}
