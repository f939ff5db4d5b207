//! Optional usage reporting.
//!
//! A session reports five occasions to an injected [`AnalyticsSink`]. With no
//! sink installed nothing happens, and a failing sink only produces a warning.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsKind {
    DurationSelected,
    TimerStarted,
    TimerReset,
    TimerCompleted,
    AlarmStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub kind: AnalyticsKind,
    pub duration_minutes: u32,
    pub session_id: Uuid,
    pub at: DateTime<Utc>,
}

pub trait AnalyticsSink {
    fn record(&mut self, event: &AnalyticsEvent) -> Result<()>;
}

/// Holds the sink, if any, and calls it.
#[derive(Default)]
pub struct Analytics {
    sink: Option<Box<dyn AnalyticsSink>>,
}

impl Analytics {
    pub fn new(sink: Option<Box<dyn AnalyticsSink>>) -> Self {
        Self { sink }
    }

    pub fn emit(&mut self, kind: AnalyticsKind, duration_minutes: u32, session_id: Uuid) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let event = AnalyticsEvent {
            kind,
            duration_minutes,
            session_id,
            at: Utc::now(),
        };
        if let Err(e) = sink.record(&event) {
            warn!(error = %e, ?kind, "analytics sink failed");
        }
    }
}

/// Appends one JSON object per line to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalyticsSink for JsonLinesSink {
    fn record(&mut self, event: &AnalyticsEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Collect(Rc<RefCell<Vec<AnalyticsEvent>>>);

    impl AnalyticsSink for Collect {
        fn record(&mut self, event: &AnalyticsEvent) -> Result<()> {
            self.0.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    struct Broken;

    impl AnalyticsSink for Broken {
        fn record(&mut self, _event: &AnalyticsEvent) -> Result<()> {
            Err(CoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn absent_sink_is_noop() {
        let mut analytics = Analytics::default();
        analytics.emit(AnalyticsKind::TimerStarted, 5, Uuid::new_v4());
    }

    #[test]
    fn emit_forwards_payload() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut analytics = Analytics::new(Some(Box::new(Collect(Rc::clone(&seen)))));
        let id = Uuid::new_v4();
        analytics.emit(AnalyticsKind::TimerCompleted, 25, id);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, AnalyticsKind::TimerCompleted);
        assert_eq!(seen[0].duration_minutes, 25);
        assert_eq!(seen[0].session_id, id);
    }

    #[test]
    fn broken_sink_is_swallowed() {
        let mut analytics = Analytics::new(Some(Box::new(Broken)));
        analytics.emit(AnalyticsKind::AlarmStopped, 1, Uuid::new_v4());
    }

    #[test]
    fn json_lines_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analytics.jsonl");
        let mut sink = JsonLinesSink::open(&path).unwrap();
        let id = Uuid::new_v4();
        for kind in [AnalyticsKind::DurationSelected, AnalyticsKind::TimerStarted] {
            sink.record(&AnalyticsEvent {
                kind,
                duration_minutes: 10,
                session_id: id,
                at: Utc::now(),
            })
            .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "duration_selected");
        assert_eq!(first["duration_minutes"], 10);
    }
}
