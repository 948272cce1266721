//! # Device State Snapshots
//!
//! Immutable captures of a device's running configuration or MAC table, taken once per
//! capture point (before and after a change).

use chrono::{DateTime, Utc};

use crate::network::mac::MacTableEntry;

/// Where in a run a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapturePoint {
    Pre,
    Post,
}

impl CapturePoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapturePoint::Pre => "pre",
            CapturePoint::Post => "post",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    device_id: String,
    point: CapturePoint,
    timestamp: DateTime<Utc>,
    raw_text: String,
}

impl ConfigSnapshot {
    pub fn new(
        device_id: impl Into<String>,
        point: CapturePoint,
        timestamp: DateTime<Utc>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            point,
            timestamp,
            raw_text: raw_text.into(),
        }
    }

    /// Snapshot stamped with the current time.
    pub fn capture(device_id: impl Into<String>, point: CapturePoint, raw_text: impl Into<String>) -> Self {
        Self::new(device_id, point, Utc::now(), raw_text)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn point(&self) -> CapturePoint {
        self.point
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacSnapshot {
    device_id: String,
    point: CapturePoint,
    timestamp: DateTime<Utc>,
    entries: Vec<MacTableEntry>,
}

impl MacSnapshot {
    pub fn new(
        device_id: impl Into<String>,
        point: CapturePoint,
        timestamp: DateTime<Utc>,
        entries: Vec<MacTableEntry>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            point,
            timestamp,
            entries,
        }
    }

    pub fn capture(device_id: impl Into<String>, point: CapturePoint, entries: Vec<MacTableEntry>) -> Self {
        Self::new(device_id, point, Utc::now(), entries)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn point(&self) -> CapturePoint {
        self.point
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Entries in the order the device reported them.
    pub fn entries(&self) -> &[MacTableEntry] {
        &self.entries
    }
}
