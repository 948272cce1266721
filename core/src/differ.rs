//! # Snapshot Differ
//!
//! Pure comparisons between two captures of the same device:
//!
//! * running configuration: line-based unified diff hunks ([`diff_config`])
//! * MAC address table: set difference keyed on `(mac, vlan, interface)` ([`diff_mac`])
//!
//! Nothing here talks to a device; identical inputs always produce identical output.

use std::collections::BTreeSet;
use std::fmt;

use ppsync_common::network::mac::MacTableEntry;
use ppsync_common::snapshot::{CapturePoint, ConfigSnapshot, MacSnapshot};
use similar::{ChangeTag, DiffOp, DiffTag, TextDiff};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("no {} snapshot to compare", .0.as_str())]
    MissingSnapshot(CapturePoint),
    #[error("cannot compare snapshots of different devices ({before} vs {after})")]
    DeviceMismatch { before: String, after: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Config,
    Mac,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Config => "running-config",
            DiffKind::Mac => "mac-table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Context,
    Removed,
    Added,
}

impl LineTag {
    fn marker(&self) -> char {
        match self {
            LineTag::Context => ' ',
            LineTag::Removed => '-',
            LineTag::Added => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
}

/// One contiguous block of changes with its surrounding context.
///
/// Line numbers follow unified diff conventions: 1-based, and for an empty side the
/// number of the line preceding the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.lines_tagged(LineTag::Removed)
    }

    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.lines_tagged(LineTag::Added)
    }

    fn lines_tagged(&self, tag: LineTag) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(move |line| line.tag == tag)
            .map(|line| line.text.as_str())
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )?;
        for line in &self.lines {
            writeln!(f, "{}{}", line.tag.marker(), line.text)?;
        }
        Ok(())
    }
}

/// Line-based unified diff of two configuration texts, with `context` lines around
/// each change.
pub fn diff_config(before: &str, after: &str, context: usize) -> Vec<Hunk> {
    let diff = TextDiff::from_lines(before, after);

    diff.grouped_ops(context)
        .iter()
        .filter(|group| group.iter().any(|op| op.tag() != DiffTag::Equal))
        .map(|group| hunk_from_group(&diff, group))
        .collect()
}

fn hunk_from_group(diff: &TextDiff<'_, '_, '_, str>, group: &[DiffOp]) -> Hunk {
    let (first, last) = (&group[0], &group[group.len() - 1]);
    let old_range = first.old_range().start..last.old_range().end;
    let new_range = first.new_range().start..last.new_range().end;

    let lines = group
        .iter()
        .flat_map(|op| diff.iter_changes(op))
        .map(|change| DiffLine {
            tag: match change.tag() {
                ChangeTag::Equal => LineTag::Context,
                ChangeTag::Delete => LineTag::Removed,
                ChangeTag::Insert => LineTag::Added,
            },
            text: change.value().trim_end_matches(['\r', '\n']).to_string(),
        })
        .collect();

    Hunk {
        old_start: unified_start(old_range.start, old_range.len()),
        old_len: old_range.len(),
        new_start: unified_start(new_range.start, new_range.len()),
        new_len: new_range.len(),
        lines,
    }
}

fn unified_start(index: usize, len: usize) -> usize {
    if len == 0 { index } else { index + 1 }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacDiff {
    pub added: BTreeSet<MacTableEntry>,
    pub removed: BTreeSet<MacTableEntry>,
    pub unchanged: usize,
}

impl MacDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set difference of two MAC tables. Capture order and duplicate rows do not matter.
pub fn diff_mac(before: &[MacTableEntry], after: &[MacTableEntry]) -> MacDiff {
    let before: BTreeSet<&MacTableEntry> = before.iter().collect();
    let after: BTreeSet<&MacTableEntry> = after.iter().collect();

    MacDiff {
        added: after.difference(&before).map(|e| (*e).clone()).collect(),
        removed: before.difference(&after).map(|e| (*e).clone()).collect(),
        unchanged: before.intersection(&after).count(),
    }
}

/// Anything captured from one device at one point in a run.
pub trait Captured {
    fn device_id(&self) -> &str;
    fn point(&self) -> CapturePoint;
    fn timestamp(&self) -> chrono::DateTime<chrono::Utc>;
}

impl Captured for ConfigSnapshot {
    fn device_id(&self) -> &str {
        ConfigSnapshot::device_id(self)
    }

    fn point(&self) -> CapturePoint {
        ConfigSnapshot::point(self)
    }

    fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        ConfigSnapshot::timestamp(self)
    }
}

impl Captured for MacSnapshot {
    fn device_id(&self) -> &str {
        MacSnapshot::device_id(self)
    }

    fn point(&self) -> CapturePoint {
        MacSnapshot::point(self)
    }

    fn timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        MacSnapshot::timestamp(self)
    }
}

/// Before/after comparison of one kind of device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport<S> {
    kind: DiffKind,
    before: S,
    after: S,
    hunks: Vec<Hunk>,
}

pub type ConfigDiffReport = DiffReport<ConfigSnapshot>;
pub type MacDiffReport = DiffReport<MacSnapshot>;

impl<S: Captured> DiffReport<S> {
    pub fn kind(&self) -> DiffKind {
        self.kind
    }

    pub fn before(&self) -> &S {
        &self.before
    }

    pub fn after(&self) -> &S {
        &self.after
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// `false` is the expected outcome of a run that had nothing to change.
    pub fn changed(&self) -> bool {
        !self.hunks.is_empty()
    }

    /// Renders the report as a unified diff with `---`/`+++` headers.
    pub fn to_unified(&self) -> String {
        let mut out = format!(
            "--- {}/{} ({} {})\n+++ {}/{} ({} {})\n",
            self.before.device_id(),
            self.kind.as_str(),
            self.before.point().as_str(),
            self.before.timestamp().to_rfc3339(),
            self.after.device_id(),
            self.kind.as_str(),
            self.after.point().as_str(),
            self.after.timestamp().to_rfc3339(),
        );
        for hunk in &self.hunks {
            out.push_str(&hunk.to_string());
        }
        out
    }
}

impl MacDiffReport {
    pub fn mac_changes(&self) -> MacDiff {
        diff_mac(self.before.entries(), self.after.entries())
    }
}

fn require<S: Captured>(
    before: Option<S>,
    after: Option<S>,
) -> Result<(S, S), DiffError> {
    let before = before.ok_or(DiffError::MissingSnapshot(CapturePoint::Pre))?;
    let after = after.ok_or(DiffError::MissingSnapshot(CapturePoint::Post))?;
    if before.device_id() != after.device_id() {
        return Err(DiffError::DeviceMismatch {
            before: before.device_id().to_string(),
            after: after.device_id().to_string(),
        });
    }
    Ok((before, after))
}

pub fn config_report(
    before: Option<ConfigSnapshot>,
    after: Option<ConfigSnapshot>,
    context: usize,
) -> Result<ConfigDiffReport, DiffError> {
    let (before, after) = require(before, after)?;
    let hunks = diff_config(before.raw_text(), after.raw_text(), context);
    Ok(DiffReport {
        kind: DiffKind::Config,
        before,
        after,
        hunks,
    })
}

/// MAC tables are compared as sorted, de-duplicated entry listings, so the hunks show
/// exactly the added and removed entries.
pub fn mac_report(
    before: Option<MacSnapshot>,
    after: Option<MacSnapshot>,
) -> Result<MacDiffReport, DiffError> {
    let (before, after) = require(before, after)?;
    let hunks = diff_config(&mac_listing(&before), &mac_listing(&after), 0);
    Ok(DiffReport {
        kind: DiffKind::Mac,
        before,
        after,
        hunks,
    })
}

fn mac_listing(snapshot: &MacSnapshot) -> String {
    let sorted: BTreeSet<&MacTableEntry> = snapshot.entries().iter().collect();
    sorted.iter().map(|entry| format!("{entry}\n")).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
