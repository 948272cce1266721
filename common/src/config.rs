use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::network::interface::InterfaceId;
use crate::profile::ProfileDefinition;

/// Unified diff context when none is requested.
pub const DEFAULT_DIFF_CONTEXT: usize = 3;
pub const MAX_DIFF_CONTEXT: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    /// Plan and print only. No configuration is sent and no post-capture is taken.
    pub dry_run: bool,
    pub quiet: u8,
    /// Lines of context around each diff hunk, between 0 and [`MAX_DIFF_CONTEXT`].
    pub diff_context: usize,
    /// Interfaces the profile should be applied to on every device.
    pub interfaces: BTreeSet<InterfaceId>,
    pub profile: ProfileDefinition,
    /// Where diff artifacts are written. `None` keeps them in memory only.
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(interfaces: BTreeSet<InterfaceId>) -> Self {
        Self {
            dry_run: false,
            quiet: 0,
            diff_context: DEFAULT_DIFF_CONTEXT,
            interfaces,
            profile: ProfileDefinition::baremetal(),
            output_dir: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_diff_context(mut self, context: usize) -> Self {
        self.diff_context = context.min(MAX_DIFF_CONTEXT);
        self
    }
}
