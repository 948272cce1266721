//! # Reconciliation Planner
//!
//! Partitions the requested interfaces into exactly one of three buckets and renders
//! the commands needed to bring the `to_configure` bucket in line with the profile.
//!
//! | Record state                    | Bucket               |
//! |---------------------------------|----------------------|
//! | routed (L3)                     | `skipped_l3`         |
//! | L2, already inherits profile    | `already_configured` |
//! | L2, profile missing             | `to_configure`       |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ppsync_common::network::interface::InterfaceId;
use ppsync_common::network::range;
use ppsync_common::profile::ProfileDefinition;
use thiserror::Error;

use crate::classifier::{ClassificationReason, InterfaceRecord};

const INTERFACE_SELECT_PREFIX: &str = "interface ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("device did not report interface(s) {}", range::condense(.missing.iter().copied()))]
    MissingInterfaceRecord { missing: BTreeSet<InterfaceId> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciliationPlan {
    eligible: BTreeSet<InterfaceId>,
    already_configured: BTreeSet<InterfaceId>,
    to_configure: BTreeSet<InterfaceId>,
    skipped_l3: BTreeMap<InterfaceId, ClassificationReason>,
}

/// Builds the plan for `requested`. Every requested interface needs a record;
/// if any is missing no partial plan is returned.
pub fn plan(
    requested: &BTreeSet<InterfaceId>,
    records: &BTreeMap<InterfaceId, InterfaceRecord>,
) -> Result<ReconciliationPlan, PlanError> {
    let missing: BTreeSet<InterfaceId> = requested
        .iter()
        .filter(|id| !records.contains_key(id))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(PlanError::MissingInterfaceRecord { missing });
    }

    let mut plan = ReconciliationPlan::default();
    for (&id, record) in requested.iter().filter_map(|id| records.get_key_value(id)) {
        if record.is_l3() {
            plan.skipped_l3.insert(id, record.reason());
        } else if record.has_target_profile() {
            plan.already_configured.insert(id);
        } else {
            plan.to_configure.insert(id);
        }
    }

    plan.eligible = plan
        .already_configured
        .union(&plan.to_configure)
        .copied()
        .collect();

    Ok(plan)
}

impl ReconciliationPlan {
    pub fn eligible(&self) -> &BTreeSet<InterfaceId> {
        &self.eligible
    }

    pub fn already_configured(&self) -> &BTreeSet<InterfaceId> {
        &self.already_configured
    }

    pub fn to_configure(&self) -> &BTreeSet<InterfaceId> {
        &self.to_configure
    }

    pub fn skipped_l3(&self) -> BTreeSet<InterfaceId> {
        self.skipped_l3.keys().copied().collect()
    }

    /// Why each skipped interface was considered routed.
    pub fn skip_reasons(&self) -> &BTreeMap<InterfaceId, ClassificationReason> {
        &self.skipped_l3
    }

    pub fn is_noop(&self) -> bool {
        self.to_configure.is_empty()
    }

    /// Profile definition block first, then one select/inherit pair per interface to
    /// configure, in interface order.
    pub fn commands(&self, profile: &ProfileDefinition) -> CommandSequence {
        let mut lines = profile.definition_commands();
        let definition_len = lines.len();
        for id in &self.to_configure {
            lines.push(format!("{INTERFACE_SELECT_PREFIX}{id}"));
            lines.push(profile.inherit_command());
        }
        CommandSequence {
            lines,
            definition_len,
        }
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            eligible: range::condense(self.eligible.iter().copied()),
            already_configured: range::condense(self.already_configured.iter().copied()),
            to_configure: range::condense(self.to_configure.iter().copied()),
            skipped_l3: range::condense(self.skipped_l3.keys().copied()),
        }
    }
}

/// Condensed-range rendering of each plan bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub eligible: String,
    pub already_configured: String,
    pub to_configure: String,
    pub skipped_l3: String,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "eligible:           {}", self.eligible)?;
        writeln!(f, "already-configured: {}", self.already_configured)?;
        writeln!(f, "to-configure:       {}", self.to_configure)?;
        writeln!(f, "skipped-l3:         {}", self.skipped_l3)
    }
}

/// Literal configuration lines in the order they must be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSequence {
    lines: Vec<String>,
    /// The leading profile-definition block ends here.
    definition_len: usize,
}

impl CommandSequence {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The profile-definition block on its own.
    pub fn definition(&self) -> CommandSequence {
        CommandSequence {
            lines: self.lines[..self.definition_len].to_vec(),
            definition_len: self.definition_len,
        }
    }

    /// The select/inherit pairs, without the definition block.
    pub fn interface_pairs(&self) -> CommandSequence {
        CommandSequence {
            lines: self.lines[self.definition_len..].to_vec(),
            definition_len: 0,
        }
    }

    /// Number of `interface ...` selection commands.
    pub fn interface_selections(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.starts_with(INTERFACE_SELECT_PREFIX))
            .count()
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
