//! # Interface Classifier
//!
//! Decides, from the configuration block of a single interface, whether the port is
//! routed (L3) and therefore out of reach of the port-profile.
//!
//! The block is tokenized into [`Directive`]s first; classification then walks a fixed
//! priority list, so a block matching several rules always reports the same reason:
//!
//! 1. `ip address ...`   -> [`ClassificationReason::HasIPv4Address`]
//! 2. `ipv6 address ...` -> [`ClassificationReason::HasIPv6Address`]
//! 3. `no switchport`    -> [`ClassificationReason::NoSwitchportKeyword`]
//! 4. a `routed` token   -> [`ClassificationReason::RoutedKeyword`]
//!
//! Anything else, including an empty block, is switched (L2) and eligible.

use ppsync_common::network::interface::InterfaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationReason {
    HasIPv4Address,
    HasIPv6Address,
    NoSwitchportKeyword,
    RoutedKeyword,
    /// Not routed. The interface is L2 and eligible.
    None,
}

impl ClassificationReason {
    pub fn is_l3(&self) -> bool {
        !matches!(self, ClassificationReason::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_l3: bool,
    pub reason: ClassificationReason,
}

/// One configuration line, tagged by what it means for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Ipv4Address,
    Ipv6Address,
    NoSwitchport,
    InheritProfile(String),
    Other(Vec<String>),
}

impl Directive {
    fn parse(line: &str) -> Self {
        let tokens: Vec<String> = line
            .split_whitespace()
            .map(|t| t.to_ascii_lowercase())
            .collect();

        match tokens.as_slice() {
            [ip, address, ..] if ip == "ip" && address == "address" => Directive::Ipv4Address,
            [ip, address, ..] if ip == "ipv6" && address == "address" => Directive::Ipv6Address,
            [no, switchport] if no == "no" && switchport == "switchport" => Directive::NoSwitchport,
            [inherit, port_profile, name]
                if inherit == "inherit" && port_profile == "port-profile" =>
            {
                Directive::InheritProfile(name.clone())
            }
            _ => Directive::Other(tokens),
        }
    }

    fn has_token(&self, token: &str) -> bool {
        match self {
            Directive::Other(tokens) => tokens.iter().any(|t| t == token),
            _ => false,
        }
    }
}

fn directives(raw_config_block: &str) -> Vec<Directive> {
    raw_config_block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Directive::parse)
        .collect()
}

/// Classifies an interface block. Never fails; an empty block is L2.
pub fn classify(raw_config_block: &str) -> Classification {
    let directives = directives(raw_config_block);
    let reason = reason_for(&directives);
    Classification {
        is_l3: reason.is_l3(),
        reason,
    }
}

fn reason_for(directives: &[Directive]) -> ClassificationReason {
    let contains = |wanted: &Directive| directives.iter().any(|d| d == wanted);

    if contains(&Directive::Ipv4Address) {
        ClassificationReason::HasIPv4Address
    } else if contains(&Directive::Ipv6Address) {
        ClassificationReason::HasIPv6Address
    } else if contains(&Directive::NoSwitchport) {
        ClassificationReason::NoSwitchportKeyword
    } else if directives.iter().any(|d| d.has_token("routed")) {
        ClassificationReason::RoutedKeyword
    } else {
        ClassificationReason::None
    }
}

/// True when the block already inherits the named port-profile. Independent of L3 status.
pub fn has_profile(raw_config_block: &str, profile_name: &str) -> bool {
    directives(raw_config_block).iter().any(|d| match d {
        Directive::InheritProfile(name) => name.eq_ignore_ascii_case(profile_name),
        _ => false,
    })
}

/// An interface as captured from a device, with its classification resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    id: InterfaceId,
    raw_config_block: String,
    reason: ClassificationReason,
    has_target_profile: bool,
}

impl InterfaceRecord {
    pub fn from_block(id: InterfaceId, raw_config_block: impl Into<String>, profile_name: &str) -> Self {
        let raw_config_block = raw_config_block.into();
        let classification = classify(&raw_config_block);
        let has_target_profile = has_profile(&raw_config_block, profile_name);

        Self {
            id,
            raw_config_block,
            reason: classification.reason,
            has_target_profile,
        }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn raw_config_block(&self) -> &str {
        &self.raw_config_block
    }

    pub fn is_l3(&self) -> bool {
        self.reason.is_l3()
    }

    pub fn reason(&self) -> ClassificationReason {
        self.reason
    }

    pub fn has_target_profile(&self) -> bool {
        self.has_target_profile
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
