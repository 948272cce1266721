//! # Vendor Text Parsers
//!
//! Small, line-oriented parsers for NX-OS style CLI output. Every vendor-dialect
//! assumption the tool makes lives under this module.
//!
//! * [`running_config`]: splits `show running-config` into per-interface blocks.
//! * [`mac_table`]: reads `show mac address-table` rows into [`MacTableEntry`] values.
//!
//! [`MacTableEntry`]: ppsync_common::network::mac::MacTableEntry

pub mod mac_table;
pub mod running_config;
