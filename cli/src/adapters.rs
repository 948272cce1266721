//! Concrete implementations of the collaborator ports defined in `ppsync_core::device`,
//! plus the inventory and credential inputs they need.

pub mod artifacts;
pub mod credentials;
pub mod inventory;
pub mod ssh;
