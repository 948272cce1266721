//! Reconciliation engine for the `BAREMETAL` port-profile.
//!
//! * [`classifier`]: routed (L3) vs switched (L2) per interface block
//! * [`parser`]: vendor CLI text into interface blocks and MAC table entries
//! * [`planner`]: which interfaces need the profile, and the commands to get there
//! * [`differ`]: before/after comparison of running-config and MAC table
//! * [`coordinator`]: per-device capture, plan, apply, capture, diff
//! * [`device`]: the transport and persistence traits the coordinator depends on

pub mod classifier;
pub mod coordinator;
pub mod device;
pub mod differ;
pub mod parser;
pub mod planner;
