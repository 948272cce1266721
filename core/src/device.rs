//! # Collaborator Ports
//!
//! Traits the coordinator drives. Concrete transports and storage live outside the core
//! (see the `ppsync` binary); tests substitute in-memory implementations.

use async_trait::async_trait;

use crate::coordinator::DeviceReport;
use crate::planner::CommandSequence;

/// Opens sessions to devices.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn connect(&self, device: &str) -> anyhow::Result<Box<dyn DeviceSession>>;
}

/// An open session to one device.
///
/// The coordinator calls [`DeviceSession::close`] on every exit path once it is done
/// with the session, including after failures.
#[async_trait]
pub trait DeviceSession: Send {
    /// Full `show running-config` output.
    async fn running_config(&mut self) -> anyhow::Result<String>;

    /// Raw `show mac address-table` output.
    async fn mac_table(&mut self) -> anyhow::Result<String>;

    /// Sends the commands in config mode, in order. Any rejected command fails the batch.
    async fn send_config(&mut self, commands: &CommandSequence) -> anyhow::Result<()>;

    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Receives finished device reports, e.g. to write diff artifacts to disk.
pub trait ArtifactSink: Send + Sync {
    fn persist(&self, report: &DeviceReport) -> anyhow::Result<()>;
}
