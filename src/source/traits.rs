//! Trait abstraction for the data layer to enable mocking in tests

use async_trait::async_trait;

use super::error::Result;
use super::{NetworkDevice, StoredObject};
use crate::panels::PanelKind;

/// Everything the console reads from the appliance before building a form
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Devices that are free to join a bond
    async fn bond_slave_candidates(&self) -> Result<Vec<NetworkDevice>>;

    /// Devices that can carry a VLAN
    async fn vlan_candidates(&self) -> Result<Vec<String>>;

    /// Login shells
    async fn shells(&self) -> Result<Vec<String>>;

    /// Group names
    async fn groups(&self) -> Result<Vec<String>>;

    /// The stored configuration object a panel edits, if one exists
    async fn stored_object(&self, panel: PanelKind) -> Result<Option<StoredObject>>;
}
