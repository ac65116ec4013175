//! Data layer: fetches option sources and stored objects before a form is
//! built

mod error;
mod fixture;
mod traits;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::panels::{Candidates, PanelContext, PanelKind};
use crate::state::{FieldValue, FormState};

pub use error::{Result, SourceError};
pub use fixture::{Fixture, FixtureSource};
pub use traits::DataSource;

#[cfg(test)]
pub use traits::MockDataSource;

/// A network device offered as a bond slave
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub devicename: String,
    /// MAC address
    #[serde(default)]
    pub ether: String,
}

impl NetworkDevice {
    pub fn new(devicename: &str, ether: &str) -> Self {
        Self {
            devicename: devicename.to_string(),
            ether: ether.to_string(),
        }
    }

    pub fn label(&self) -> String {
        if self.ether.is_empty() {
            self.devicename.clone()
        } else {
            format!("{} ({})", self.devicename, self.ether)
        }
    }
}

/// A configuration object as stored on the appliance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub uuid: Uuid,
    #[serde(default)]
    pub values: BTreeMap<String, FieldValue>,
}

/// Fetch every option source concurrently
pub async fn fetch_candidates(source: &dyn DataSource) -> Result<Candidates> {
    let (bond_slaves, vlan_devices, shells, groups) = tokio::try_join!(
        source.bond_slave_candidates(),
        source.vlan_candidates(),
        source.shells(),
        source.groups(),
    )?;
    Ok(Candidates {
        bond_slaves,
        vlan_devices,
        shells,
        groups,
    })
}

/// Fetch what a panel needs, build its form and load the stored object
/// into it, if there is one.
pub async fn open_panel(source: &dyn DataSource, panel: PanelKind) -> Result<FormState> {
    let candidates = fetch_candidates(source).await?;
    let stored = source.stored_object(panel).await?;

    let mut ctx = PanelContext::new(candidates);
    if let Some(object) = &stored {
        ctx.object_id = Some(object.uuid);
        if let Some(name) = object.values.get("devicename") {
            ctx.devicename = name.as_text().to_string();
        }
    }

    let mut form = FormState::build(panel.definition(&ctx))?;
    if let Some(object) = stored {
        form.load(object.values)?;
    }
    tracing::info!(panel = panel.label(), editing = !ctx.is_new(), "panel opened");
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn mock_with_candidates() -> MockDataSource {
        let mut mock = MockDataSource::new();
        mock.expect_bond_slave_candidates().returning(|| {
            Ok(vec![
                NetworkDevice::new("eth1", "52:54:00:00:00:01"),
                NetworkDevice::new("eth2", ""),
            ])
        });
        mock.expect_vlan_candidates()
            .returning(|| Ok(vec!["eth0".to_string()]));
        mock.expect_shells()
            .returning(|| Ok(vec!["/bin/dash".to_string()]));
        mock.expect_groups().returning(|| Ok(vec![]));
        mock
    }

    #[test]
    fn test_device_label() {
        assert_eq!(NetworkDevice::new("eth0", "aa:bb").label(), "eth0 (aa:bb)");
        assert_eq!(NetworkDevice::new("eth0", "").label(), "eth0");
    }

    #[tokio::test]
    async fn test_open_new_panel() {
        let mut mock = mock_with_candidates();
        mock.expect_stored_object()
            .with(eq(PanelKind::User))
            .returning(|_| Ok(None));

        let form = open_panel(&mock, PanelKind::User).await.unwrap();
        assert!(!form.constraints_of("name").unwrap().read_only);
        assert_eq!(form.options("shell").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_stored_bond_keeps_primary() {
        let mut mock = mock_with_candidates();
        let bond = PanelKind::Interface(crate::panels::InterfaceKind::Bond);
        mock.expect_stored_object().with(eq(bond)).returning(|_| {
            Ok(Some(StoredObject {
                uuid: Uuid::new_v4(),
                values: BTreeMap::from([
                    ("devicename".to_string(), FieldValue::from("bond0")),
                    ("bondprimary".to_string(), FieldValue::from("eth2")),
                    ("slaves".to_string(), FieldValue::from(&["eth1", "eth2"][..])),
                    ("bondmode".to_string(), FieldValue::Number(6)),
                ]),
            }))
        });

        let form = open_panel(&mock, bond).await.unwrap();
        assert_eq!(form.get("bondprimary").unwrap(), &FieldValue::from("eth2"));
        assert_eq!(form.get("devicename").unwrap(), &FieldValue::from("bond0"));
        assert!(!form.is_dirty());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut mock = MockDataSource::new();
        mock.expect_bond_slave_candidates()
            .returning(|| Err(SourceError::UnknownPanel("bond".to_string())));
        mock.expect_vlan_candidates().returning(|| Ok(vec![]));
        mock.expect_shells().returning(|| Ok(vec![]));
        mock.expect_groups().returning(|| Ok(vec![]));

        let result = fetch_candidates(&mock).await;
        assert!(matches!(result, Err(SourceError::UnknownPanel(_))));
    }

    #[test]
    fn test_fetch_with_block_on() {
        let source = FixtureSource::sample();
        let candidates = tokio_test::block_on(fetch_candidates(&source)).unwrap();
        assert_eq!(candidates, source.fixture().candidates);
    }
}
