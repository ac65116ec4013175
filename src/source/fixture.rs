//! JSON fixture implementation of `DataSource`

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Result, SourceError};
use super::traits::DataSource;
use super::{NetworkDevice, StoredObject};
use crate::panels::{Candidates, PanelKind};
use crate::state::FieldValue;

/// On-disk shape of a fixture file
///
/// ```json
/// {
///   "candidates": { "bond_slaves": [{ "devicename": "eth1", "ether": "..." }] },
///   "objects": { "bond": { "uuid": "...", "values": { "bondmode": 1 } } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub candidates: Candidates,
    /// Stored configuration objects keyed by panel key
    pub objects: BTreeMap<String, StoredObject>,
}

impl Fixture {
    fn check(&self) -> Result<()> {
        match self.objects.keys().find(|k| PanelKind::from_key(k).is_none()) {
            Some(key) => Err(SourceError::UnknownPanel(key.clone())),
            None => Ok(()),
        }
    }
}

/// Serves panel data from a fixture instead of the appliance
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    fixture: Fixture,
}

impl FixtureSource {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    /// Read a fixture file; an absent file yields the built-in sample data.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "fixture not found, using sample data");
                return Ok(Self::sample());
            }
            Err(source) => {
                return Err(SourceError::FixtureRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let fixture: Fixture =
            serde_json::from_str(&content).map_err(|source| SourceError::FixtureParse {
                path: path.to_path_buf(),
                source,
            })?;
        fixture.check()?;
        tracing::info!(
            path = %path.display(),
            objects = fixture.objects.len(),
            "fixture loaded"
        );
        Ok(Self::new(fixture))
    }

    /// Built-in data for running the console without an appliance
    pub fn sample() -> Self {
        let candidates = Candidates {
            bond_slaves: vec![
                NetworkDevice::new("eth1", "52:54:00:12:34:01"),
                NetworkDevice::new("eth2", "52:54:00:12:34:02"),
                NetworkDevice::new("eth3", "52:54:00:12:34:03"),
            ],
            vlan_devices: vec!["eth0".to_string(), "bond0".to_string()],
            shells: ["/bin/sh", "/bin/bash", "/bin/dash", "/usr/sbin/nologin"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            groups: ["users", "ssh", "sambashare"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        let bond = StoredObject {
            uuid: Uuid::from_u128(0x5c2c_6f0e_3a5e_4d8a_9b1f_0d6e_2f4a_7c11),
            values: BTreeMap::from([
                ("devicename".to_string(), FieldValue::from("bond0")),
                ("method".to_string(), FieldValue::from("static")),
                ("address".to_string(), FieldValue::from("192.168.1.10")),
                ("netmask".to_string(), FieldValue::from("255.255.255.0")),
                ("slaves".to_string(), FieldValue::from(&["eth1", "eth2"][..])),
                ("bondmode".to_string(), FieldValue::Number(1)),
                ("bondprimary".to_string(), FieldValue::from("eth2")),
            ]),
        };
        let notification = StoredObject {
            uuid: Uuid::from_u128(0x8d0e_41a2_77c3_4b55_a0e4_19f2_6c3b_d902),
            values: BTreeMap::from([
                ("enable".to_string(), FieldValue::Bool(true)),
                ("server".to_string(), FieldValue::from("smtp.example.com")),
                ("sender".to_string(), FieldValue::from("nas@example.com")),
                ("primaryemail".to_string(), FieldValue::from("admin@example.com")),
            ]),
        };

        Self::new(Fixture {
            candidates,
            objects: BTreeMap::from([
                ("bond".to_string(), bond),
                ("notification".to_string(), notification),
            ]),
        })
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn bond_slave_candidates(&self) -> Result<Vec<NetworkDevice>> {
        Ok(self.fixture.candidates.bond_slaves.clone())
    }

    async fn vlan_candidates(&self) -> Result<Vec<String>> {
        Ok(self.fixture.candidates.vlan_devices.clone())
    }

    async fn shells(&self) -> Result<Vec<String>> {
        Ok(self.fixture.candidates.shells.clone())
    }

    async fn groups(&self) -> Result<Vec<String>> {
        Ok(self.fixture.candidates.groups.clone())
    }

    async fn stored_object(&self, panel: PanelKind) -> Result<Option<StoredObject>> {
        Ok(self.fixture.objects.get(panel.key()).cloned())
    }
}
