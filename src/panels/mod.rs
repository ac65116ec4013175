//! Data-only form definitions for the console's panels

mod cron;
mod network;
mod notification;
mod user;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::NetworkDevice;
use crate::state::FormDefinition;

pub use cron::WILDCARD;
pub use network::{bond_primary_options, InterfaceKind, PRIMARY_MODES};
pub use user::DEFAULT_SHELL;

/// Option sources fetched by the data layer before a form is built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidates {
    pub bond_slaves: Vec<NetworkDevice>,
    pub vlan_devices: Vec<String>,
    pub shells: Vec<String>,
    pub groups: Vec<String>,
}

/// Inputs a panel definition depends on
#[derive(Debug, Clone)]
pub struct PanelContext {
    /// Identity of the configuration object being edited; `None` when adding
    pub object_id: Option<Uuid>,
    /// Device name shown on network panels
    pub devicename: String,
    pub candidates: Candidates,
    /// Time used for the scheduled job defaults
    pub now: NaiveTime,
}

impl Default for PanelContext {
    fn default() -> Self {
        Self {
            object_id: None,
            devicename: String::new(),
            candidates: Candidates::default(),
            now: Local::now().time(),
        }
    }
}

impl PanelContext {
    pub fn new(candidates: Candidates) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.object_id.is_none()
    }
}

/// The panels the console can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Interface(InterfaceKind),
    PowerSchedule,
    Notification,
    User,
}

impl PanelKind {
    pub const ALL: [PanelKind; 6] = [
        PanelKind::Interface(InterfaceKind::Ethernet),
        PanelKind::Interface(InterfaceKind::Bond),
        PanelKind::Interface(InterfaceKind::Vlan),
        PanelKind::PowerSchedule,
        PanelKind::Notification,
        PanelKind::User,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PanelKind::Interface(kind) => kind.label(),
            PanelKind::PowerSchedule => "Power schedule",
            PanelKind::Notification => "Notification",
            PanelKind::User => "User",
        }
    }

    /// Stable identifier used in the config file and fixture data
    pub fn key(&self) -> &'static str {
        match self {
            PanelKind::Interface(InterfaceKind::Ethernet) => "ethernet",
            PanelKind::Interface(InterfaceKind::Bond) => "bond",
            PanelKind::Interface(InterfaceKind::Vlan) => "vlan",
            PanelKind::PowerSchedule => "powerschedule",
            PanelKind::Notification => "notification",
            PanelKind::User => "user",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }

    pub fn definition(&self, ctx: &PanelContext) -> FormDefinition {
        match self {
            PanelKind::Interface(kind) => kind.definition(ctx),
            PanelKind::PowerSchedule => cron::definition(ctx),
            PanelKind::Notification => notification::definition(),
            PanelKind::User => user::definition(ctx),
        }
    }
}

impl Default for PanelKind {
    fn default() -> Self {
        PanelKind::Interface(InterfaceKind::Ethernet)
    }
}
