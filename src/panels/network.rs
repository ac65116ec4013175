//! Network interface panels

use serde::{Deserialize, Serialize};

use super::PanelContext;
use crate::state::{
    CascadeSpec, CorrelationRule, FieldValue, FormDefinition, FormField, PropertyOp, SelectOption,
};

/// Bond modes that elect a primary slave: active-backup, balance-tlb and
/// balance-alb
pub const PRIMARY_MODES: [i64; 3] = [1, 5, 6];

const BOND_MODES: [(i64, &str); 7] = [
    (0, "balance-rr"),
    (1, "active-backup"),
    (2, "balance-xor"),
    (3, "broadcast"),
    (4, "802.3ad"),
    (5, "balance-tlb"),
    (6, "balance-alb"),
];

/// Which kind of interface a network panel edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Ethernet,
    Bond,
    Vlan,
}

impl InterfaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            InterfaceKind::Ethernet => "Ethernet",
            InterfaceKind::Bond => "Bond",
            InterfaceKind::Vlan => "VLAN",
        }
    }

    pub fn definition(&self, ctx: &PanelContext) -> FormDefinition {
        match self {
            InterfaceKind::Ethernet => ethernet(ctx),
            InterfaceKind::Bond => bond(ctx),
            InterfaceKind::Vlan => vlan(ctx),
        }
    }
}

/// Options for the bond primary selector: one per chosen slave while the
/// mode elects a primary, otherwise only `None`.
pub fn bond_primary_options(values: &[&FieldValue]) -> Vec<SelectOption> {
    match values {
        [slaves, mode]
            if mode
                .as_number()
                .is_some_and(|m| PRIMARY_MODES.contains(&m)) =>
        {
            slaves
                .as_list()
                .iter()
                .map(|s| SelectOption::named(s))
                .collect()
        }
        _ => vec![SelectOption::new("None", "")],
    }
}

fn method_options(ipv6: bool) -> Vec<SelectOption> {
    let mut options = vec![
        SelectOption::new("Disabled", "manual"),
        SelectOption::new("DHCP", "dhcp"),
    ];
    if ipv6 {
        options.push(SelectOption::new("Auto", "auto"));
    }
    options.push(SelectOption::new("Static", "static"));
    options
}

/// Fields shared by every interface kind, in display order
fn generic_fields(ctx: &PanelContext) -> Vec<FormField> {
    vec![
        FormField::text("devicename", "Name")
            .read_only(true)
            .with_default(ctx.devicename.as_str()),
        FormField::text("comment", "Comment"),
        FormField::select("method", "Method", method_options(false), "manual").required(),
        FormField::text("address", "Address").read_only(true),
        FormField::text("netmask", "Netmask").read_only(true),
        FormField::text("gateway", "Gateway").read_only(true),
        FormField::select("method6", "Method (IPv6)", method_options(true), "manual").required(),
        FormField::text("address6", "Address (IPv6)").read_only(true),
        FormField::number("netmask6", "Prefix length", 64),
        FormField::text("gateway6", "Gateway (IPv6)").read_only(true),
        FormField::text("dnsnameservers", "DNS servers")
            .with_info("The name servers are used to look up host names on the network."),
        FormField::text("dnssearch", "Search domains"),
        FormField::text("mtu", "MTU"),
        FormField::checkbox("wol", "Wake-on-LAN", false),
        FormField::text("options", "Options")
            .with_info("Additional device settings, e.g. 'autoneg off speed 100 duplex full'."),
    ]
}

fn generic_rules() -> Vec<CorrelationRule> {
    vec![
        CorrelationRule::new(["address", "netmask"])
            .when("method", "static")
            .with(PropertyOp::REQUIRED)
            .with(PropertyOp::EDITABLE),
        CorrelationRule::new(["gateway"])
            .when("method", "static")
            .with(PropertyOp::EDITABLE),
        CorrelationRule::new(["address6", "netmask6"])
            .when("method6", "static")
            .with(PropertyOp::REQUIRED)
            .with(PropertyOp::EDITABLE),
        CorrelationRule::new(["gateway6"])
            .when("method6", "static")
            .with(PropertyOp::EDITABLE),
    ]
}

fn ethernet(ctx: &PanelContext) -> FormDefinition {
    FormDefinition::new("Ethernet interface")
        .fields(generic_fields(ctx))
        .rules(generic_rules())
}

fn bond(ctx: &PanelContext) -> FormDefinition {
    let slaves = ctx
        .candidates
        .bond_slaves
        .iter()
        .map(|dev| SelectOption::new(dev.label(), dev.devicename.as_str()))
        .collect();
    let modes = BOND_MODES
        .iter()
        .map(|&(mode, label)| SelectOption::new(label, mode))
        .collect();

    FormDefinition::new("Bond interface")
        .fields(generic_fields(ctx))
        .field(FormField::multi_select("slaves", "Slaves", slaves).required())
        .field(FormField::select("bondmode", "Mode", modes, 1).required())
        .field(
            FormField::select("bondprimary", "Primary", vec![SelectOption::new("None", "")], "")
                .with_info("Specifies which slave is the primary device."),
        )
        .field(FormField::number("bondmiimon", "MII monitoring frequency", 100))
        .field(FormField::number("bonddowndelay", "Down delay", 200))
        .field(FormField::number("bondupdelay", "Up delay", 200))
        .rules(generic_rules())
        .rule(
            CorrelationRule::new(["bondprimary"])
                .when_any("bondmode", PRIMARY_MODES)
                .with(PropertyOp::REQUIRED),
        )
        .cascade(CascadeSpec::new(
            &["slaves", "bondmode"],
            "bondprimary",
            bond_primary_options,
        ))
}

fn vlan(ctx: &PanelContext) -> FormDefinition {
    let editing = !ctx.is_new();
    let parents = ctx
        .candidates
        .vlan_devices
        .iter()
        .map(|name| SelectOption::named(name))
        .collect();

    FormDefinition::new("VLAN interface")
        .fields(generic_fields(ctx))
        .field(
            FormField::select("vlanrawdevice", "Parent interface", parents, "")
                .required()
                .read_only(editing),
        )
        .field(
            FormField::number("vlanid", "VLAN id", 1)
                .read_only(editing)
                .with_info("Valid range is 1 to 4095."),
        )
        .rules(generic_rules())
}
